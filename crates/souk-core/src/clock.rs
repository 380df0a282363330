//! # Clock and Id Generation
//!
//! The store never reads the system clock or invents ids on its own. Both are
//! injected so that tests are deterministic and id uniqueness is something
//! the store can check.
//!
//! ```text
//! ┌──────────────┐  now()        ┌─────────┐  next_id(kind)  ┌──────────────┐
//! │ Clock        │──────────────►│  Store  │◄────────────────│ IdGenerator  │
//! │ SystemClock  │               │         │  seen(kind, id) │ SequentialIds│
//! │ FixedClock   │               └─────────┘────────────────►│ ClockIds     │
//! └──────────────┘                                           └──────────────┘
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;

use crate::types::EntityKind;

// =============================================================================
// Clock
// =============================================================================

/// Source of "now" for timestamps and the subscription gate.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that returns a fixed instant until moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        FixedClock { at }
    }

    /// 1970-01-01T00:00:00Z.
    pub fn epoch() -> Self {
        FixedClock {
            at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Builds a clock at midnight UTC of the given date.
    ///
    /// Falls back to the epoch for an impossible date.
    pub fn at_date(year: i32, month: u32, day: u32) -> Self {
        let at = Utc
            .with_ymd_and_hms(year, month, day, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        FixedClock { at }
    }

    pub fn set(&mut self, at: DateTime<Utc>) {
        self.at = at;
    }

    pub fn advance(&mut self, by: Duration) {
        self.at += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

// =============================================================================
// Id Generation
// =============================================================================

/// Assigns ids to new records.
///
/// `seen` is called by the store for every id already present when it is
/// constructed, so generators that count can start past them.
pub trait IdGenerator {
    fn next_id(&mut self, kind: EntityKind) -> u64;

    fn seen(&mut self, _kind: EntityKind, _id: u64) {}
}

/// Per-collection counters starting at 1.
///
/// Deterministic; the default for tests and for the persistent store.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    last: HashMap<EntityKind, u64>,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, kind: EntityKind) -> u64 {
        let last = self.last.entry(kind).or_insert(0);
        *last += 1;
        *last
    }

    fn seen(&mut self, kind: EntityKind, id: u64) {
        let last = self.last.entry(kind).or_insert(0);
        if id > *last {
            *last = id;
        }
    }
}

/// Millisecond timestamps from a clock, bumped to stay strictly increasing.
///
/// Matches the "current time as id" scheme that older snapshots used, while
/// two records created within the same millisecond still get distinct ids.
pub struct ClockIds<C: Clock> {
    clock: C,
    last: u64,
}

impl<C: Clock> ClockIds<C> {
    pub fn new(clock: C) -> Self {
        ClockIds { clock, last: 0 }
    }
}

impl<C: Clock> IdGenerator for ClockIds<C> {
    fn next_id(&mut self, _kind: EntityKind) -> u64 {
        let millis = self.clock.now().timestamp_millis().max(0) as u64;
        self.last = millis.max(self.last + 1);
        self.last
    }

    fn seen(&mut self, _kind: EntityKind, id: u64) {
        self.last = self.last.max(id);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
