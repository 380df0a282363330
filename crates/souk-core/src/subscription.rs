//! # Subscription Gate
//!
//! Decides whether the application is unlocked, and builds the state
//! transitions the subscription page performs.
//!
//! ## State Machine
//! ```text
//!                 set_subscription / activate
//!   ┌──────────┐ ─────────────────────────────► ┌──────────┐
//!   │ inactive │                                 │  active  │
//!   └──────────┘ ◄───────────────────────────── │  trial   │
//!        ▲                 logout               └────┬─────┘
//!        │                                           │ expire_lapsed
//!        │               logout                      ▼ (renewal < now)
//!        └────────────────────────────────────  ┌──────────┐
//!                                                │ expired  │
//!                                                └──────────┘
//!
//!   is_permanent = true  →  gate is open regardless of status/renewal
//! ```
//!
//! The gate itself ([`is_active`]) never changes state. Moving a lapsed
//! subscription to `Expired` is an explicit step
//! ([`crate::Store::expire_lapsed_subscription`]).

use chrono::{DateTime, Months, Utc};

use crate::entities::Subscription;
use crate::money::Money;
use crate::patch::SubscriptionPatch;
use crate::types::{SubscriptionPlan, SubscriptionStatus};

/// One-time price of a permanent license.
pub const PERMANENT_PRICE: Money = Money::from_major(7990);

impl SubscriptionPlan {
    /// Price of one billing period.
    pub const fn price(&self) -> Money {
        match self {
            SubscriptionPlan::Monthly => Money::from_major(299),
            SubscriptionPlan::Yearly => Money::from_major(2990),
        }
    }

    const fn period(&self) -> Months {
        match self {
            SubscriptionPlan::Monthly => Months::new(1),
            SubscriptionPlan::Yearly => Months::new(12),
        }
    }

    /// Renewal date one period after `from`.
    ///
    /// Calendar arithmetic: Jan 31 + 1 month is the last day of February.
    pub fn renewal_after(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        from.checked_add_months(self.period())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Amount to charge for a plan purchase.
pub fn quote(plan: SubscriptionPlan, permanent: bool) -> Money {
    if permanent {
        PERMANENT_PRICE
    } else {
        plan.price()
    }
}

/// The authorization gate.
///
/// 1. Permanent → open.
/// 2. Status other than `Active`/`Trial` → closed.
/// 3. No renewal date → closed.
/// 4. Otherwise open iff `renewal_date >= now`.
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use souk_core::{subscription, Subscription, SubscriptionStatus};
///
/// let now = Utc::now();
/// let sub = Subscription {
///     status: SubscriptionStatus::Active,
///     renewal_date: Some(now + Duration::days(3)),
///     ..Default::default()
/// };
/// assert!(subscription::is_active(&sub, now));
/// ```
pub fn is_active(subscription: &Subscription, now: DateTime<Utc>) -> bool {
    if subscription.is_permanent {
        return true;
    }

    if !matches!(
        subscription.status,
        SubscriptionStatus::Active | SubscriptionStatus::Trial
    ) {
        return false;
    }

    match subscription.renewal_date {
        Some(renewal) => renewal >= now,
        None => false,
    }
}

/// True when the record still says `Active`/`Trial` but the renewal date
/// has passed.
pub fn is_lapsed(subscription: &Subscription, now: DateTime<Utc>) -> bool {
    !subscription.is_permanent
        && matches!(
            subscription.status,
            SubscriptionStatus::Active | SubscriptionStatus::Trial
        )
        && subscription.renewal_date.is_some_and(|renewal| renewal < now)
}

/// Patch recording a purchase made at `now`.
///
/// A permanent purchase clears the renewal date; a periodic one sets it one
/// period ahead.
pub fn activation(plan: SubscriptionPlan, permanent: bool, now: DateTime<Utc>) -> SubscriptionPatch {
    let renewal_date = if permanent {
        None
    } else {
        Some(plan.renewal_after(now))
    };

    SubscriptionPatch {
        status: Some(SubscriptionStatus::Active),
        plan: Some(plan),
        renewal_date: Some(renewal_date),
        is_permanent: Some(permanent),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
