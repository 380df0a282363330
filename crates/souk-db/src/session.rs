//! # Persistent Store
//!
//! A [`Store`] bound to a snapshot slot: hydrated on open and saved after
//! every mutation.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  PersistentStore::open(db, slot, ids, clock)                           │
//! │       │                                                                 │
//! │       ├── slot has a snapshot   → hydrate from it                      │
//! │       ├── slot is empty         → built-in dataset, saved              │
//! │       └── slot is unreadable    → built-in dataset, saved, warn!       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  expire_lapsed()  (caller's choice; saved only if the status changed)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  apply(|store| store.add_customer(..))                                 │
//! │       │                                                                 │
//! │       ├── mutate in memory (under the lock)                            │
//! │       └── save snapshot ──► failure is logged and handed back as       │
//! │                              Applied::warning; the mutation stands     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lock is held across the save, so snapshots land in mutation order.
//!
//! Opening never changes a hydrated snapshot: what was saved is exactly what
//! comes back. Moving a lapsed subscription to `Expired` is a separate step.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::SnapshotRepository;
use souk_core::{Clock, CoreResult, IdGenerator, Store, StoreState};

/// Result of a mutation through [`PersistentStore`].
#[derive(Debug)]
#[must_use]
pub struct Applied<T> {
    /// What the mutation returned.
    pub value: T,

    /// Set when the snapshot could not be written afterwards.
    pub warning: Option<DbError>,
}

impl<T> Applied<T> {
    pub fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

#[derive(Debug)]
pub struct PersistentStore {
    store: Mutex<Store>,
    snapshots: SnapshotRepository,
    slot: String,
}

impl PersistentStore {
    /// Hydrates the store from `slot`.
    ///
    /// Falls back to [`StoreState::builtin`] when the slot is empty or
    /// unreadable. Any other database error is returned.
    pub async fn open(
        db: &Database,
        slot: impl Into<String>,
        ids: impl IdGenerator + Send + 'static,
        clock: impl Clock + Send + 'static,
    ) -> DbResult<Self> {
        let slot = slot.into();
        let snapshots = db.snapshots();

        let (state, dirty) = match snapshots.load(&slot).await {
            Ok(Some(state)) => {
                debug!(slot = %slot, "Hydrated store from snapshot");
                (state, false)
            }
            Ok(None) => {
                info!(slot = %slot, "No snapshot found, starting from built-in data");
                (StoreState::builtin(clock.now()), true)
            }
            Err(e) if e.is_corrupt() => {
                warn!(slot = %slot, error = %e, "Discarding unreadable snapshot");
                (StoreState::builtin(clock.now()), true)
            }
            Err(e) => return Err(e),
        };

        let store = Store::new(state, ids, clock);

        if dirty {
            if let Err(e) = snapshots.save(&slot, store.state()).await {
                warn!(slot = %slot, error = %e, "Failed to write initial snapshot");
            }
        }

        Ok(PersistentStore {
            store: Mutex::new(store),
            snapshots,
            slot,
        })
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Runs `mutate` and saves the resulting state.
    pub async fn apply<T>(&self, mutate: impl FnOnce(&mut Store) -> T) -> Applied<T> {
        let mut store = self.store.lock().await;
        let value = mutate(&mut *store);
        let warning = self.persist(&store).await;
        Applied { value, warning }
    }

    /// Like [`apply`](Self::apply) for fallible mutations. Nothing is saved
    /// when `mutate` fails, since the state is unchanged.
    pub async fn try_apply<T>(
        &self,
        mutate: impl FnOnce(&mut Store) -> CoreResult<T>,
    ) -> CoreResult<Applied<T>> {
        let mut store = self.store.lock().await;
        let value = mutate(&mut *store)?;
        let warning = self.persist(&store).await;
        Ok(Applied { value, warning })
    }

    /// Marks a subscription whose renewal date has passed as `Expired`,
    /// saving only when the status actually changed.
    ///
    /// Returns whether it changed.
    pub async fn expire_lapsed(&self) -> Applied<bool> {
        let mut store = self.store.lock().await;
        if !store.expire_lapsed_subscription() {
            return Applied {
                value: false,
                warning: None,
            };
        }

        info!(slot = %self.slot, "Subscription lapsed");
        let warning = self.persist(&store).await;
        Applied {
            value: true,
            warning,
        }
    }

    /// Read-only access to the live store.
    pub async fn read<T>(&self, query: impl FnOnce(&Store) -> T) -> T {
        let store = self.store.lock().await;
        query(&*store)
    }

    /// Clone of the current state.
    pub async fn snapshot(&self) -> StoreState {
        self.read(|store| store.state().clone()).await
    }

    /// Saves the current state, returning the error instead of logging it.
    pub async fn save_now(&self) -> DbResult<()> {
        let store = self.store.lock().await;
        self.snapshots.save(&self.slot, store.state()).await
    }

    /// Replaces the in-memory state with the slot's contents.
    ///
    /// Returns false (and leaves the store alone) when the slot is empty.
    pub async fn reload(&self) -> DbResult<bool> {
        let mut store = self.store.lock().await;
        match self.snapshots.load(&self.slot).await? {
            Some(state) => {
                store.replace_state(state);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn persist(&self, store: &Store) -> Option<DbError> {
        match self.snapshots.save(&self.slot, store.state()).await {
            Ok(()) => None,
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "Failed to persist store");
                Some(e)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
