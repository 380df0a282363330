//! # Repository Module
//!
//! Database repository implementations for Souk POS.
//!
//! ## Snapshot Slots
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How the Store Is Persisted                           │
//! │                                                                         │
//! │  PersistentStore (after every mutation)                                │
//! │       │                                                                 │
//! │       │  db.snapshots().save("pos-store", &state)                      │
//! │       ▼                                                                 │
//! │  SnapshotRepository                                                    │
//! │  ├── save(&self, slot, state)     upsert, whole store as JSON          │
//! │  ├── load(&self, slot)            None when the slot was never written │
//! │  ├── exists / slot_names                                               │
//! │  └── delete(&self, slot)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store_slots (name, payload, schema_version, updated_at)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SnapshotRepository`] - Named whole-store snapshots

pub mod snapshot;

pub use snapshot::{SnapshotRepository, SNAPSHOT_SCHEMA_VERSION};
