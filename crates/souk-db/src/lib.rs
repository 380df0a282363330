//! # souk-db: Persistence Layer for Souk POS
//!
//! This crate keeps the souk-core store across restarts. The whole store is
//! saved as one JSON snapshot under a named slot in SQLite, using sqlx for
//! async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Souk POS Data Flow                               │
//! │                                                                         │
//! │  UI action (add customer, complete invoice, ...)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     souk-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │PersistentStore│    │   Snapshot    │    │  Database    │  │   │
//! │  │   │ (session.rs)  │───►│  Repository   │───►│  (pool.rs)   │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ Mutex<Store>  │    │ save / load   │    │ SqlitePool   │  │   │
//! │  │   │ apply/read    │    │ per slot      │    │ migrations   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/pos/souk.db  (store_slots table)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Snapshot slot repository
//! - [`config`] - `souk.toml` + `SOUK_*` environment configuration
//! - [`session`] - Store hydrated from and saved to a slot
//!
//! ## Usage
//!
//! ```rust,ignore
//! use souk_core::{SequentialIds, SystemClock};
//! use souk_db::{AppConfig, Database, PersistentStore};
//!
//! let config = AppConfig::load_or_default(None);
//! let db = Database::new(config.db_config()?).await?;
//!
//! let store = PersistentStore::open(&db, &config.store.slot, SequentialIds::new(), SystemClock).await?;
//! let applied = store.try_apply(|s| s.add_customer(draft)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::AppConfig;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{SnapshotRepository, SNAPSHOT_SCHEMA_VERSION};
pub use session::{Applied, PersistentStore};
