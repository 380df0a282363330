//! # souk-sync: Remote Backend Client for Souk POS
//!
//! Typed async client for the hosted data service the back office can
//! mirror to. It speaks PostgREST-style REST for the tables and the
//! service's `/auth/v1` API for sign-in.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Remote Client Layout                             │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 BackendClient (client.rs)                        │  │
//! │  │   reqwest pool • apikey header • bearer token • status mapping  │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ TableEndpoint  │  │ CashboxEndpoint│  │  RemoteAuth            │    │
//! │  │                │  │                │  │                        │    │
//! │  │ customers      │  │ daily summary  │  │ sign up / in / out     │    │
//! │  │ products (+low)│  │ day's log      │  │ current user, session  │    │
//! │  │ orders (+create│  │ append         │  │ AuthEvent broadcast    │    │
//! │  │ expenses       │  │                │  │                        │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Model
//! One request per call. Any failure comes back as a [`SyncError`] carrying
//! the service's own message; nothing is retried and nothing is rolled back.
//!
//! ## Usage
//! ```rust,ignore
//! use souk_sync::{AuthProvider, BackendClient};
//!
//! let client = BackendClient::from_env()?;
//! let session = client.auth().sign_in("owner@shop.eg", "password").await?;
//! store.login(session.user.into());
//!
//! let low = client.products().low_stock().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod cashbox;
pub mod client;
pub mod config;
pub mod error;
pub mod orders;
pub mod table;
pub mod types;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::{AuthProvider, RemoteAuth};
pub use cashbox::CashboxEndpoint;
pub use client::BackendClient;
pub use config::RemoteConfig;
pub use error::{SyncError, SyncResult};
pub use table::TableEndpoint;
pub use types::*;
