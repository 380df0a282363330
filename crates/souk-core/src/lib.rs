//! # souk-core: Pure Business Logic for Souk POS
//!
//! This crate is the **heart** of Souk POS. It holds the entity store, the
//! mutation API over it and every derived figure the back office shows, as
//! plain data and pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Souk POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Presentation (out of tree)                   │   │
//! │  │   Customers ─ Inventory ─ Invoices ─ Expenses ─ Cashbox ─ Reports│   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ function calls                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ souk-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   store   │  │  queries  │  │subscription│ │  reports  │  │   │
//! │  │   │ add/update│  │ totals    │  │   gate     │ │ monthly   │  │   │
//! │  │   │ delete    │  │ low stock │  │ activation │ │ by status │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • INJECTED CLOCK + IDS     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           souk-db (snapshot persistence, orchestration)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Enumerations, typed ids, tax rate
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`entities`] - Customer, Product, Order, Expense, Cashbox, Auth, Subscription
//! - [`patch`] - Typed partial updates for every entity
//! - [`store`] - The entity store and its mutation API
//! - [`queries`] - Derived read-only figures over a store snapshot
//! - [`subscription`] - Subscription gate and plan activation
//! - [`reports`] - Dashboard and reports page aggregates
//! - [`clock`] - Injectable clock and id generators
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use souk_core::{Clock, FixedClock, Money, NewProduct, ProductCategory, SequentialIds, Store, StoreState};
//!
//! let clock = FixedClock::epoch();
//! let mut store = Store::new(StoreState::empty(clock.now()), SequentialIds::new(), clock);
//!
//! let helmet = store
//!     .add_product(NewProduct::new("Safety helmet", ProductCategory::SafetyEquipment, Money::from_cents(15_000)))
//!     .unwrap();
//!
//! // A fresh product with stock 0 and min_stock 0 is already "low stock"
//! assert_eq!(store.low_stock_products().len(), 1);
//! assert_eq!(store.product_by_id(helmet.id).unwrap().name, "Safety helmet");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod entities;
pub mod error;
pub mod money;
pub mod patch;
pub mod queries;
pub mod reports;
pub mod store;
pub mod subscription;
pub mod types;
pub mod validation;

mod builtin;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::{Clock, ClockIds, FixedClock, IdGenerator, SequentialIds, SystemClock};
pub use entities::*;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use patch::*;
pub use store::{LastIds, Store, StoreState};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// VAT applied to every invoice subtotal (15%).
///
/// The business runs a single fixed rate; there is no per-product or
/// per-customer tax engine.
pub const DEFAULT_TAX_RATE: TaxRate = TaxRate::from_bps(1500);

/// Name of the durable slot the store snapshot is written to.
pub const STORE_SLOT_NAME: &str = "pos-store";

/// Maximum quantity of a single invoice line.
///
/// Guards against typing 1000 instead of 10 on the invoice form.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Maximum number of lines on one invoice.
pub const MAX_ORDER_ITEMS: usize = 200;
