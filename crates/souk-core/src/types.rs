//! # Domain Types
//!
//! Enumerations, typed identifiers and the tax rate used throughout Souk POS.
//!
//! ## Classification Fields
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Fixed Value Sets                                   │
//! │                                                                         │
//! │  CustomerType      PaymentMethod      OrderStatus      ProductCategory  │
//! │  ────────────      ─────────────      ───────────      ───────────────  │
//! │  in_shop           cash               pending          safety_equipment │
//! │  trading           card               confirmed        trading_supplies │
//! │                    bank_transfer      processing       tools            │
//! │                    credit             completed        consumables      │
//! │                                       cancelled                         │
//! │                                                                         │
//! │  SubscriptionStatus   SubscriptionPlan   Language                       │
//! │  inactive / active    monthly            arabic                         │
//! │  expired / trial      yearly             egyptian                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every collection has its own id newtype (`CustomerId`, `ProductId`, ...)
//! so an order's `customer_id` can never be passed where a product id is
//! expected. Ids are unique within their collection only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so the 15% VAT is 1500 bps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for configuration input).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Typed Identifiers
// =============================================================================

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
        )]
        #[ts(export)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the raw numeric id.
            #[inline]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                $name(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`crate::Customer`].
    CustomerId
);
entity_id!(
    /// Identifier of a [`crate::Product`].
    ProductId
);
entity_id!(
    /// Identifier of an [`crate::Order`] (invoice number).
    OrderId
);
entity_id!(
    /// Identifier of an [`crate::Expense`].
    ExpenseId
);

/// The addressable collections of the store.
///
/// Used to key id generation and to label errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Customer,
    Product,
    Order,
    Expense,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Customer,
        EntityKind::Product,
        EntityKind::Order,
        EntityKind::Expense,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::Product => "product",
            EntityKind::Order => "order",
            EntityKind::Expense => "expense",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Enumerations
// =============================================================================

/// Implements `as_str`, `ALL`, `Display` and `FromStr` for a fieldless enum
/// from a single table of `Variant => "wire_name"` pairs.
macro_rules! wire_enum {
    ($name:ident, $field:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The serialized (snake_case) name.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(ValidationError::NotAllowed {
                        field: $field.to_string(),
                        allowed: $name::ALL.iter().map(|v| v.as_str().to_string()).collect(),
                    }),
                }
            }
        }
    };
}

/// Whether a customer buys over the counter or trades on account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    /// Walk-in customer.
    InShop,
    /// Business customer, usually buying on credit.
    Trading,
}

wire_enum!(CustomerType, "customer_type", {
    InShop => "in_shop",
    Trading => "trading",
});

/// How an invoice or an expense was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    /// On the customer's account. Not valid for expenses.
    Credit,
}

wire_enum!(PaymentMethod, "payment_method", {
    Cash => "cash",
    Card => "card",
    BankTransfer => "bank_transfer",
    Credit => "credit",
});

impl PaymentMethod {
    /// Methods an expense may be paid with.
    pub const FOR_EXPENSES: [PaymentMethod; 3] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::BankTransfer,
    ];

    /// Returns true if an expense can be recorded with this method.
    pub fn allowed_for_expense(&self) -> bool {
        Self::FOR_EXPENSES.contains(self)
    }
}

/// Lifecycle state of an invoice.
///
/// Only `Completed` orders count toward sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Completed,
    Cancelled,
}

wire_enum!(OrderStatus, "status", {
    Pending => "pending",
    Confirmed => "confirmed",
    Processing => "processing",
    Completed => "completed",
    Cancelled => "cancelled",
});

/// Inventory category of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    SafetyEquipment,
    TradingSupplies,
    Tools,
    Consumables,
}

wire_enum!(ProductCategory, "category", {
    SafetyEquipment => "safety_equipment",
    TradingSupplies => "trading_supplies",
    Tools => "tools",
    Consumables => "consumables",
});

/// Subscription state as recorded. See [`crate::subscription`] for the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Inactive,
    Active,
    Expired,
    Trial,
}

wire_enum!(SubscriptionStatus, "status", {
    Inactive => "inactive",
    Active => "active",
    Expired => "expired",
    Trial => "trial",
});

/// Billing period of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    #[default]
    Monthly,
    Yearly,
}

wire_enum!(SubscriptionPlan, "plan", {
    Monthly => "monthly",
    Yearly => "yearly",
});

/// Display language preference. Has no effect on stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// Modern Standard Arabic.
    #[default]
    Arabic,
    /// Egyptian colloquial Arabic.
    Egyptian,
}

wire_enum!(Language, "language", {
    Arabic => "arabic",
    Egyptian => "egyptian",
});

// =============================================================================
// Unit Tests
// =============================================================================
