//! # Partial Updates
//!
//! One patch struct per updatable record. A `None` field leaves the target
//! untouched; `Some(v)` overwrites it. Fields that are themselves optional
//! on the record use `Option<Option<T>>` so a patch can tell "leave alone"
//! (`None`) from "clear" (`Some(None)`).
//!
//! ```rust
//! use souk_core::{CustomerPatch, Money};
//!
//! let patch = CustomerPatch {
//!     current_balance: Some(Money::from_major(250)),
//!     email: Some(None), // clear the email
//!     ..Default::default()
//! };
//! assert!(!patch.is_empty());
//! ```
//!
//! Over JSON, a missing key is `None` and an explicit `null` is `Some(None)`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::entities::{Cashbox, Customer, Expense, OrderItemDraft, Product, Subscription};
use crate::money::Money;
use crate::types::{
    CustomerId, CustomerType, OrderStatus, PaymentMethod, ProductCategory, SubscriptionPlan,
    SubscriptionStatus,
};

/// Copies every `Some` field of a patch onto the target.
macro_rules! merge {
    ($patch:expr, $target:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $target.$field = value;
            }
        )+
    };
}

/// Distinguishes an explicit `null` from a missing key.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<CustomerType>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_balance: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl CustomerPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(self, customer: &mut Customer) {
        merge!(self, customer;
            name, phone, email, customer_type, address,
            credit_limit, current_balance, is_active);
    }
}

// =============================================================================
// Product
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ProductCategory>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub sku: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stock: Option<i64>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub supplier: Option<Option<String>>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Only sets the stock level.
    pub fn stock(stock: i64) -> Self {
        ProductPatch {
            stock: Some(stock),
            ..Default::default()
        }
    }

    pub fn apply_to(self, product: &mut Product) {
        merge!(self, product;
            name, category, sku, price, cost, stock, min_stock,
            supplier, description, is_active);
    }
}

// =============================================================================
// Order
// =============================================================================

/// Changing `items` or `discount` recomputes the invoice totals; changing
/// `status` maintains `completed_at`. Both happen in
/// [`crate::Store::update_order`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItemDraft>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl OrderPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Only moves the order to `status`.
    pub fn status(status: OrderStatus) -> Self {
        OrderPatch {
            status: Some(status),
            ..Default::default()
        }
    }

    /// True if applying this patch changes the money fields.
    pub fn touches_totals(&self) -> bool {
        self.items.is_some() || self.discount.is_some()
    }
}

// =============================================================================
// Expense
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpensePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

impl ExpensePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(self, expense: &mut Expense) {
        merge!(self, expense; category, description, amount, date, payment_method);
    }
}

// =============================================================================
// Singletons
// =============================================================================

/// `last_updated` is not patchable; the store stamps it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashboxPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_balance: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_sales: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_expenses: Option<Money>,
}

impl CashboxPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(self, cashbox: &mut Cashbox) {
        merge!(self, cashbox; opening_balance, current_balance, daily_sales, daily_expenses);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<SubscriptionPlan>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub renewal_date: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_permanent: Option<bool>,
}

impl SubscriptionPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(self, subscription: &mut Subscription) {
        merge!(self, subscription; status, plan, renewal_date, is_permanent);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
