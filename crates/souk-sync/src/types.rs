//! # Remote Row Types
//!
//! Shapes the data service uses where they differ from the local store.
//!
//! Customers, products and expenses travel as the souk-core entity,
//! draft and patch types unchanged. Orders keep their line items in a
//! separate `order_items` table, so the header and the items get their own
//! types here. Cashbox transactions and auth sessions exist only remotely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use souk_core::{
    CustomerId, Money, Order, OrderId, OrderItem, OrderStatus, PaymentMethod, ProductId,
    UserProfile,
};

// =============================================================================
// Orders
// =============================================================================

/// An `orders` row with its embedded `order_items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOrder {
    pub id: OrderId,
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub customer_name: String,
    pub subtotal: Money,
    pub tax: Money,
    #[serde(default)]
    pub discount: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_items: Vec<RemoteOrderItem>,
}

/// An `order_items` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOrderItem {
    pub id: u64,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: i64,
    pub price: Money,
    pub total: Money,
}

/// Header insert body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRemoteOrder {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewRemoteOrder {
    /// Header and item bodies for an order already built locally.
    pub fn from_order(order: &Order) -> (Self, Vec<NewRemoteOrderItem>) {
        let header = NewRemoteOrder {
            customer_id: order.customer_id,
            customer_name: order.customer_name.clone(),
            subtotal: order.subtotal,
            tax: order.tax,
            discount: order.discount,
            total: order.total,
            payment_method: order.payment_method,
            status: order.status,
            notes: order.notes.clone(),
        };
        let items = order.items.iter().map(NewRemoteOrderItem::from).collect();
        (header, items)
    }
}

/// Line item insert body; the order id is added at insert time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRemoteOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub price: Money,
    pub total: Money,
}

impl From<&OrderItem> for NewRemoteOrderItem {
    fn from(item: &OrderItem) -> Self {
        NewRemoteOrderItem {
            product_id: item.product_id,
            product_name: item.name.clone(),
            quantity: item.quantity,
            price: item.price,
            total: item.total,
        }
    }
}

/// Header fields that can change after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHeaderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

// =============================================================================
// Cashbox
// =============================================================================

/// One row of the `get_daily_sales_summary` RPC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    #[serde(default)]
    pub total_sales: Money,
    #[serde(default)]
    pub total_orders: i64,
    #[serde(default)]
    pub total_customers: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashboxTransactionType {
    CashIn,
    CashOut,
    Sale,
    Expense,
}

/// A `cashbox_transactions` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashboxTransaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub transaction_type: CashboxTransactionType,
    pub amount: Money,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCashboxTransaction {
    #[serde(rename = "type")]
    pub transaction_type: CashboxTransactionType,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewCashboxTransaction {
    pub fn new(transaction_type: CashboxTransactionType, amount: Money) -> Self {
        NewCashboxTransaction {
            transaction_type,
            amount,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// =============================================================================
// Auth
// =============================================================================

/// A user as the auth service reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl RemoteUser {
    /// `name` or `full_name` from the sign-up metadata.
    pub fn display_name(&self) -> Option<&str> {
        ["name", "full_name"]
            .iter()
            .find_map(|key| self.user_metadata.get(key).and_then(|v| v.as_str()))
            .filter(|name| !name.trim().is_empty())
    }
}

/// Feeds [`Store::login`](souk_core::Store::login) after a remote sign-in.
impl From<RemoteUser> for UserProfile {
    fn from(user: RemoteUser) -> Self {
        let email = user.email.clone().unwrap_or_default();
        let name = match user.display_name() {
            Some(name) => name.to_string(),
            None => email.split('@').next().unwrap_or_default().to_string(),
        };

        UserProfile {
            id: Some(user.id),
            email,
            name,
        }
    }
}

/// A signed-in session.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: String,
    pub user: RemoteUser,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Result of a sign-up. `session` is `None` while the address awaits
/// confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpOutcome {
    pub user: RemoteUser,
    pub session: Option<Session>,
}

/// Session-change notification.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(RemoteUser),
    SignedOut,
}
