//! # Entities
//!
//! The records held by the store, plus the drafts used to create them.
//!
//! ## Entity Relationships
//! ```text
//! ┌─────────────┐        ┌─────────────────────────────┐        ┌─────────────┐
//! │  Customer   │◄- - - -│           Order             │- - - ->│   Product   │
//! │             │ weak   │  customer_name (snapshot)   │ weak   │             │
//! │ credit_limit│        │  items: [OrderItem]         │        │ stock       │
//! │ balance     │        │    name, price (snapshots)  │        │ min_stock   │
//! └─────────────┘        │  subtotal, tax, total       │        └─────────────┘
//!                        └─────────────────────────────┘
//!
//! ┌─────────────┐        ┌─────────────┐  ┌─────────────┐  ┌──────────────┐
//! │   Expense   │        │   Cashbox   │  │  AuthState  │  │ Subscription │
//! │ (collection)│        │ (singleton) │  │ (singleton) │  │ (singleton)  │
//! └─────────────┘        └─────────────┘  └─────────────┘  └──────────────┘
//! ```
//!
//! References from orders are weak: deleting a customer or product leaves
//! the order untouched and lookups by the stale id return `None`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::types::{
    CustomerId, CustomerType, ExpenseId, OrderId, OrderStatus, PaymentMethod, ProductCategory,
    ProductId, SubscriptionPlan, SubscriptionStatus, TaxRate,
};
use crate::validation::{self, ValidationResult};

// =============================================================================
// Customer
// =============================================================================

/// A walk-in or trading customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: CustomerType,
    pub address: Option<String>,
    /// Maximum outstanding debt allowed on account.
    pub credit_limit: Money,
    /// Outstanding balance. Positive means the customer owes the shop.
    pub current_balance: Money,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Fields for a new customer. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: CustomerType,
    pub address: Option<String>,
    pub credit_limit: Money,
    #[serde(default)]
    pub current_balance: Money,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>, phone: impl Into<String>, customer_type: CustomerType) -> Self {
        NewCustomer {
            name: name.into(),
            phone: phone.into(),
            email: None,
            customer_type,
            address: None,
            credit_limit: Money::zero(),
            current_balance: Money::zero(),
            is_active: true,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_credit_limit(mut self, limit: Money) -> Self {
        self.credit_limit = limit;
        self
    }

    pub fn with_balance(mut self, balance: Money) -> Self {
        self.current_balance = balance;
        self
    }

    pub(crate) fn into_customer(self, id: CustomerId, created_at: DateTime<Utc>) -> Customer {
        Customer {
            id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            customer_type: self.customer_type,
            address: self.address,
            credit_limit: self.credit_limit,
            current_balance: self.current_balance,
            is_active: self.is_active,
            created_at,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// An inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: ProductCategory,
    pub sku: Option<String>,
    /// Sale price per unit.
    pub price: Money,
    /// Purchase cost per unit.
    #[serde(default)]
    pub cost: Money,
    pub stock: i64,
    /// Reorder threshold.
    pub min_stock: i64,
    pub supplier: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// `stock <= min_stock`. Computed on read, never stored.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }

    /// Cost of everything on the shelf.
    pub fn stock_value(&self) -> Money {
        self.cost.multiply_quantity(self.stock)
    }
}

/// Fields for a new product. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: ProductCategory,
    pub sku: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub cost: Money,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub min_stock: i64,
    pub supplier: Option<String>,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl NewProduct {
    /// A product with no stock, zero cost and a zero reorder threshold.
    pub fn new(name: impl Into<String>, category: ProductCategory, price: Money) -> Self {
        NewProduct {
            name: name.into(),
            category,
            sku: None,
            price,
            cost: Money::zero(),
            stock: 0,
            min_stock: 0,
            supplier: None,
            description: None,
            is_active: true,
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_cost(mut self, cost: Money) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_stock(mut self, stock: i64, min_stock: i64) -> Self {
        self.stock = stock;
        self.min_stock = min_stock;
        self
    }

    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn into_product(self, id: ProductId, created_at: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            category: self.category,
            sku: self.sku,
            price: self.price,
            cost: self.cost,
            stock: self.stock,
            min_stock: self.min_stock,
            supplier: self.supplier,
            description: self.description,
            is_active: self.is_active,
            created_at,
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// One invoice line. `name` and `price` are copied from the product when
/// the line is created and are not kept in sync afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i64,
    pub price: Money,
    pub total: Money,
}

/// An invoice line before totals are computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemDraft {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i64,
    pub price: Money,
}

impl OrderItemDraft {
    pub fn new(product_id: ProductId, name: impl Into<String>, quantity: i64, price: Money) -> Self {
        OrderItemDraft {
            product_id,
            name: name.into(),
            quantity,
            price,
        }
    }

    /// Snapshots the product's current name and sale price.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        OrderItemDraft {
            product_id: product.id,
            name: product.name.clone(),
            quantity,
            price: product.price,
        }
    }

    /// Validates quantity and price, then computes the line total.
    pub fn try_into_item(self) -> ValidationResult<OrderItem> {
        validation::validate_item_draft(&self)?;
        let total = self
            .price
            .checked_mul_quantity(self.quantity)
            .ok_or_else(|| validation::amount_too_large("total"))?;
        Ok(self.with_total(total))
    }

    /// Unchecked; the total saturates. For lines built from known data.
    pub fn into_item(self) -> OrderItem {
        let total = self.price.multiply_quantity(self.quantity);
        self.with_total(total)
    }

    fn with_total(self, total: Money) -> OrderItem {
        OrderItem {
            total,
            product_id: self.product_id,
            name: self.name,
            quantity: self.quantity,
            price: self.price,
        }
    }
}

/// The money fields of an invoice.
///
/// ```text
/// subtotal = Σ item.total
/// tax      = subtotal × rate        (rounded to the piastre)
/// total    = subtotal + tax − discount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Saturating variant of [`OrderTotals::try_compute`].
    pub fn compute(items: &[OrderItem], discount: Money, rate: TaxRate) -> Self {
        let subtotal: Money = items.iter().map(|item| item.total).sum();
        let tax = subtotal.calculate_tax(rate);
        OrderTotals {
            subtotal,
            tax,
            discount,
            total: subtotal + tax - discount,
        }
    }

    /// Fails with `OutOfRange` when a sum leaves the money range.
    pub fn try_compute(items: &[OrderItem], discount: Money, rate: TaxRate) -> ValidationResult<Self> {
        let subtotal = Money::checked_sum(items.iter().map(|item| item.total))
            .ok_or_else(|| validation::amount_too_large("subtotal"))?;
        let tax = subtotal.calculate_tax(rate);
        let total = subtotal
            .checked_add(tax)
            .and_then(|gross| gross.checked_sub(discount))
            .ok_or_else(|| validation::amount_too_large("total"))?;

        Ok(OrderTotals {
            subtotal,
            tax,
            discount,
            total,
        })
    }
}

/// An invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    /// Customer name at the time the invoice was written.
    pub customer_name: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Set while `status` is `Completed`, `None` otherwise.
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn totals(&self) -> OrderTotals {
        OrderTotals {
            subtotal: self.subtotal,
            tax: self.tax,
            discount: self.discount,
            total: self.total,
        }
    }

    pub(crate) fn set_totals(&mut self, totals: OrderTotals) {
        self.subtotal = totals.subtotal;
        self.tax = totals.tax;
        self.discount = totals.discount;
        self.total = totals.total;
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Fields for a new invoice. Totals are computed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub items: Vec<OrderItemDraft>,
    #[serde(default)]
    pub discount: Money,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: OrderStatus,
    pub notes: Option<String>,
}

impl OrderDraft {
    pub fn new(
        customer_id: CustomerId,
        customer_name: impl Into<String>,
        items: Vec<OrderItemDraft>,
        payment_method: PaymentMethod,
    ) -> Self {
        OrderDraft {
            customer_id,
            customer_name: customer_name.into(),
            items,
            discount: Money::zero(),
            payment_method,
            status: OrderStatus::Pending,
            notes: None,
        }
    }

    /// Snapshots the customer's current name.
    pub fn for_customer(
        customer: &Customer,
        items: Vec<OrderItemDraft>,
        payment_method: PaymentMethod,
    ) -> Self {
        Self::new(customer.id, customer.name.clone(), items, payment_method)
    }

    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

// =============================================================================
// Expense
// =============================================================================

/// Money paid out of the business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Expense {
    pub id: ExpenseId,
    /// Free text, e.g. "rent" or "utilities".
    pub category: String,
    pub description: Option<String>,
    pub amount: Money,
    /// Business date the expense belongs to.
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub payment_method: PaymentMethod,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Fields for a new expense. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub category: String,
    pub description: Option<String>,
    pub amount: Money,
    pub date: NaiveDate,
    pub payment_method: PaymentMethod,
}

impl NewExpense {
    pub fn new(
        category: impl Into<String>,
        amount: Money,
        date: NaiveDate,
        payment_method: PaymentMethod,
    ) -> Self {
        NewExpense {
            category: category.into(),
            description: None,
            amount,
            date,
            payment_method,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn into_expense(self, id: ExpenseId, created_at: DateTime<Utc>) -> Expense {
        Expense {
            id,
            category: self.category,
            description: self.description,
            amount: self.amount,
            date: self.date,
            payment_method: self.payment_method,
            created_at,
        }
    }
}

// =============================================================================
// Singletons
// =============================================================================

/// The cash drawer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cashbox {
    pub opening_balance: Money,
    pub current_balance: Money,
    pub daily_sales: Money,
    pub daily_expenses: Money,
    /// Stamped on every cashbox mutation.
    #[ts(as = "String")]
    pub last_updated: DateTime<Utc>,
}

impl Cashbox {
    /// An empty drawer.
    pub fn empty(now: DateTime<Utc>) -> Self {
        Cashbox {
            opening_balance: Money::zero(),
            current_balance: Money::zero(),
            daily_sales: Money::zero(),
            daily_expenses: Money::zero(),
            last_updated: now,
        }
    }
}

/// The signed-in operator. Opaque to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserProfile {
    /// Remote account id, when the profile came from the data service.
    #[ts(as = "Option<String>")]
    pub id: Option<Uuid>,
    pub email: String,
    pub name: String,
}

impl UserProfile {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        UserProfile {
            id: None,
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Session state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user: Option<UserProfile>,
}

/// Subscription record. Whether it currently grants access is decided by
/// [`crate::subscription::is_active`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Subscription {
    pub status: SubscriptionStatus,
    pub plan: SubscriptionPlan,
    #[ts(as = "Option<String>")]
    pub renewal_date: Option<DateTime<Utc>>,
    /// One-time purchase; renewal date is never checked.
    pub is_permanent: bool,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::DEFAULT_TAX_RATE;

    fn helmet() -> Product {
        NewProduct::new("Safety helmet", ProductCategory::SafetyEquipment, Money::from_major(150))
            .with_cost(Money::from_major(100))
            .with_stock(50, 10)
            .into_product(ProductId(1), DateTime::<Utc>::UNIX_EPOCH)
    }

    #[test]
    fn test_low_stock_boundary() {
        let mut product = helmet();
        assert!(!product.is_low_stock());
        product.stock = 10;
        assert!(product.is_low_stock());
        product.stock = 11;
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_stock_value() {
        assert_eq!(helmet().stock_value(), Money::from_major(5000));
    }

    #[test]
    fn test_item_snapshots_product() {
        let product = helmet();
        let item = OrderItemDraft::from_product(&product, 2).into_item();
        assert_eq!(item.name, "Safety helmet");
        assert_eq!(item.price, Money::from_major(150));
        assert_eq!(item.total, Money::from_major(300));
    }

    #[test]
    fn test_order_totals() {
        let items = vec![
            OrderItemDraft::new(ProductId(1), "Helmet", 2, Money::from_major(150)).into_item(),
            OrderItemDraft::new(ProductId(3), "Gloves", 5, Money::from_major(25)).into_item(),
        ];
        let totals = OrderTotals::compute(&items, Money::zero(), DEFAULT_TAX_RATE);
        assert_eq!(totals.subtotal, Money::from_major(425));
        assert_eq!(totals.tax, Money::from_cents(6375));
        assert_eq!(totals.total, Money::from_cents(48_875));

        let discounted = OrderTotals::compute(&items, Money::from_major(25), DEFAULT_TAX_RATE);
        assert_eq!(discounted.total, Money::from_cents(46_375));
    }

    #[test]
    fn test_checked_item_rejects_bad_lines() {
        let line = |qty, price| OrderItemDraft::new(ProductId(1), "Helmet", qty, price);

        let item = line(2, Money::from_major(150)).try_into_item().unwrap();
        assert_eq!(item.total, Money::from_major(300));

        assert!(matches!(
            line(0, Money::from_major(150)).try_into_item(),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            line(i64::MAX / 10, Money::from_major(1)).try_into_item(),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            line(1, Money::from_major(-1)).try_into_item(),
            Err(ValidationError::Negative { .. })
        ));
        // within the quantity limit but the total does not fit
        assert_eq!(
            line(2, Money::from_cents(i64::MAX / 2 + 1)).try_into_item(),
            Err(ValidationError::OutOfRange {
                field: "total".to_string(),
                min: i64::MIN,
                max: i64::MAX,
            })
        );
    }

    #[test]
    fn test_checked_totals_overflow() {
        let huge = OrderItemDraft::new(ProductId(1), "Helmet", 1, Money::from_cents(i64::MAX))
            .try_into_item()
            .unwrap();
        let items = vec![huge.clone(), huge];

        let err = OrderTotals::try_compute(&items, Money::zero(), DEFAULT_TAX_RATE).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "subtotal"));

        let items = vec![OrderItemDraft::new(ProductId(1), "Helmet", 2, Money::from_major(150))
            .try_into_item()
            .unwrap()];
        assert_eq!(
            OrderTotals::try_compute(&items, Money::zero(), DEFAULT_TAX_RATE).unwrap(),
            OrderTotals::compute(&items, Money::zero(), DEFAULT_TAX_RATE)
        );
    }

    #[test]
    fn test_customer_type_serializes_as_type() {
        let customer = NewCustomer::new("Ahmed", "+201001234567", CustomerType::InShop)
            .into_customer(CustomerId(1), DateTime::<Utc>::UNIX_EPOCH);
        let json = serde_json::to_value(&customer).unwrap();
        assert_eq!(json["type"], "in_shop");
        assert_eq!(json["credit_limit"], 0);
    }

    #[test]
    fn test_new_product_deserializes_with_defaults() {
        let json = r#"{"name":"Gloves","category":"consumables","sku":null,"price":2500,
                       "supplier":null,"description":null}"#;
        let draft: NewProduct = serde_json::from_str(json).unwrap();
        assert_eq!(draft.stock, 0);
        assert_eq!(draft.cost, Money::zero());
        assert!(draft.is_active);
    }
}
