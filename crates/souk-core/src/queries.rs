//! # Derived Queries
//!
//! Read-only figures computed from a [`StoreState`]. Every call recomputes
//! from scratch; nothing is cached and nothing is mutated.
//!
//! ```text
//! StoreState ──► customer_by_id / product_by_id      Option<&T>
//!            ──► orders_by_customer                  Vec<&Order>  (insertion order)
//!            ──► low_stock_products                  stock <= min_stock
//!            ──► total_sales                         Σ total, Completed only
//!            ──► total_expenses                      Σ amount, all dates
//!            ──► profit                              sales − expenses
//!            ──► search_*                            list page filters
//! ```
//!
//! `profit` is a reporting approximation: it ignores cost of goods sold and
//! cash drawer movements.

use crate::entities::{Customer, Expense, Order, Product};
use crate::money::Money;
use crate::store::StoreState;
use crate::types::{
    CustomerId, CustomerType, ExpenseId, OrderId, OrderStatus, PaymentMethod, ProductCategory,
    ProductId,
};
use crate::validation::{validate_search_query, ValidationResult};

pub use crate::subscription::is_active as is_subscription_active;

// =============================================================================
// Lookups
// =============================================================================

pub fn customer_by_id(state: &StoreState, id: CustomerId) -> Option<&Customer> {
    state.customers.iter().find(|c| c.id == id)
}

pub fn product_by_id(state: &StoreState, id: ProductId) -> Option<&Product> {
    state.products.iter().find(|p| p.id == id)
}

pub fn order_by_id(state: &StoreState, id: OrderId) -> Option<&Order> {
    state.orders.iter().find(|o| o.id == id)
}

pub fn expense_by_id(state: &StoreState, id: ExpenseId) -> Option<&Expense> {
    state.expenses.iter().find(|e| e.id == id)
}

/// Orders written for a customer, in insertion order. Works for deleted
/// customers too.
pub fn orders_by_customer(state: &StoreState, customer_id: CustomerId) -> Vec<&Order> {
    state
        .orders
        .iter()
        .filter(|o| o.customer_id == customer_id)
        .collect()
}

pub fn low_stock_products(state: &StoreState) -> Vec<&Product> {
    state.products.iter().filter(|p| p.is_low_stock()).collect()
}

// =============================================================================
// Totals
// =============================================================================

/// Revenue. Pending, confirmed, processing and cancelled orders are ignored.
pub fn total_sales(state: &StoreState) -> Money {
    state
        .orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .map(|o| o.total)
        .sum()
}

/// Every expense on record, regardless of date.
pub fn total_expenses(state: &StoreState) -> Money {
    state.expenses.iter().map(|e| e.amount).sum()
}

pub fn profit(state: &StoreState) -> Money {
    total_sales(state) - total_expenses(state)
}

// =============================================================================
// List Filters
// =============================================================================

fn contains(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(needle)
}

/// Customers whose name, phone or email contains `term` (case-insensitive),
/// optionally restricted to one type.
pub fn search_customers<'a>(
    state: &'a StoreState,
    term: &str,
    customer_type: Option<CustomerType>,
) -> ValidationResult<Vec<&'a Customer>> {
    let term = validate_search_query(term)?;
    Ok(state
        .customers
        .iter()
        .filter(|c| customer_type.map_or(true, |t| c.customer_type == t))
        .filter(|c| {
            contains(&c.name, &term)
                || contains(&c.phone, &term)
                || c.email.as_deref().is_some_and(|e| contains(e, &term))
        })
        .collect())
}

/// Products whose name or SKU contains `term`, optionally in one category.
pub fn search_products<'a>(
    state: &'a StoreState,
    term: &str,
    category: Option<ProductCategory>,
) -> ValidationResult<Vec<&'a Product>> {
    let term = validate_search_query(term)?;
    Ok(state
        .products
        .iter()
        .filter(|p| category.map_or(true, |c| p.category == c))
        .filter(|p| contains(&p.name, &term) || p.sku.as_deref().is_some_and(|s| contains(s, &term)))
        .collect())
}

/// Orders matching the customer name snapshot or the invoice number.
pub fn search_orders<'a>(
    state: &'a StoreState,
    term: &str,
    status: Option<OrderStatus>,
) -> ValidationResult<Vec<&'a Order>> {
    let term = validate_search_query(term)?;
    Ok(state
        .orders
        .iter()
        .filter(|o| status.map_or(true, |s| o.status == s))
        .filter(|o| contains(&o.customer_name, &term) || contains(&o.id.to_string(), &term))
        .collect())
}

/// Expenses matching category or description.
pub fn search_expenses<'a>(
    state: &'a StoreState,
    term: &str,
    payment_method: Option<PaymentMethod>,
) -> ValidationResult<Vec<&'a Expense>> {
    let term = validate_search_query(term)?;
    Ok(state
        .expenses
        .iter()
        .filter(|e| payment_method.map_or(true, |m| e.payment_method == m))
        .filter(|e| {
            contains(&e.category, &term)
                || e.description.as_deref().is_some_and(|d| contains(d, &term))
        })
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================
