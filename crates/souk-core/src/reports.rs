//! # Reports
//!
//! Aggregates behind the dashboard, reports, inventory and expenses pages.
//! Like [`crate::queries`], everything here is a pure function of a
//! [`StoreState`].

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::entities::{Expense, Product};
use crate::money::Money;
use crate::queries;
use crate::store::StoreState;
use crate::types::{CustomerType, OrderStatus, ProductCategory};

// =============================================================================
// Dashboard
// =============================================================================

/// The headline figures on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardSummary {
    pub customer_count: usize,
    pub product_count: usize,
    pub order_count: usize,
    pub completed_order_count: usize,
    pub total_sales: Money,
    pub total_expenses: Money,
    pub profit: Money,
    pub low_stock_count: usize,
    pub cashbox_balance: Money,
}

impl DashboardSummary {
    pub fn compute(state: &StoreState) -> Self {
        let total_sales = queries::total_sales(state);
        let total_expenses = queries::total_expenses(state);

        DashboardSummary {
            customer_count: state.customers.len(),
            product_count: state.products.len(),
            order_count: state.orders.len(),
            completed_order_count: state
                .orders
                .iter()
                .filter(|o| o.status == OrderStatus::Completed)
                .count(),
            total_sales,
            total_expenses,
            profit: total_sales - total_expenses,
            low_stock_count: queries::low_stock_products(state).len(),
            cashbox_balance: state.cashbox.current_balance,
        }
    }
}

// =============================================================================
// Monthly Figures
// =============================================================================

/// Sales and expenses for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyTotals {
    /// 1 = January.
    pub month: u32,
    pub sales: Money,
    pub expenses: Money,
}

impl MonthlyTotals {
    pub fn net(&self) -> Money {
        self.sales - self.expenses
    }
}

/// Twelve entries, January first.
///
/// Sales are completed order totals bucketed by `created_at` (UTC);
/// expenses are bucketed by their business `date`.
pub fn monthly_sales_and_expenses(state: &StoreState, year: i32) -> Vec<MonthlyTotals> {
    let mut months: Vec<MonthlyTotals> = (1..=12)
        .map(|month| MonthlyTotals {
            month,
            sales: Money::zero(),
            expenses: Money::zero(),
        })
        .collect();

    for order in state.orders.iter().filter(|o| o.is_completed()) {
        if order.created_at.year() == year {
            months[order.created_at.month0() as usize].sales += order.total;
        }
    }

    for expense in &state.expenses {
        if expense.date.year() == year {
            months[expense.date.month0() as usize].expenses += expense.amount;
        }
    }

    months
}

/// Expenses dated within the given month, in insertion order.
pub fn expenses_in_month(state: &StoreState, year: i32, month: u32) -> Vec<&Expense> {
    state
        .expenses
        .iter()
        .filter(|e| e.date.year() == year && e.date.month() == month)
        .collect()
}

// =============================================================================
// Breakdowns
// =============================================================================

/// Every category, including empty ones, in declaration order.
pub fn product_count_by_category(state: &StoreState) -> Vec<(ProductCategory, usize)> {
    ProductCategory::ALL
        .iter()
        .map(|&category| {
            let count = state.products.iter().filter(|p| p.category == category).count();
            (category, count)
        })
        .collect()
}

pub fn order_count_by_status(state: &StoreState) -> Vec<(OrderStatus, usize)> {
    OrderStatus::ALL
        .iter()
        .map(|&status| {
            let count = state.orders.iter().filter(|o| o.status == status).count();
            (status, count)
        })
        .collect()
}

pub fn customer_count_by_type(state: &StoreState) -> Vec<(CustomerType, usize)> {
    CustomerType::ALL
        .iter()
        .map(|&customer_type| {
            let count = state
                .customers
                .iter()
                .filter(|c| c.customer_type == customer_type)
                .count();
            (customer_type, count)
        })
        .collect()
}

// =============================================================================
// Inventory
// =============================================================================

/// Σ cost × stock over all products.
pub fn inventory_value(state: &StoreState) -> Money {
    state.products.iter().map(Product::stock_value).sum()
}

/// The `n` products with the most units on hand. Ties keep insertion order.
pub fn top_stocked_products(state: &StoreState, n: usize) -> Vec<&Product> {
    let mut products: Vec<&Product> = state.products.iter().collect();
    products.sort_by(|a, b| b.stock.cmp(&a.stock));
    products.truncate(n);
    products
}

// =============================================================================
// Unit Tests
// =============================================================================
