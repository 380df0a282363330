//! Built-in dataset used on first start, when the persisted slot is
//! unreadable, and by the `seed` binary.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::entities::{
    AuthState, Cashbox, Customer, Expense, Order, OrderItemDraft, OrderTotals, Product,
    Subscription,
};
use crate::money::Money;
use crate::store::{LastIds, StoreState};
use crate::types::{
    CustomerId, CustomerType, ExpenseId, Language, OrderId, OrderStatus, PaymentMethod,
    ProductCategory, ProductId,
};
use crate::DEFAULT_TAX_RATE;

fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn date(year: i32, month: u32, d: u32) -> NaiveDate {
    day(year, month, d).date_naive()
}

const SAFETY_SUPPLIER: &str = "مورد معدات الأمان";

#[allow(clippy::too_many_arguments)]
fn safety_product(
    id: u64,
    name: &str,
    sku: &str,
    price: i64,
    cost: i64,
    stock: i64,
    min_stock: i64,
    description: &str,
) -> Product {
    Product {
        id: ProductId(id),
        name: name.to_string(),
        category: ProductCategory::SafetyEquipment,
        sku: Some(sku.to_string()),
        price: Money::from_major(price),
        cost: Money::from_major(cost),
        stock,
        min_stock,
        supplier: Some(SAFETY_SUPPLIER.to_string()),
        description: Some(description.to_string()),
        is_active: true,
        created_at: day(2024, 1, 1),
    }
}

impl StoreState {
    /// Two customers, three safety products, one completed invoice, two
    /// expenses and a stocked cash drawer. `now` stamps the drawer.
    pub fn builtin(now: DateTime<Utc>) -> Self {
        let customers = vec![
            Customer {
                id: CustomerId(1),
                name: "أحمد محمد".to_string(),
                phone: "+201001234567".to_string(),
                email: Some("ahmed@example.com".to_string()),
                customer_type: CustomerType::InShop,
                address: Some("القاهرة، مصر".to_string()),
                credit_limit: Money::from_major(5000),
                current_balance: Money::zero(),
                is_active: true,
                created_at: day(2024, 1, 15),
            },
            Customer {
                id: CustomerId(2),
                name: "شركة البناء المتقدم".to_string(),
                phone: "+201223456789".to_string(),
                email: Some("info@advanced-construction.com".to_string()),
                customer_type: CustomerType::Trading,
                address: Some("الإسكندرية، مصر".to_string()),
                credit_limit: Money::from_major(50_000),
                current_balance: Money::from_major(15_000),
                is_active: true,
                created_at: day(2024, 1, 10),
            },
        ];

        let products = vec![
            safety_product(1, "خوذة أمان", "HELMET-001", 150, 100, 50, 10, "خوذة أمان عالية الجودة"),
            safety_product(2, "حذاء أمان", "SHOE-001", 200, 130, 30, 5, "حذاء أمان مقاوم للانزلاق"),
            safety_product(3, "قفازات عمل", "GLOVE-001", 25, 15, 100, 20, "قفازات عمل متينة"),
        ];

        let items: Vec<_> = [(&products[0], 2), (&products[2], 5)]
            .into_iter()
            .map(|(product, qty)| OrderItemDraft::from_product(product, qty).into_item())
            .collect();
        let totals = OrderTotals::compute(&items, Money::zero(), DEFAULT_TAX_RATE);

        let orders = vec![Order {
            id: OrderId(1),
            customer_id: customers[0].id,
            customer_name: customers[0].name.clone(),
            items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            discount: totals.discount,
            total: totals.total,
            payment_method: PaymentMethod::Cash,
            status: OrderStatus::Completed,
            notes: None,
            created_at: day(2024, 1, 20),
            completed_at: Some(day(2024, 1, 20)),
        }];

        let expenses = vec![
            Expense {
                id: ExpenseId(1),
                category: "إيجار".to_string(),
                description: Some("إيجار المحل لشهر يناير".to_string()),
                amount: Money::from_major(5000),
                date: date(2024, 1, 1),
                payment_method: PaymentMethod::BankTransfer,
                created_at: day(2024, 1, 1),
            },
            Expense {
                id: ExpenseId(2),
                category: "مرافق".to_string(),
                description: Some("فاتورة الكهرباء".to_string()),
                amount: Money::from_major(800),
                date: date(2024, 1, 15),
                payment_method: PaymentMethod::Card,
                created_at: day(2024, 1, 15),
            },
        ];

        StoreState {
            auth: AuthState::default(),
            subscription: Subscription::default(),
            customers,
            products,
            orders,
            expenses,
            cashbox: Cashbox {
                opening_balance: Money::from_major(10_000),
                current_balance: Money::from_major(12_500),
                daily_sales: Money::from_major(2500),
                daily_expenses: Money::zero(),
                last_updated: now,
            },
            language: Language::Arabic,
            last_ids: LastIds {
                customer: 2,
                product: 3,
                order: 1,
                expense: 2,
            },
        }
    }
}
