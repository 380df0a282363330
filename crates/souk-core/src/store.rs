//! # Entity Store
//!
//! The single source of truth for a client session: every record the back
//! office works with, and the mutation API over them.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Store                                                                  │
//! │  ├── state: StoreState   ◄── serializable, what gets persisted          │
//! │  │     auth, subscription, customers, products, orders, expenses,       │
//! │  │     cashbox, language                                                │
//! │  ├── ids:   Box<dyn IdGenerator>                                        │
//! │  └── clock: Box<dyn Clock>                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `Store` is an ordinary owned value. Whoever needs it gets a reference;
//! when shared across tasks it must sit behind one lock covering the whole
//! state (see `souk-db`'s `PersistentStore`).
//!
//! ## Mutation Rules
//! - **Atomic**: updates run on a copy of the record, are validated, and only
//!   then replace the original. A failed call leaves the state untouched.
//! - **Typed patches**: `update_*` merges only the fields set in the patch.
//! - **Not found is an error**: `update_*`/`delete_*` on a missing id return
//!   [`CoreError::NotFound`].
//! - **No cascade**: deleting a customer or product leaves orders that
//!   reference it as they are.
//! - **No I/O**: persisting after a mutation is the caller's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::clock::{Clock, IdGenerator};
use crate::entities::{
    AuthState, Cashbox, Customer, Expense, NewCustomer, NewExpense, NewProduct, Order, OrderDraft,
    OrderItem, OrderItemDraft, OrderTotals, Product, Subscription, UserProfile,
};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::patch::{
    CashboxPatch, CustomerPatch, ExpensePatch, OrderPatch, ProductPatch, SubscriptionPatch,
};
use crate::queries;
use crate::subscription;
use crate::types::{
    CustomerId, EntityKind, ExpenseId, Language, OrderId, OrderStatus, ProductId,
    SubscriptionPlan, SubscriptionStatus,
};
use crate::validation::{self, ValidationResult};
use crate::DEFAULT_TAX_RATE;

// =============================================================================
// Store State
// =============================================================================

/// Everything the store holds. This is the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreState {
    #[serde(default)]
    pub auth: AuthState,
    #[serde(default)]
    pub subscription: Subscription,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    pub cashbox: Cashbox,
    #[serde(default)]
    pub language: Language,
    /// Highest id ever handed out per collection, deleted records included.
    #[serde(default)]
    pub last_ids: LastIds,
}

/// Per-collection id high-water marks.
///
/// Stored with the snapshot so a restarted store never hands out the id of
/// a deleted record again; orders may still point at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct LastIds {
    pub customer: u64,
    pub product: u64,
    pub order: u64,
    pub expense: u64,
}

impl LastIds {
    pub fn get(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::Customer => self.customer,
            EntityKind::Product => self.product,
            EntityKind::Order => self.order,
            EntityKind::Expense => self.expense,
        }
    }

    /// Raises the mark for `kind` to `id`; never lowers it.
    pub fn record(&mut self, kind: EntityKind, id: u64) {
        let slot = match kind {
            EntityKind::Customer => &mut self.customer,
            EntityKind::Product => &mut self.product,
            EntityKind::Order => &mut self.order,
            EntityKind::Expense => &mut self.expense,
        };
        *slot = (*slot).max(id);
    }
}

impl StoreState {
    /// No records, signed out, inactive subscription, empty drawer.
    pub fn empty(now: DateTime<Utc>) -> Self {
        StoreState {
            auth: AuthState::default(),
            subscription: Subscription::default(),
            customers: Vec::new(),
            products: Vec::new(),
            orders: Vec::new(),
            expenses: Vec::new(),
            cashbox: Cashbox::empty(now),
            language: Language::default(),
            last_ids: LastIds::default(),
        }
    }

    /// Every id that must not be handed out again: ids in use, ids still
    /// referenced by orders, and the stored high-water marks.
    fn ids(&self) -> impl Iterator<Item = (EntityKind, u64)> + '_ {
        let customers = self.customers.iter().map(|c| (EntityKind::Customer, c.id.get()));
        let products = self.products.iter().map(|p| (EntityKind::Product, p.id.get()));
        let orders = self.orders.iter().map(|o| (EntityKind::Order, o.id.get()));
        let expenses = self.expenses.iter().map(|e| (EntityKind::Expense, e.id.get()));

        let ordered_by = self.orders.iter().map(|o| (EntityKind::Customer, o.customer_id.get()));
        let ordered = self
            .orders
            .iter()
            .flat_map(|o| o.items.iter())
            .map(|item| (EntityKind::Product, item.product_id.get()));

        let marks = EntityKind::ALL.into_iter().map(|kind| (kind, self.last_ids.get(kind)));

        customers
            .chain(products)
            .chain(orders)
            .chain(expenses)
            .chain(ordered_by)
            .chain(ordered)
            .chain(marks)
    }
}

// =============================================================================
// Collection Helpers
// =============================================================================

/// A record stored in one of the id-keyed collections.
trait Record: Clone {
    type Id: Copy + PartialEq + Into<u64>;
    const KIND: EntityKind;

    fn id(&self) -> Self::Id;
}

macro_rules! record {
    ($ty:ty, $id:ty, $kind:expr) => {
        impl Record for $ty {
            type Id = $id;
            const KIND: EntityKind = $kind;

            fn id(&self) -> $id {
                self.id
            }
        }
    };
}

record!(Customer, CustomerId, EntityKind::Customer);
record!(Product, ProductId, EntityKind::Product);
record!(Order, OrderId, EntityKind::Order);
record!(Expense, ExpenseId, EntityKind::Expense);

fn position<R: Record>(records: &[R], id: R::Id) -> CoreResult<usize> {
    records
        .iter()
        .position(|r| r.id() == id)
        .ok_or_else(|| CoreError::not_found(R::KIND, id))
}

fn insert<R: Record>(records: &mut Vec<R>, last_ids: &mut LastIds, record: R) -> CoreResult<R> {
    if records.iter().any(|r| r.id() == record.id()) {
        return Err(CoreError::DuplicateId {
            entity: R::KIND,
            id: record.id().into(),
        });
    }
    last_ids.record(R::KIND, record.id().into());
    records.push(record.clone());
    Ok(record)
}

/// Edits a copy, and commits it only if `edit` succeeds.
fn update<R: Record>(
    records: &mut [R],
    id: R::Id,
    edit: impl FnOnce(&mut R) -> ValidationResult<()>,
) -> CoreResult<R> {
    let index = position(records, id)?;
    let mut working = records[index].clone();
    edit(&mut working)?;
    records[index] = working.clone();
    Ok(working)
}

fn remove<R: Record>(records: &mut Vec<R>, id: R::Id) -> CoreResult<R> {
    let index = position(records, id)?;
    Ok(records.remove(index))
}

fn build_items(drafts: Vec<OrderItemDraft>) -> ValidationResult<Vec<OrderItem>> {
    drafts.into_iter().map(OrderItemDraft::try_into_item).collect()
}

/// A drawer movement that would leave the money range.
fn checked(amount: Option<Money>) -> ValidationResult<Money> {
    amount.ok_or_else(|| validation::amount_too_large("amount"))
}

// =============================================================================
// Store
// =============================================================================

pub struct Store {
    state: StoreState,
    ids: Box<dyn IdGenerator + Send>,
    clock: Box<dyn Clock + Send>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("state", &self.state).finish_non_exhaustive()
    }
}

impl Store {
    /// Wraps `state`. The id generator is told about every id already in
    /// use before the first add.
    pub fn new(
        state: StoreState,
        ids: impl IdGenerator + Send + 'static,
        clock: impl Clock + Send + 'static,
    ) -> Self {
        let mut store = Store {
            state,
            ids: Box::new(ids),
            clock: Box::new(clock),
        };
        store.seed_ids();
        store
    }

    fn seed_ids(&mut self) {
        for (kind, id) in self.state.ids() {
            self.ids.seen(kind, id);
        }
    }

    /// Current time according to the injected clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn into_state(self) -> StoreState {
        self.state
    }

    /// Swaps in a whole new state, e.g. after re-reading the persisted slot.
    pub fn replace_state(&mut self, state: StoreState) -> StoreState {
        let previous = std::mem::replace(&mut self.state, state);
        self.seed_ids();
        previous
    }

    fn next_id(&mut self, kind: EntityKind) -> u64 {
        self.ids.next_id(kind)
    }

    // =========================================================================
    // Customers
    // =========================================================================

    pub fn add_customer(&mut self, draft: NewCustomer) -> CoreResult<Customer> {
        let id = CustomerId(self.next_id(EntityKind::Customer));
        let customer = draft.into_customer(id, self.now());
        validation::validate_customer(&customer)?;
        insert(&mut self.state.customers, &mut self.state.last_ids, customer)
    }

    pub fn update_customer(&mut self, id: CustomerId, patch: CustomerPatch) -> CoreResult<Customer> {
        update(&mut self.state.customers, id, |customer| {
            patch.apply_to(customer);
            validation::validate_customer(customer)
        })
    }

    pub fn delete_customer(&mut self, id: CustomerId) -> CoreResult<Customer> {
        remove(&mut self.state.customers, id)
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub fn add_product(&mut self, draft: NewProduct) -> CoreResult<Product> {
        let id = ProductId(self.next_id(EntityKind::Product));
        let product = draft.into_product(id, self.now());
        validation::validate_product(&product)?;
        insert(&mut self.state.products, &mut self.state.last_ids, product)
    }

    pub fn update_product(&mut self, id: ProductId, patch: ProductPatch) -> CoreResult<Product> {
        update(&mut self.state.products, id, |product| {
            patch.apply_to(product);
            validation::validate_product(product)
        })
    }

    pub fn delete_product(&mut self, id: ProductId) -> CoreResult<Product> {
        remove(&mut self.state.products, id)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Writes an invoice. Totals are computed here with the 15% VAT; the
    /// order is stamped `completed_at` if it is created as completed.
    pub fn add_order(&mut self, draft: OrderDraft) -> CoreResult<Order> {
        let id = OrderId(self.next_id(EntityKind::Order));
        let now = self.now();
        let items = build_items(draft.items)?;
        let totals = OrderTotals::try_compute(&items, draft.discount, DEFAULT_TAX_RATE)?;

        let order = Order {
            id,
            customer_id: draft.customer_id,
            customer_name: draft.customer_name,
            items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            discount: totals.discount,
            total: totals.total,
            payment_method: draft.payment_method,
            status: draft.status,
            notes: draft.notes,
            created_at: now,
            completed_at: (draft.status == OrderStatus::Completed).then_some(now),
        };

        validation::validate_order(&order)?;
        insert(&mut self.state.orders, &mut self.state.last_ids, order)
    }

    /// Merges `patch` into an invoice.
    ///
    /// New items or a new discount recompute the totals. Moving into
    /// `Completed` stamps `completed_at`; moving out of it clears it.
    pub fn update_order(&mut self, id: OrderId, patch: OrderPatch) -> CoreResult<Order> {
        let now = self.now();
        update(&mut self.state.orders, id, |order| {
            let was_completed = order.is_completed();
            let recompute = patch.touches_totals();

            if let Some(customer_id) = patch.customer_id {
                order.customer_id = customer_id;
            }
            if let Some(customer_name) = patch.customer_name {
                order.customer_name = customer_name;
            }
            if let Some(items) = patch.items {
                order.items = build_items(items)?;
            }
            if let Some(discount) = patch.discount {
                order.discount = discount;
            }
            if let Some(payment_method) = patch.payment_method {
                order.payment_method = payment_method;
            }
            if let Some(status) = patch.status {
                order.status = status;
            }
            if let Some(notes) = patch.notes {
                order.notes = notes;
            }

            if recompute {
                order.set_totals(OrderTotals::try_compute(&order.items, order.discount, DEFAULT_TAX_RATE)?);
            }

            match (was_completed, order.is_completed()) {
                (false, true) => order.completed_at = Some(now),
                (_, false) => order.completed_at = None,
                (true, true) => {}
            }

            validation::validate_order(order)
        })
    }

    pub fn delete_order(&mut self, id: OrderId) -> CoreResult<Order> {
        remove(&mut self.state.orders, id)
    }

    // =========================================================================
    // Expenses
    // =========================================================================

    pub fn add_expense(&mut self, draft: NewExpense) -> CoreResult<Expense> {
        let id = ExpenseId(self.next_id(EntityKind::Expense));
        let expense = draft.into_expense(id, self.now());
        validation::validate_expense(&expense)?;
        insert(&mut self.state.expenses, &mut self.state.last_ids, expense)
    }

    pub fn update_expense(&mut self, id: ExpenseId, patch: ExpensePatch) -> CoreResult<Expense> {
        update(&mut self.state.expenses, id, |expense| {
            patch.apply_to(expense);
            validation::validate_expense(expense)
        })
    }

    pub fn delete_expense(&mut self, id: ExpenseId) -> CoreResult<Expense> {
        remove(&mut self.state.expenses, id)
    }

    // =========================================================================
    // Cashbox
    // =========================================================================

    /// Merges `patch` and stamps `last_updated`, even for an empty patch.
    pub fn update_cashbox(&mut self, patch: CashboxPatch) -> Cashbox {
        patch.apply_to(&mut self.state.cashbox);
        self.state.cashbox.last_updated = self.now();
        self.state.cashbox.clone()
    }

    /// Cash put into the drawer. Counts toward the day's sales.
    pub fn cash_in(&mut self, amount: Money) -> CoreResult<Cashbox> {
        validation::validate_positive("amount", amount)?;
        let cashbox = &self.state.cashbox;
        let patch = CashboxPatch {
            current_balance: Some(checked(cashbox.current_balance.checked_add(amount))?),
            daily_sales: Some(checked(cashbox.daily_sales.checked_add(amount))?),
            ..Default::default()
        };
        Ok(self.update_cashbox(patch))
    }

    /// Cash taken out of the drawer. Counts toward the day's expenses.
    pub fn cash_out(&mut self, amount: Money) -> CoreResult<Cashbox> {
        validation::validate_positive("amount", amount)?;
        let cashbox = &self.state.cashbox;
        let patch = CashboxPatch {
            current_balance: Some(checked(cashbox.current_balance.checked_sub(amount))?),
            daily_expenses: Some(checked(cashbox.daily_expenses.checked_add(amount))?),
            ..Default::default()
        };
        Ok(self.update_cashbox(patch))
    }

    // =========================================================================
    // Session, Subscription, Preferences
    // =========================================================================

    /// Marks the session signed in. Credentials are checked elsewhere.
    pub fn login(&mut self, user: UserProfile) {
        self.state.auth = AuthState {
            is_authenticated: true,
            user: Some(user),
        };
    }

    /// Signs out and resets the subscription in the same step, so no stale
    /// active subscription outlives the session.
    pub fn logout(&mut self) {
        self.state.auth = AuthState::default();
        self.state.subscription = Subscription::default();
    }

    pub fn set_subscription(&mut self, patch: SubscriptionPatch) -> Subscription {
        patch.apply_to(&mut self.state.subscription);
        self.state.subscription.clone()
    }

    /// Records a plan purchase made now.
    pub fn activate_subscription(&mut self, plan: SubscriptionPlan, permanent: bool) -> Subscription {
        let patch = subscription::activation(plan, permanent, self.now());
        self.set_subscription(patch)
    }

    /// Moves a lapsed `Active`/`Trial` subscription to `Expired`.
    ///
    /// Returns true if the status changed.
    pub fn expire_lapsed_subscription(&mut self) -> bool {
        if !subscription::is_lapsed(&self.state.subscription, self.now()) {
            return false;
        }
        self.state.subscription.status = SubscriptionStatus::Expired;
        true
    }

    pub fn set_language(&mut self, language: Language) {
        self.state.language = language;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn is_subscription_active(&self) -> bool {
        queries::is_subscription_active(&self.state.subscription, self.now())
    }

    pub fn customer_by_id(&self, id: CustomerId) -> Option<&Customer> {
        queries::customer_by_id(&self.state, id)
    }

    pub fn product_by_id(&self, id: ProductId) -> Option<&Product> {
        queries::product_by_id(&self.state, id)
    }

    pub fn order_by_id(&self, id: OrderId) -> Option<&Order> {
        queries::order_by_id(&self.state, id)
    }

    pub fn expense_by_id(&self, id: ExpenseId) -> Option<&Expense> {
        queries::expense_by_id(&self.state, id)
    }

    pub fn orders_by_customer(&self, customer_id: CustomerId) -> Vec<&Order> {
        queries::orders_by_customer(&self.state, customer_id)
    }

    pub fn low_stock_products(&self) -> Vec<&Product> {
        queries::low_stock_products(&self.state)
    }

    pub fn total_sales(&self) -> Money {
        queries::total_sales(&self.state)
    }

    pub fn total_expenses(&self) -> Money {
        queries::total_expenses(&self.state)
    }

    pub fn profit(&self) -> Money {
        queries::profit(&self.state)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, SequentialIds};
    use crate::error::ValidationError;
    use crate::types::{CustomerType, PaymentMethod, ProductCategory};
    use chrono::{Duration, NaiveDate};

    fn clock() -> FixedClock {
        FixedClock::at_date(2024, 1, 20)
    }

    fn empty_store() -> Store {
        Store::new(StoreState::empty(clock().now()), SequentialIds::new(), clock())
    }

    fn builtin_store(clock: FixedClock) -> Store {
        Store::new(StoreState::builtin(clock.now()), SequentialIds::new(), clock)
    }

    fn ahmed() -> NewCustomer {
        NewCustomer::new("Ahmed", "+201001234567", CustomerType::InShop)
            .with_credit_limit(Money::from_major(5000))
    }

    fn line(product: u64, qty: i64, price: i64) -> OrderItemDraft {
        OrderItemDraft::new(ProductId(product), "item", qty, Money::from_major(price))
    }

    fn order(status: OrderStatus) -> OrderDraft {
        OrderDraft::new(CustomerId(1), "Ahmed", vec![line(1, 2, 150)], PaymentMethod::Cash)
            .with_status(status)
    }

    fn rent(amount: i64) -> NewExpense {
        NewExpense::new(
            "rent",
            Money::from_major(amount),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            PaymentMethod::BankTransfer,
        )
    }

    // -------------------------------------------------------------------------
    // Customers
    // -------------------------------------------------------------------------

    #[test]
    fn test_add_customer_scenario() {
        let mut store = empty_store();
        let created = store.add_customer(ahmed()).unwrap();

        let matching: Vec<_> = store
            .state()
            .customers
            .iter()
            .filter(|c| c.phone == "+201001234567")
            .collect();
        assert_eq!(matching.len(), 1);

        let found = store.customer_by_id(created.id).unwrap();
        let expected = ahmed().into_customer(created.id, clock().now());
        assert_eq!(found, &expected);
    }

    #[test]
    fn test_ids_are_unique_per_collection() {
        let mut store = empty_store();
        let a = store.add_customer(ahmed()).unwrap();
        let b = store.add_customer(ahmed()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_ids_continue_after_existing_records() {
        let mut store = builtin_store(clock());
        let created = store.add_customer(ahmed()).unwrap();
        assert_eq!(created.id, CustomerId(3));
    }

    #[test]
    fn test_duplicate_generated_id_is_rejected() {
        struct Always(u64);
        impl IdGenerator for Always {
            fn next_id(&mut self, _kind: EntityKind) -> u64 {
                self.0
            }
        }

        let mut store = Store::new(StoreState::empty(clock().now()), Always(7), clock());
        store.add_customer(ahmed()).unwrap();
        let err = store.add_customer(ahmed()).unwrap_err();
        assert_eq!(err, CoreError::DuplicateId { entity: EntityKind::Customer, id: 7 });
        assert_eq!(store.state().customers.len(), 1);
    }


    #[test]
    fn test_deleted_id_not_reused_after_restart() {
        let mut store = builtin_store(clock());
        let karim = store
            .add_customer(NewCustomer::new("Karim", "+201112223334", CustomerType::Trading))
            .unwrap();
        assert_eq!(karim.id, CustomerId(3));
        let draft = OrderDraft::new(karim.id, "Karim", vec![line(1, 1, 150)], PaymentMethod::Cash);
        store.add_order(draft).unwrap();
        store.delete_customer(karim.id).unwrap();
        assert_eq!(store.state().last_ids.customer, 3);

        let mut restarted = Store::new(store.into_state(), SequentialIds::new(), clock());
        let next = restarted
            .add_customer(NewCustomer::new("Someone Else", "+201009998887", CustomerType::InShop))
            .unwrap();
        assert_eq!(next.id, CustomerId(4));

        let orders = restarted.orders_by_customer(karim.id);
        assert_eq!(orders.len(), 1);
        assert!(restarted.customer_by_id(orders[0].customer_id).is_none());
    }

    #[test]
    fn test_ids_referenced_by_orders_are_not_reused() {
        // a snapshot without stored marks
        let mut store = builtin_store(clock());
        let karim = store
            .add_customer(NewCustomer::new("Karim", "+201112223334", CustomerType::Trading))
            .unwrap();
        let cable = store
            .add_product(NewProduct::new("Cable", ProductCategory::Tools, Money::from_major(40)))
            .unwrap();
        let draft = OrderDraft::new(karim.id, "Karim", vec![line(cable.id.get(), 1, 40)], PaymentMethod::Cash);
        store.add_order(draft).unwrap();

        let mut state = store.into_state();
        state.customers.retain(|c| c.id != karim.id);
        state.products.retain(|p| p.id != cable.id);
        state.last_ids = LastIds::default();

        let mut restarted = Store::new(state, SequentialIds::new(), clock());
        let customer = restarted.add_customer(ahmed()).unwrap();
        assert!(customer.id > karim.id);
        let product = restarted
            .add_product(NewProduct::new("Rope", ProductCategory::Tools, Money::from_major(15)))
            .unwrap();
        assert!(product.id > cable.id);
    }

    #[test]
    fn test_failed_add_leaves_marks_unchanged() {
        let mut store = builtin_store(clock());
        let before = store.state().clone();
        assert!(store.add_customer(NewCustomer::new("", "", CustomerType::InShop)).is_err());
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_update_customer_merges_fields() {
        let mut store = empty_store();
        let created = store.add_customer(ahmed().with_email("ahmed@example.com")).unwrap();

        let updated = store
            .update_customer(
                created.id,
                CustomerPatch {
                    current_balance: Some(Money::from_major(750)),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.current_balance, Money::from_major(750));
        assert_eq!(updated.email.as_deref(), Some("ahmed@example.com"));
        assert_eq!(updated.credit_limit, Money::from_major(5000));
        assert_eq!(store.customer_by_id(created.id), Some(&updated));
    }

    #[test]
    fn test_invalid_update_leaves_record_untouched() {
        let mut store = empty_store();
        let created = store.add_customer(ahmed()).unwrap();

        let err = store
            .update_customer(
                created.id,
                CustomerPatch {
                    name: Some("   ".to_string()),
                    current_balance: Some(Money::from_major(1)),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert!(matches!(err, CoreError::Validation(ValidationError::Required { .. })));
        assert_eq!(store.customer_by_id(created.id), Some(&created));
    }

    #[test]
    fn test_delete_missing_customer_is_not_found() {
        let mut store = builtin_store(clock());
        let before = store.state().customers.clone();

        let err = store.delete_customer(CustomerId(404)).unwrap_err();
        assert_eq!(err, CoreError::not_found(EntityKind::Customer, 404u64));
        assert_eq!(store.state().customers, before);

        let err = store.update_customer(CustomerId(404), CustomerPatch::default()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_customer_keeps_orders() {
        let mut store = builtin_store(clock());
        let removed = store.delete_customer(CustomerId(1)).unwrap();
        assert_eq!(removed.id, CustomerId(1));

        let orders = store.orders_by_customer(CustomerId(1));
        assert_eq!(orders.len(), 1);
        assert!(store.customer_by_id(orders[0].customer_id).is_none());
        assert_eq!(orders[0].customer_name, "أحمد محمد");
    }

    #[test]
    fn test_add_customer_requires_phone() {
        let mut store = empty_store();
        let err = store
            .add_customer(NewCustomer::new("Ahmed", "", CustomerType::InShop))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Required { ref field }) if field == "phone"));
        assert!(store.state().customers.is_empty());
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    #[test]
    fn test_product_stock_updates_low_stock_view() {
        let mut store = empty_store();
        let gloves = store
            .add_product(
                NewProduct::new("Gloves", ProductCategory::Consumables, Money::from_major(25))
                    .with_stock(100, 20),
            )
            .unwrap();
        assert!(store.low_stock_products().is_empty());

        store.update_product(gloves.id, ProductPatch::stock(20)).unwrap();
        assert_eq!(store.low_stock_products()[0].id, gloves.id);

        let err = store.update_product(gloves.id, ProductPatch::stock(-1)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Negative { .. })));
        assert_eq!(store.product_by_id(gloves.id).map(|p| p.stock), Some(20));
    }

    #[test]
    fn test_delete_product() {
        let mut store = builtin_store(clock());
        store.delete_product(ProductId(2)).unwrap();
        assert!(store.product_by_id(ProductId(2)).is_none());
        assert_eq!(store.state().products.len(), 2);
        assert!(store.delete_product(ProductId(2)).unwrap_err().is_not_found());
    }

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    #[test]
    fn test_order_totals_scenario() {
        let mut store = empty_store();
        let created = store.add_order(order(OrderStatus::Pending)).unwrap();

        assert_eq!(created.subtotal, Money::from_major(300));
        assert_eq!(created.tax, Money::from_major(45));
        assert_eq!(created.discount, Money::zero());
        assert_eq!(created.total, Money::from_major(345));
        assert_eq!(created.items[0].total, Money::from_major(300));
        assert_eq!(created.completed_at, None);
    }

    #[test]
    fn test_order_from_product_snapshot() {
        let mut store = builtin_store(clock());
        let customer = store.customer_by_id(CustomerId(2)).cloned().unwrap();
        let shoes = store.product_by_id(ProductId(2)).cloned().unwrap();

        let draft = OrderDraft::for_customer(
            &customer,
            vec![OrderItemDraft::from_product(&shoes, 3)],
            PaymentMethod::Credit,
        )
        .with_discount(Money::from_major(10))
        .with_notes("delivery");
        let created = store.add_order(draft).unwrap();

        store
            .update_product(
                ProductId(2),
                ProductPatch {
                    price: Some(Money::from_major(999)),
                    ..Default::default()
                },
            )
            .unwrap();

        let stored = store.order_by_id(created.id).unwrap();
        assert_eq!(stored.customer_name, customer.name);
        assert_eq!(stored.items[0].price, Money::from_major(200));
        assert_eq!(stored.total, Money::from_major(600 + 90 - 10));
    }

    #[test]
    fn test_order_validation() {
        let mut store = empty_store();

        let empty = OrderDraft::new(CustomerId(1), "Ahmed", vec![], PaymentMethod::Cash);
        let err = store.add_order(empty).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Empty { .. })));

        let zero_qty = OrderDraft::new(CustomerId(1), "Ahmed", vec![line(1, 0, 10)], PaymentMethod::Cash);
        assert!(store.add_order(zero_qty).is_err());

        let huge_discount = order(OrderStatus::Pending).with_discount(Money::from_major(346));
        assert!(store.add_order(huge_discount).is_err());

        assert!(store.state().orders.is_empty());
    }


    #[test]
    fn test_oversized_quantity_is_rejected_not_overflowed() {
        let mut store = builtin_store(clock());
        let before = store.state().clone();

        let huge = OrderDraft::new(
            CustomerId(1),
            "Ahmed",
            vec![OrderItemDraft::new(ProductId(1), "item", i64::MAX / 10, Money::from_major(1))],
            PaymentMethod::Cash,
        );
        let err = store.add_order(huge).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "quantity"
        ));

        let over_limit = OrderDraft::new(
            CustomerId(1),
            "Ahmed",
            vec![line(1, crate::MAX_ITEM_QUANTITY + 1, 1)],
            PaymentMethod::Cash,
        );
        assert!(store.add_order(over_limit).is_err());

        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_order_total_out_of_money_range_is_rejected() {
        let mut store = empty_store();

        let pricey = OrderItemDraft::new(ProductId(1), "item", 2, Money::from_cents(i64::MAX / 2 + 1));
        let draft = OrderDraft::new(CustomerId(1), "Ahmed", vec![pricey], PaymentMethod::Cash);
        assert!(matches!(
            store.add_order(draft),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        let max = OrderItemDraft::new(ProductId(1), "item", 1, Money::from_cents(i64::MAX));
        let draft = OrderDraft::new(CustomerId(1), "Ahmed", vec![max.clone(), max], PaymentMethod::Cash);
        assert!(matches!(
            store.add_order(draft),
            Err(CoreError::Validation(ValidationError::OutOfRange { ref field, .. })) if field == "subtotal"
        ));

        assert!(store.state().orders.is_empty());
    }

    #[test]
    fn test_update_with_oversized_items_leaves_order_untouched() {
        let mut store = builtin_store(clock());
        let original = store.state().orders[0].clone();

        let patch = OrderPatch {
            items: Some(vec![OrderItemDraft::new(
                ProductId(1),
                "item",
                i64::MAX / 10,
                Money::from_major(1),
            )]),
            ..Default::default()
        };
        assert!(store.update_order(original.id, patch).is_err());
        assert_eq!(store.state().orders[0], original);
    }

    #[test]
    fn test_pending_order_does_not_change_sales() {
        let mut store = builtin_store(clock());
        let before = store.total_sales();
        store.add_order(order(OrderStatus::Pending)).unwrap();
        assert_eq!(store.total_sales(), before);
    }

    #[test]
    fn test_completing_order_adds_its_total() {
        let mut store = builtin_store(clock());
        let pending = store.add_order(order(OrderStatus::Pending)).unwrap();
        let before = store.total_sales();

        let completed = store
            .update_order(pending.id, OrderPatch::status(OrderStatus::Completed))
            .unwrap();

        assert_eq!(store.total_sales(), before + pending.total);
        assert_eq!(completed.completed_at, Some(clock().now()));
    }

    #[test]
    fn test_completed_at_follows_status() {
        let mut store = empty_store();
        let created = store.add_order(order(OrderStatus::Completed)).unwrap();
        assert_eq!(created.completed_at, Some(clock().now()));

        // an hour later, re-saving as completed keeps the original stamp
        let mut later = clock();
        later.advance(Duration::hours(1));
        let mut store = Store::new(store.into_state(), SequentialIds::new(), later);
        let same = store
            .update_order(created.id, OrderPatch::status(OrderStatus::Completed))
            .unwrap();
        assert_eq!(same.completed_at, created.completed_at);

        let cancelled = store
            .update_order(created.id, OrderPatch::status(OrderStatus::Cancelled))
            .unwrap();
        assert_eq!(cancelled.completed_at, None);

        let reopened = store
            .update_order(created.id, OrderPatch::status(OrderStatus::Completed))
            .unwrap();
        assert_eq!(reopened.completed_at, Some(later.now()));
    }

    #[test]
    fn test_update_order_items_recomputes_totals() {
        let mut store = empty_store();
        let created = store.add_order(order(OrderStatus::Pending)).unwrap();

        let updated = store
            .update_order(
                created.id,
                OrderPatch {
                    items: Some(vec![line(1, 2, 150), line(3, 5, 25)]),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.subtotal, Money::from_major(425));
        assert_eq!(updated.tax, Money::from_cents(6375));
        assert_eq!(updated.total, Money::from_cents(48_875));
    }

    #[test]
    fn test_delete_order() {
        let mut store = builtin_store(clock());
        store.delete_order(OrderId(1)).unwrap();
        assert_eq!(store.total_sales(), Money::zero());
        assert!(store.delete_order(OrderId(1)).unwrap_err().is_not_found());
    }

    // -------------------------------------------------------------------------
    // Expenses and profit
    // -------------------------------------------------------------------------

    #[test]
    fn test_expense_rules() {
        let mut store = empty_store();
        assert!(store.add_expense(rent(0)).is_err());

        let mut on_credit = rent(100);
        on_credit.payment_method = PaymentMethod::Credit;
        assert!(store.add_expense(on_credit).is_err());

        let created = store.add_expense(rent(100).with_description("January")).unwrap();
        let updated = store
            .update_expense(
                created.id,
                ExpensePatch {
                    description: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.description, None);
    }

    #[test]
    fn test_profit_identity_holds_across_mutations() {
        let mut store = builtin_store(clock());
        let check = |store: &Store| {
            assert_eq!(store.profit(), store.total_sales() - store.total_expenses());
        };
        check(&store);

        let o1 = store.add_order(order(OrderStatus::Completed)).unwrap();
        check(&store);
        let o2 = store.add_order(order(OrderStatus::Pending)).unwrap();
        check(&store);
        store.update_order(o2.id, OrderPatch::status(OrderStatus::Completed)).unwrap();
        check(&store);
        let e1 = store.add_expense(rent(1200)).unwrap();
        check(&store);
        store
            .update_expense(
                e1.id,
                ExpensePatch {
                    amount: Some(Money::from_major(900)),
                    ..Default::default()
                },
            )
            .unwrap();
        check(&store);
        store.delete_order(o1.id).unwrap();
        check(&store);
        store.delete_expense(ExpenseId(1)).unwrap();
        check(&store);

        assert_eq!(store.total_expenses(), Money::from_major(800 + 900));
    }

    // -------------------------------------------------------------------------
    // Cashbox
    // -------------------------------------------------------------------------

    #[test]
    fn test_update_cashbox_stamps_last_updated() {
        let opened = FixedClock::at_date(2024, 1, 1);
        let state = StoreState::empty(opened.now());

        let mut later = opened;
        later.advance(Duration::minutes(5));
        let mut store = Store::new(state, SequentialIds::new(), later);

        let cashbox = store.update_cashbox(CashboxPatch {
            current_balance: Some(Money::from_major(12_500)),
            ..Default::default()
        });
        assert_eq!(cashbox.current_balance, Money::from_major(12_500));
        assert!(cashbox.last_updated >= later.now());
        assert!(cashbox.last_updated > opened.now());
        assert_eq!(store.state().cashbox, cashbox);
    }

    #[test]
    fn test_empty_cashbox_patch_still_stamps() {
        let mut store = Store::new(
            StoreState::empty(FixedClock::epoch().now()),
            SequentialIds::new(),
            clock(),
        );
        let cashbox = store.update_cashbox(CashboxPatch::default());
        assert_eq!(cashbox.last_updated, clock().now());
        assert_eq!(cashbox.current_balance, Money::zero());
    }

    #[test]
    fn test_cash_in_and_out() {
        let mut store = builtin_store(clock());
        let after_in = store.cash_in(Money::from_major(500)).unwrap();
        assert_eq!(after_in.current_balance, Money::from_major(13_000));
        assert_eq!(after_in.daily_sales, Money::from_major(3000));

        let after_out = store.cash_out(Money::from_major(200)).unwrap();
        assert_eq!(after_out.current_balance, Money::from_major(12_800));
        assert_eq!(after_out.daily_expenses, Money::from_major(200));

        assert!(store.cash_in(Money::zero()).is_err());
        assert!(store.cash_out(Money::from_major(-5)).is_err());
        assert_eq!(store.state().cashbox, after_out);
    }

    // -------------------------------------------------------------------------
    // Session and subscription
    // -------------------------------------------------------------------------


    #[test]
    fn test_cash_movement_out_of_money_range_is_rejected() {
        let mut store = builtin_store(clock());
        store.update_cashbox(CashboxPatch {
            current_balance: Some(Money::from_cents(i64::MAX - 100)),
            ..Default::default()
        });
        let before = store.state().cashbox.clone();

        let err = store.cash_in(Money::from_major(5)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::OutOfRange { .. })));
        assert_eq!(store.state().cashbox, before);

        store.update_cashbox(CashboxPatch {
            current_balance: Some(Money::from_cents(i64::MIN + 100)),
            ..Default::default()
        });
        assert!(store.cash_out(Money::from_major(5)).is_err());
    }

    #[test]
    fn test_login_logout_resets_subscription() {
        let mut store = empty_store();
        store.login(UserProfile::new("owner@example.com", "Owner"));
        store.activate_subscription(SubscriptionPlan::Monthly, false);
        assert!(store.state().auth.is_authenticated);
        assert!(store.is_subscription_active());

        store.logout();
        assert_eq!(store.state().auth, AuthState::default());
        assert_eq!(store.state().subscription, Subscription::default());
        assert!(!store.is_subscription_active());
    }

    #[test]
    fn test_set_subscription_merges() {
        let mut store = empty_store();
        let sub = store.set_subscription(SubscriptionPatch {
            status: Some(SubscriptionStatus::Trial),
            renewal_date: Some(Some(clock().now() + Duration::days(14))),
            ..Default::default()
        });
        assert_eq!(sub.plan, SubscriptionPlan::Monthly);
        assert_eq!(sub.status, SubscriptionStatus::Trial);
        assert!(store.is_subscription_active());
    }

    #[test]
    fn test_permanent_activation() {
        let mut store = empty_store();
        let sub = store.activate_subscription(SubscriptionPlan::Yearly, true);
        assert!(sub.is_permanent);
        assert_eq!(sub.renewal_date, None);
        assert!(store.is_subscription_active());
    }

    #[test]
    fn test_expire_lapsed_subscription() {
        let start = FixedClock::at_date(2024, 1, 1);
        let mut store = Store::new(StoreState::empty(start.now()), SequentialIds::new(), start);
        store.activate_subscription(SubscriptionPlan::Monthly, false);
        assert!(!store.expire_lapsed_subscription());

        let later = FixedClock::at_date(2024, 3, 1);
        let mut store = Store::new(store.into_state(), SequentialIds::new(), later);
        assert!(!store.is_subscription_active());
        assert_eq!(store.state().subscription.status, SubscriptionStatus::Active);

        assert!(store.expire_lapsed_subscription());
        assert_eq!(store.state().subscription.status, SubscriptionStatus::Expired);
        assert!(!store.expire_lapsed_subscription());
    }

    #[test]
    fn test_set_language() {
        let mut store = builtin_store(clock());
        let customers = store.state().customers.clone();
        store.set_language(Language::Egyptian);
        assert_eq!(store.state().language, Language::Egyptian);
        assert_eq!(store.state().customers, customers);
    }

    #[test]
    fn test_state_json_round_trip() {
        let store = builtin_store(clock());
        let json = serde_json::to_string(store.state()).unwrap();
        let back: StoreState = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, store.state());
    }
}
