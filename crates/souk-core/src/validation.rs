//! # Validation Module
//!
//! Business rule validation for every record the store accepts.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Forms (presentation, out of tree)                            │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Store mutation API                                           │
//! │  ├── Type validation (drafts and patches are typed)                    │
//! │  └── THIS MODULE: checked on the finished record, before commit        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Data service (remote, optional)                              │
//! │  └── NOT NULL / CHECK constraints                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Record validators run on the result of an add or an update, so a patch
//! that would leave a record invalid is rejected as a whole.
//!
//! ## Usage
//! ```rust
//! use souk_core::validation::{validate_phone, validate_quantity};
//!
//! validate_phone("+201001234567").unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::entities::{Customer, Expense, Order, OrderItemDraft, Product};
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::PaymentMethod;
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_PHONE_LEN: usize = 20;
const MAX_SKU_LEN: usize = 50;
const MAX_QUERY_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required display text (names, categories).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters (counted as characters, not bytes, so Arabic
///   names get the same limit)
pub fn validate_required_text(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Required
/// - Digits with an optional leading `+`; spaces and hyphens allowed
/// - At most 20 characters
///
/// ```rust
/// use souk_core::validation::validate_phone;
///
/// assert!(validate_phone("+20 100 123 4567").is_ok());
/// assert!(validate_phone("call me").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if phone.chars().count() > MAX_PHONE_LEN {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: MAX_PHONE_LEN,
        });
    }

    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if !digits
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
        || !digits.chars().any(|c| c.is_ascii_digit())
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates an optional email address. `None` is accepted.
pub fn validate_email(email: Option<&str>) -> ValidationResult<()> {
    let Some(email) = email.map(str::trim) else {
        return Ok(());
    };

    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain".to_string(),
        });
    }

    Ok(())
}

/// Validates an optional SKU. `None` is accepted.
///
/// ## Rules
/// - Not blank
/// - At most 50 characters
/// - Letters, numbers, hyphens and underscores only
///
/// ```rust
/// use souk_core::validation::validate_sku;
///
/// assert!(validate_sku(Some("HELMET-001")).is_ok());
/// assert!(validate_sku(None).is_ok());
/// assert!(validate_sku(Some("has space")).is_err());
/// ```
pub fn validate_sku(sku: Option<&str>) -> ValidationResult<()> {
    let Some(sku) = sku.map(str::trim) else {
        return Ok(());
    };

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed, lowercased query. Empty means "match everything".
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_lowercase())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an invoice line quantity: 1 to `MAX_ITEM_QUANTITY`.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Zero is allowed (free items, no credit).
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Stock counts and thresholds.
pub fn validate_count(field: &str, count: i64) -> ValidationResult<()> {
    if count < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// An amount that does not fit in the money range, e.g. a line total of
/// price × quantity past `i64::MAX` piastres.
pub fn amount_too_large(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: i64::MIN,
        max: i64::MAX,
    }
}

/// A discount may not push the invoice total below zero.
pub fn validate_discount(discount: Money, subtotal_with_tax: Money) -> ValidationResult<()> {
    validate_non_negative("discount", discount)?;

    if discount > subtotal_with_tax {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: subtotal_with_tax.cents(),
        });
    }

    Ok(())
}

/// Expenses cannot be put "on account".
pub fn validate_expense_payment_method(method: PaymentMethod) -> ValidationResult<()> {
    if !method.allowed_for_expense() {
        return Err(ValidationError::NotAllowed {
            field: "payment_method".to_string(),
            allowed: PaymentMethod::FOR_EXPENSES
                .iter()
                .map(|m| m.as_str().to_string())
                .collect(),
        });
    }
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    validate_required_text("name", &customer.name)?;
    validate_phone(&customer.phone)?;
    validate_email(customer.email.as_deref())?;
    validate_non_negative("credit_limit", customer.credit_limit)?;
    Ok(())
}

pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_required_text("name", &product.name)?;
    validate_sku(product.sku.as_deref())?;
    validate_non_negative("price", product.price)?;
    validate_non_negative("cost", product.cost)?;
    validate_count("stock", product.stock)?;
    validate_count("min_stock", product.min_stock)?;
    Ok(())
}

/// Checked before the line total is computed from it.
pub fn validate_item_draft(item: &OrderItemDraft) -> ValidationResult<()> {
    validate_quantity(item.quantity)?;
    validate_non_negative("price", item.price)?;
    Ok(())
}

/// Checks lines and discount. Totals are assumed to have been computed by
/// the store.
pub fn validate_order(order: &Order) -> ValidationResult<()> {
    if order.items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    if order.items.len() > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_ITEMS as i64,
        });
    }

    for item in &order.items {
        validate_quantity(item.quantity)?;
        validate_non_negative("price", item.price)?;
    }

    validate_discount(order.discount, order.subtotal + order.tax)?;
    Ok(())
}

pub fn validate_expense(expense: &Expense) -> ValidationResult<()> {
    validate_required_text("category", &expense.category)?;
    validate_positive("amount", expense.amount)?;
    validate_expense_payment_method(expense.payment_method)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
