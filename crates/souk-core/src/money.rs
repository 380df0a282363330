//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  425.00 × 0.15 in floating point is fine; 0.1 + 0.2 is not:             │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Summing hundreds of invoice totals drifts the same way, and the        │
//! │  dashboard profit figure ends up a few piastres off.                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (piastres, 1/100 EGP)                │
//! │    42500 × 1500 bps / 10000 = 6375  → 63.75 EGP exactly                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use souk_core::money::Money;
//!
//! let price = Money::from_major(150);       // 150.00
//! let line = price.multiply_quantity(2);    // 300.00
//! assert_eq!(line.cents(), 30_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: customer balances go negative when they owe money
/// - **Single field tuple struct**: serializes as a bare integer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use souk_core::money::Money;
    ///
    /// let tax = Money::from_cents(6375); // 63.75
    /// assert_eq!(tax.major(), 63);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates tax on this amount, rounding half away from zero.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`, widened to i128 so
    /// large invoices cannot overflow.
    ///
    /// ```rust
    /// use souk_core::money::Money;
    /// use souk_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_major(425);
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(1500));
    /// assert_eq!(tax.cents(), 6375); // 63.75
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let product = self.0 as i128 * rate.bps() as i128;
        let rounded = if product >= 0 {
            (product + 5000) / 10000
        } else {
            (product - 5000) / 10000
        };
        Money(rounded as i64)
    }

    /// Multiplies a unit price by a quantity, saturating at the i64 bounds.
    ///
    /// ```rust
    /// use souk_core::money::Money;
    ///
    /// let unit_price = Money::from_major(25);
    /// assert_eq!(unit_price.multiply_quantity(5), Money::from_major(125));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    // -------------------------------------------------------------------------
    // Checked arithmetic
    // -------------------------------------------------------------------------
    //
    // The operators saturate. Anything computed from user input (line
    // totals, invoice totals, drawer balances) goes through these instead,
    // so an overflow is reported rather than clamped.

    /// `None` on overflow.
    ///
    /// ```rust
    /// use souk_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    /// ```
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Unit price × quantity, `None` on overflow.
    #[inline]
    pub const fn checked_mul_quantity(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sum of `amounts`, `None` if any partial sum overflows.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Human-readable amount, e.g. `488.75 EGP`.
///
/// ## Note
/// Locale-aware formatting (Arabic digits) belongs to the presentation layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:02} EGP",
            sign,
            self.major().abs(),
            self.cents_part()
        )
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(488, 75).cents(), 48_875);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
        assert_eq!(Money::from_major(5000).cents(), 500_000);
    }

    #[test]
    fn test_parts() {
        let money = Money::from_cents(-6375);
        assert_eq!(money.major(), -63);
        assert_eq!(money.cents_part(), 75);
        assert!(money.is_negative());
        assert_eq!(money.abs(), Money::from_cents(6375));
    }

    #[test]
    fn test_invoice_tax_at_fifteen_percent() {
        let rate = TaxRate::from_bps(1500);
        assert_eq!(Money::from_major(300).calculate_tax(rate), Money::from_major(45));
        assert_eq!(Money::from_major(425).calculate_tax(rate), Money::from_cents(6375));
        // 0.15 * 0.03 = 0.0045 → rounds to 0.00
        assert_eq!(Money::from_cents(3).calculate_tax(rate), Money::zero());
        // 0.15 * 0.10 = 0.015 → rounds half away from zero to 0.02
        assert_eq!(Money::from_cents(10).calculate_tax(rate), Money::from_cents(2));
        assert_eq!(Money::from_cents(-10).calculate_tax(rate), Money::from_cents(-2));
    }

    #[test]
    fn test_tax_on_large_amount_does_not_overflow() {
        let big = Money::from_cents(i64::MAX / 2);
        let tax = big.calculate_tax(TaxRate::from_bps(1500));
        assert!(tax.is_positive());
    }

    #[test]
    fn test_arithmetic() {
        let mut total = Money::from_major(300) + Money::from_major(45);
        total -= Money::from_major(5);
        assert_eq!(total, Money::from_major(340));
        assert_eq!(-total, Money::from_major(-340));
        assert_eq!(Money::from_major(25) * 5, Money::from_major(125));
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_major(5000), Money::from_major(800)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total, Money::from_major(5800));

        let empty: Vec<Money> = Vec::new();
        assert_eq!(empty.into_iter().sum::<Money>(), Money::zero());
    }

    #[test]
    fn test_checked_arithmetic() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(max.checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)), None);
        assert_eq!(Money::from_major(1).checked_mul_quantity(i64::MAX / 10), None);
        assert_eq!(
            Money::from_major(150).checked_mul_quantity(2),
            Some(Money::from_major(300))
        );

        assert_eq!(
            Money::checked_sum([Money::from_major(300), Money::from_major(125)]),
            Some(Money::from_major(425))
        );
        assert_eq!(Money::checked_sum([max, Money::from_cents(1)]), None);
    }

    #[test]
    fn test_operators_saturate() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(max + Money::from_cents(1), max);
        assert_eq!(Money::from_major(1) * i64::MAX, max);
        assert_eq!(-Money::from_cents(i64::MIN), max);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(48_875).to_string(), "488.75 EGP");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50 EGP");
        assert_eq!(Money::zero().to_string(), "0.00 EGP");
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&Money::from_cents(6375)).unwrap();
        assert_eq!(json, "6375");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Money::from_cents(6375));
    }
}
