//! # Money Module
//!
//! Provides the `Money` type for prices, line totals and checkout totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Cart: 4.99 + 2.49 × 2 + 5.99 in floating point                         │
//! │    = 15.959999999999999  ❌ and the tax line drifts with it             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    499 + 249 × 2 + 599 = 1596 cents                                     │
//! │    tax 10% = 160 cents, total = 1756 cents  ✅ $17.56                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use trolley_core::money::Money;
//!
//! let price = Money::from_cents(249); // $2.49
//! let line = price * 2;               // $4.98
//! assert_eq!(line.to_string(), "$4.98");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money Flows
/// ```text
/// Product.price_cents ──► CartLine.unit_price ──► CartLine.line_total
///                                                        │
///                             Cart.subtotal ◄────────────┘
///                                  │
///                                  ▼
///                       calculate_tax(10%) ──► OrderSummary.total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use trolley_core::money::Money;
    ///
    /// let price = Money::from_cents(499); // $4.99
    /// assert_eq!(price.cents(), 499);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-dollar portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
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
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax on this amount, rounding half up to the cent.
    ///
    /// ## Implementation
    /// Integer math only: `(amount * bps + 5000) / 10000`. The `+5000` is the
    /// half-cent that turns truncation into rounding.
    ///
    /// ## Example
    /// ```rust
    /// use trolley_core::money::Money;
    /// use trolley_core::types::TaxRate;
    ///
    /// // $15.96 at 10% = $1.596 → $1.60
    /// let tax = Money::from_cents(1596).calculate_tax(TaxRate::from_bps(1000));
    /// assert_eq!(tax.cents(), 160);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 keeps large carts from overflowing the intermediate product
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ```rust
    /// use trolley_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(249).multiply_quantity(2).cents(), 498);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders `$4.99` / `-$0.50`. Localized formatting belongs to the UI.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1756);
        assert_eq!(money.cents(), 1756);
        assert_eq!(money.dollars(), 17);
        assert_eq!(money.cents_part(), 56);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(499).to_string(), "$4.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-50).to_string(), "-$0.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let lines = [
            Money::from_cents(499),
            Money::from_cents(249) * 2,
            Money::from_cents(599),
        ];
        let subtotal: Money = lines.iter().copied().sum();
        assert_eq!(subtotal.cents(), 1596);
        assert_eq!((subtotal - Money::from_cents(96)).cents(), 1500);
    }

    #[test]
    fn test_tax_rounds_half_up() {
        let rate = TaxRate::from_bps(1000);
        assert_eq!(Money::from_cents(1596).calculate_tax(rate).cents(), 160);
        // 0.5 cent rounds up
        assert_eq!(Money::from_cents(5).calculate_tax(rate).cents(), 1);
        assert_eq!(Money::from_cents(4).calculate_tax(rate).cents(), 0);
    }

    #[test]
    fn test_zero_tax_rate() {
        let tax = Money::from_cents(1596).calculate_tax(TaxRate::zero());
        assert!(tax.is_zero());
    }
}
