//! # Money Module
//!
//! Fixed-point monetary and quantity types for estimation math.
//!
//! ## Why Integer Money?
//! ```text
//! In floating point:
//!   0.1 + 0.2 = 0.30000000000000004   WRONG
//!
//! Our solution: integer cents.
//!   Prices, bucket sums, tax amounts and session costs are all i64
//!   cents of CFA francs. Quantities are i64 hundredths. Every derived
//!   value is integer arithmetic with one explicit round-half-up at the
//!   stored scale (2 decimal places).
//! ```
//!
//! ## Usage
//! ```rust
//! use chiffrage_core::money::{Money, Quantity};
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(150_000); // 1500.00 CFA
//!
//! // Line cost: quantity is fixed-point too (2.50 units)
//! let qty = Quantity::from_hundredths(250);
//! assert_eq!(price.multiply_quantity(qty).cents(), 375_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents of CFA francs (the smallest stored unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for corrections
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Scale 2**: the persistent store keeps 2 decimal places; this type
///   is that scale, so no conversion can lose precision
///
/// Every monetary value in the system flows through this type: catalog
/// prices, admin prices, overrides, bucket sums, tax amounts, session
/// costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use chiffrage_core::money::Money;
    ///
    /// let price = Money::from_cents(150_000); // 1500.00 CFA
    /// assert_eq!(price.cents(), 150_000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole francs.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-franc portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cent portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax for this amount.
    ///
    /// ## Implementation
    /// Integer math in i128: `(cents * bps + 5000) / 10000`. The +5000
    /// rounds half up at the cent, and i128 keeps the intermediate product
    /// from overflowing on large project totals.
    ///
    /// ```rust
    /// use chiffrage_core::money::Money;
    /// use chiffrage_core::types::TaxRate;
    ///
    /// let total_ht = Money::from_cents(150_000); // 1500.00
    /// let tva = total_ht.calculate_tax(TaxRate::from_bps(1800)); // 18%
    /// assert_eq!(tva.cents(), 27_000); // 270.00
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies this unit price by a fixed-point quantity.
    ///
    /// Both operands carry 2 decimal places, so the exact product carries
    /// 4; one round-half-up brings the result back to the stored scale.
    ///
    /// ```rust
    /// use chiffrage_core::money::{Money, Quantity};
    ///
    /// let unit_price = Money::from_cents(1099);          // 10.99
    /// let qty = Quantity::from_hundredths(250);          // 2.50
    /// assert_eq!(unit_price.multiply_quantity(qty).cents(), 2748); // 27.48
    /// ```
    pub fn multiply_quantity(&self, qty: Quantity) -> Money {
        let cost = (self.0 as i128 * qty.hundredths() as i128 + 50) / 100;
        Money::from_cents(cost as i64)
    }
}

// =============================================================================
// Quantity Type
// =============================================================================

/// A line-item quantity in hundredths (fixed point, scale 2).
///
/// Quantities are decimal in this domain (2.50 linear meters, 0.25 days),
/// so they get the same integer fixed-point treatment as money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from hundredths (250 = 2.50).
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Quantity(hundredths)
    }

    /// Creates a whole-number quantity.
    #[inline]
    pub const fn from_whole(n: i64) -> Self {
        Quantity(n * 100)
    }

    /// Returns the quantity in hundredths.
    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    /// One unit.
    #[inline]
    pub const fn one() -> Self {
        Quantity(100)
    }

    /// Zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    /// Checks if the quantity is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the quantity is positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::one()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display. Collaborators own the localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02} CFA", sign, self.major().abs(), self.minor())
    }
}

/// Default money is zero.
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a whole count (for whole-unit quantities).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, n: i64) -> Self {
        Money(self.0 * n)
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
        let money = Money::from_cents(150_099);
        assert_eq!(money.cents(), 150_099);
        assert_eq!(money.major(), 1500);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(150_099)), "1500.99 CFA");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00 CFA");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50 CFA");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00 CFA");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_tax_calculation_default_rate() {
        // 1500.00 at 18% = 270.00
        let amount = Money::from_cents(150_000);
        let rate = TaxRate::from_bps(1800);
        assert_eq!(amount.calculate_tax(rate).cents(), 27_000);
    }

    #[test]
    fn test_tax_calculation_with_rounding() {
        // 10.01 at 18% = 1.8018 -> 1.80
        assert_eq!(
            Money::from_cents(1001).calculate_tax(TaxRate::from_bps(1800)).cents(),
            180
        );
        // 10.03 at 18% = 1.8054 -> 1.81
        assert_eq!(
            Money::from_cents(1003).calculate_tax(TaxRate::from_bps(1800)).cents(),
            181
        );
    }

    #[test]
    fn test_multiply_whole_quantity_exact() {
        let unit_price = Money::from_cents(1099);
        let cost = unit_price.multiply_quantity(Quantity::from_whole(3));
        assert_eq!(cost.cents(), 3297);
    }

    #[test]
    fn test_multiply_fractional_quantity_rounds_half_up() {
        // 10.99 x 2.50 = 27.475 -> 27.48
        let unit_price = Money::from_cents(1099);
        let cost = unit_price.multiply_quantity(Quantity::from_hundredths(250));
        assert_eq!(cost.cents(), 2748);

        // 0.01 x 0.25 = 0.000025... -> 0.0025 -> rounds to 0.00
        let tiny = Money::from_cents(1).multiply_quantity(Quantity::from_hundredths(25));
        assert_eq!(tiny.cents(), 0);
    }

    #[test]
    fn test_quantity_display() {
        assert_eq!(format!("{}", Quantity::from_hundredths(250)), "2.50");
        assert_eq!(format!("{}", Quantity::from_whole(7)), "7.00");
        assert_eq!(format!("{}", Quantity::from_hundredths(5)), "0.05");
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_cents(100).is_positive());
        assert!(Money::from_cents(-100).is_negative());
        assert!(Quantity::zero().is_zero());
        assert!(Quantity::one().is_positive());
    }
}
