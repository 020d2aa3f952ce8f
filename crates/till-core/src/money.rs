//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE PRECISION PROBLEM                                                  │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  With integer cents:                                                    │
//! │    15% off 1.99 = 0.2985 → 0.30 rounded per line                        │
//! │    Ten lines later the receipt no longer adds up                        │
//! │                                                                         │
//! │  OUR SOLUTION: Exact Decimal, Rounded Only For Display                  │
//! │    Every discount, subtotal and VAT figure keeps full precision         │
//! │    through the pricing pipeline. `round_to_minor()` is called by        │
//! │    presentation code (receipt, display, order submission) only.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::money::Money;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let line = price * 3;                // 32.97
//! assert_eq!(line.cents(), 3297);
//!
//! // NEVER do this:
//! // let bad = Money::from_f64(10.99); // NO SUCH METHOD EXISTS!
//! ```

use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

/// Number of decimal places in the currency's minor unit.
pub const MINOR_UNIT_SCALE: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in major currency units, carried at full precision.
///
/// ## Design Decisions
/// - **Decimal, not f64**: exact base-10 arithmetic
/// - **Major units**: `Money::from_cents(1099)` is `10.99`
/// - **Serialized as a string**: `"10.99"`, so JSON consumers never see a
///   binary float
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► CartLine.unit_price ──► Section lines ──► Totals
///                                       └─► RemainingItem.line_subtotal
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(#[ts(as = "String")] Decimal);

impl Money {
    /// Creates a Money value from minor units (cents).
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.to_string(), "10.99");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, MINOR_UNIT_SCALE))
    }

    /// Wraps an exact decimal amount in major units.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns the exact amount in major units.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Clamps negative amounts to zero.
    ///
    /// Discounts and subtotals are never allowed below zero; a fixed bundle
    /// priced above the items it replaces yields no discount, not a surcharge.
    #[inline]
    pub fn non_negative(self) -> Self {
        self.max(Money::zero())
    }

    /// Multiplies money by a quantity.
    ///
    /// Saturates at the edge of the decimal range instead of panicking.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(Decimal::from(qty)))
    }

    /// Returns `percent`% of this amount, unrounded.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use till_core::money::Money;
    ///
    /// let line = Money::from_cents(199);
    /// let off = line.percent(Decimal::from(15));
    /// assert_eq!(off.amount().to_string(), "0.2985");
    /// ```
    pub fn percent(&self, percent: Decimal) -> Money {
        Money(self.0.saturating_mul(percent) / Decimal::ONE_HUNDRED)
    }

    /// Returns this amount as a percentage of `whole`, rounded to two places.
    ///
    /// A zero (or negative) `whole`, or a ratio outside the decimal range,
    /// yields zero.
    pub fn percent_of(&self, whole: Money) -> Decimal {
        if !whole.is_positive() {
            return Decimal::ZERO;
        }
        self.0
            .checked_div(whole.0)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(|pct| pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
            .unwrap_or(Decimal::ZERO)
    }

    /// Returns `part / whole` of this amount, unrounded.
    ///
    /// Used to spread a discount over lines by their totals. A zero (or
    /// negative) `whole` yields zero.
    pub fn share(&self, part: Money, whole: Money) -> Money {
        if !whole.is_positive() {
            return Money::zero();
        }
        self.0
            .checked_mul(part.0)
            .and_then(|product| product.checked_div(whole.0))
            .or_else(|| self.0.checked_div(whole.0).map(|ratio| ratio.saturating_mul(part.0)))
            .map(Money)
            .unwrap_or_default()
    }

    /// Extracts the VAT contained in a tax-inclusive amount.
    ///
    /// ## Formula
    /// `tax = amount × rate / (1 + rate)`, computed in basis points as
    /// `amount × bps / (10000 + bps)`.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    /// use till_core::types::TaxRate;
    ///
    /// let gross = Money::from_cents(11500);     // 115.00 incl. VAT
    /// let vat = gross.extract_vat(TaxRate::from_bps(1500));
    /// assert_eq!(vat.cents(), 1500);           // 15.00
    /// ```
    pub fn extract_vat(&self, rate: TaxRate) -> Money {
        if rate.is_zero() {
            return Money::zero();
        }
        let bps = Decimal::from(rate.bps());
        let divisor = Decimal::from(10_000u32) + bps;
        match self.0.checked_mul(bps) {
            Some(product) => Money(product / divisor),
            None => Money(self.0 / divisor * bps),
        }
    }

    /// Rounds to the currency's minor unit (half away from zero).
    ///
    /// Presentation only. The pricing pipeline never calls this.
    pub fn round_to_minor(&self) -> Money {
        let mut rounded = self
            .0
            .round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(MINOR_UNIT_SCALE);
        Money(rounded)
    }

    /// Returns the amount rounded to whole minor units (cents).
    pub fn cents(&self) -> i64 {
        self.round_to_minor()
            .0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .unwrap_or_default()
    }
}

// =============================================================================
// Trait Implementations
//
// Addition and subtraction saturate like `multiply_quantity`, so a hostile
// catalog or cart snapshot cannot panic a pricing pass.
// =============================================================================

/// Display rounds to the minor unit; use frontend formatting for symbols.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.round_to_minor().0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
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
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.amount(), dec!(10.99));
        assert_eq!(money.cents(), 1099);
    }

    #[test]
    fn test_display_pads_minor_units() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_decimal(dec!(5)).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_percent_keeps_full_precision() {
        let line = Money::from_cents(199);
        let off = line.percent(dec!(15));
        assert_eq!(off.amount(), dec!(0.2985));
        assert_eq!(off.round_to_minor().amount(), dec!(0.30));
    }

    #[test]
    fn test_percent_of_rounds_to_two_places() {
        let discount = Money::from_decimal(dec!(5.05));
        let gross = Money::from_decimal(dec!(16.00));
        assert_eq!(discount.percent_of(gross), dec!(31.56));
    }

    #[test]
    fn test_percent_of_zero_whole_is_zero() {
        let discount = Money::from_cents(100);
        assert_eq!(discount.percent_of(Money::zero()), Decimal::ZERO);
    }

    #[test]
    fn test_extract_vat_inclusive() {
        let gross = Money::from_cents(11500);
        let vat = gross.extract_vat(TaxRate::from_bps(1500));
        assert_eq!(vat.amount(), dec!(15));

        assert!(gross.extract_vat(TaxRate::zero()).is_zero());
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(Money::from_decimal(dec!(0.125)).cents(), 13);
        assert_eq!(Money::from_decimal(dec!(0.135)).cents(), 14);
        assert_eq!(Money::from_decimal(dec!(-0.125)).cents(), -13);
    }

    #[test]
    fn test_non_negative_clamps() {
        assert!(Money::from_cents(-1).non_negative().is_zero());
        assert_eq!(Money::from_cents(7).non_negative().cents(), 7);
    }

    #[test]
    fn test_parse_and_serialize_as_string() {
        let money: Money = "10.95".parse().unwrap();
        assert_eq!(money.amount(), dec!(10.95));

        let json = serde_json::to_string(&money).unwrap();
        assert_eq!(json, "\"10.95\"");

        let from_number: Money = serde_json::from_str("10.95").unwrap();
        assert_eq!(from_number, money);
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_panicking() {
        let huge = Money::from_decimal(Decimal::MAX);

        assert_eq!(huge.multiply_quantity(999), huge);
        assert_eq!(huge + huge, huge);
        assert_eq!(Money::from_decimal(Decimal::MIN) - huge, Money::from_decimal(Decimal::MIN));
        assert_eq!(huge.cents(), 0);
        assert_eq!(huge.percent_of(Money::from_cents(1)), Decimal::ZERO);
        assert!(huge.extract_vat(TaxRate::from_bps(1500)).is_positive());
        assert!(huge.percent(dec!(50)).is_positive());
    }

    #[test]
    fn test_share_spreads_proportionally() {
        let discount = Money::from_cents(1000);
        assert_eq!(discount.share(Money::from_cents(3000), Money::from_cents(4000)).cents(), 750);
        assert_eq!(discount.share(Money::from_cents(3000), Money::zero()), Money::zero());

        let huge = Money::from_decimal(Decimal::MAX);
        assert!(huge.share(huge, huge).is_positive());
    }
}
