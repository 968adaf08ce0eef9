//! # Money
//!
//! Prices arrive from the page as decimal text and are rounded to whole
//! cents exactly once, in [`Money::from_decimal`]. Sums, line totals and tax
//! after that are integer arithmetic, so `$40.10 x 3` is `$120.30` and never
//! `120.30000000000001`.
//!
//! Arithmetic saturates at the `i64` bounds instead of wrapping or panicking.
//! Validated prices stay far below them (see [`MAX_PRICE_CENTS`]), so a
//! saturated total only shows up for carts built outside validation.
//!
//! ```text
//! "40" ──parse_price──► Money(4000) ──× qty──► line total ──Σ──► subtotal
//!                                                                   │
//!                                   total ◄──+── tax ◄──calculate_tax┘
//! ```
//!
//! ```rust
//! use tsul_core::money::Money;
//!
//! let line = Money::from_cents(4000) * 2;
//! assert_eq!(line.to_string(), "$80.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

use crate::types::TaxRate;

/// Largest unit price accepted from the page or from stored data:
/// $1,000,000.00. A cart of `u32::MAX` such units still sums and taxes
/// without touching the `i64` bounds.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// An amount in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Nearest cent to `amount`; `None` for NaN, infinities and overflow.
    ///
    /// ```rust
    /// use tsul_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(40.5), Some(Money::from_cents(4050)));
    /// assert_eq!(Money::from_decimal(f64::NAN), None);
    /// ```
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let cents = (amount * 100.0).round();
        (cents.abs() < i64::MAX as f64).then(|| Money(cents as i64))
    }

    /// Decimal dollars, for the persisted `price` field.
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Tax on this amount, rounded half-up to the cent:
    /// `(cents·bps + 5000) / 10000`, i.e. `round(amount × rate, 2)`.
    ///
    /// ```rust
    /// use tsul_core::money::Money;
    /// use tsul_core::types::TaxRate;
    ///
    /// let tax = Money::from_cents(8000).calculate_tax(TaxRate::from_bps(825));
    /// assert_eq!(tax.cents(), 660);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // widened so huge subtotals cannot overflow before the division
        let cents = (i128::from(self.0) * i128::from(rate.bps()) + 5000) / 10000;
        Money(i64::try_from(cents).unwrap_or(if cents < 0 { i64::MIN } else { i64::MAX }))
    }

    /// Unit price times quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }
}

/// `$12.34`, always two decimals.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_decimal_rounds_once() {
        assert_eq!(Money::from_decimal(40.0), Some(Money::from_cents(4000)));
        assert_eq!(Money::from_decimal(19.999), Some(Money::from_cents(2000)));
        assert_eq!(Money::from_decimal(0.1 + 0.2), Some(Money::from_cents(30)));
        assert_eq!(Money::from_decimal(f64::INFINITY), None);
        assert_eq!(Money::from_decimal(1e30), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_line_totals_are_exact() {
        let unit = Money::from_decimal(40.1).unwrap();
        assert_eq!((unit * 3).to_string(), "$120.30");

        let total: Money = [unit, unit, Money::from_cents(5)].into_iter().sum();
        assert_eq!(total.cents(), 8025);
    }

    #[test]
    fn test_tax_rounds_half_up() {
        let rate = TaxRate::from_bps(825);
        // 0.825 → 0.83
        assert_eq!(Money::from_cents(1000).calculate_tax(rate).cents(), 83);
        // 0.00495 → 0.00
        assert_eq!(Money::from_cents(6).calculate_tax(rate).cents(), 0);
        // 0.005775 → 0.01
        assert_eq!(Money::from_cents(7).calculate_tax(rate).cents(), 1);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!((huge * 2).cents(), i64::MAX);
        assert_eq!((huge + huge).cents(), i64::MAX);

        let mut acc = huge;
        acc += huge;
        assert_eq!(acc.cents(), i64::MAX);

        let total: Money = [huge, huge, huge].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);

        let tax = Money::from_cents(i64::MAX).calculate_tax(TaxRate::from_bps(10000));
        assert_eq!(tax.cents(), i64::MAX);
    }

    #[test]
    fn test_max_price_cart_stays_in_range() {
        let line = Money::from_cents(MAX_PRICE_CENTS) * u32::MAX;
        let total = line + line.calculate_tax(TaxRate::from_bps(10000));
        assert!(total.cents() < i64::MAX);
    }

    #[test]
    fn test_tax_matches_decimal_rounding() {
        let rate = TaxRate::from_bps(825);
        for cents in (0..200_000).step_by(37) {
            let numerator = cents * 825;
            let expected = numerator / 10000 + i64::from(numerator % 10000 >= 5000);
            assert_eq!(Money::from_cents(cents).calculate_tax(rate).cents(), expected);
        }
    }
}
