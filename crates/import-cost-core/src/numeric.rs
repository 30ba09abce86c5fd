//! Numeric-safety helpers shared by the engine.
//!
//! `Decimal` has no NaN or infinity: dividing by zero panics. Every ratio in
//! the engine goes through [`safe_div`], which resolves a zero denominator to
//! zero instead.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Rate};

/// Relative tolerance for sums derived from proportional allocation.
pub const ALLOCATION_TOLERANCE: Decimal = dec!(0.000000001);

/// `numerator / denominator`, or zero when the denominator is zero.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Convert a source-currency amount into local currency.
pub fn to_local(amount_source: Money, exchange_rate: Rate) -> Money {
    amount_source * exchange_rate
}

/// Relative equality with an absolute floor of `tolerance` near zero.
pub fn approx_eq(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    let scale = a.abs().max(b.abs()).max(Decimal::ONE);
    (a - b).abs() <= tolerance * scale
}

/// Sum a field across a slice.
pub fn sum_by<T>(items: &[T], field: impl Fn(&T) -> Decimal) -> Decimal {
    items.iter().map(field).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_div_zero_denominator() {
        assert_eq!(safe_div(dec!(10), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_safe_div_regular() {
        assert_eq!(safe_div(dec!(10), dec!(4)), dec!(2.5));
    }

    #[test]
    fn test_to_local() {
        assert_eq!(to_local(dec!(100), dec!(5.25)), dec!(525));
    }

    #[test]
    fn test_approx_eq_thirds() {
        let third = dec!(1000) / dec!(3);
        let sum = third + third + third;
        assert!(approx_eq(sum, dec!(1000), ALLOCATION_TOLERANCE));
    }

    #[test]
    fn test_approx_eq_rejects_real_difference() {
        assert!(!approx_eq(dec!(1000), dec!(1000.01), ALLOCATION_TOLERANCE));
    }

    #[test]
    fn test_approx_eq_near_zero_uses_absolute_floor() {
        assert!(approx_eq(dec!(0.0000000001), Decimal::ZERO, ALLOCATION_TOLERANCE));
        assert!(!approx_eq(dec!(0.001), Decimal::ZERO, ALLOCATION_TOLERANCE));
    }
}
