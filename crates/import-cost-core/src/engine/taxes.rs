//! Cascading import taxes.
//!
//! Duty is levied on the freight-inclusive (CFR) base. ICMS is levied on a
//! base that already contains the duty and the allocated customs fees, so the
//! two taxes are strictly sequential: duty must be resolved first.
//!
//! Rates are applied exactly as given and never clamped here. The checked
//! entry points reject a negative rate and warn on a rate above 1.

use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Bases and amounts for both import taxes on one product line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// Own cost + allocated freight
    pub duty_base_local: Money,
    pub duty_local: Money,
    /// Duty base + duty + allocated other fees
    pub icms_base_local: Money,
    pub icms_local: Money,
}

/// Compute duty, then ICMS on the duty-inclusive base.
pub fn compute_taxes(
    own_cost_local: Money,
    allocated_freight_local: Money,
    allocated_fees_local: Money,
    duty_rate: Rate,
    icms_rate: Rate,
) -> TaxBreakdown {
    let duty_base_local = own_cost_local + allocated_freight_local;
    let duty_local = duty_base_local * duty_rate;

    let icms_base_local = duty_base_local + duty_local + allocated_fees_local;
    let icms_local = icms_base_local * icms_rate;

    TaxBreakdown {
        duty_base_local,
        duty_local,
        icms_base_local,
        icms_local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_duty_on_freight_inclusive_base() {
        let t = compute_taxes(dec!(500), dec!(250), dec!(40), dec!(0.6), dec!(0.17));
        assert_eq!(t.duty_base_local, dec!(750));
        assert_eq!(t.duty_local, dec!(450));
    }

    #[test]
    fn test_fees_excluded_from_duty_base() {
        let without_fees = compute_taxes(dec!(500), dec!(250), Decimal::ZERO, dec!(0.6), dec!(0.17));
        let with_fees = compute_taxes(dec!(500), dec!(250), dec!(100), dec!(0.6), dec!(0.17));
        assert_eq!(without_fees.duty_local, with_fees.duty_local);
        assert_eq!(with_fees.icms_base_local - without_fees.icms_base_local, dec!(100));
    }

    #[test]
    fn test_icms_base_includes_duty_and_fees() {
        let t = compute_taxes(dec!(500), dec!(250), dec!(40), dec!(0.6), dec!(0.17));
        // 750 + 450 + 40 = 1240
        assert_eq!(t.icms_base_local, dec!(1240));
        assert_eq!(t.icms_local, dec!(210.8));
    }

    #[test]
    fn test_duty_rate_feeds_icms() {
        let low = compute_taxes(dec!(1000), Decimal::ZERO, Decimal::ZERO, dec!(0.1), dec!(0.17));
        let high = compute_taxes(dec!(1000), Decimal::ZERO, Decimal::ZERO, dec!(0.2), dec!(0.17));
        assert!(high.icms_local > low.icms_local);
    }

    #[test]
    fn test_icms_rate_never_touches_duty() {
        let a = compute_taxes(dec!(1000), dec!(100), dec!(10), dec!(0.6), dec!(0.12));
        let b = compute_taxes(dec!(1000), dec!(100), dec!(10), dec!(0.6), dec!(0.25));
        assert_eq!(a.duty_local, b.duty_local);
        assert_eq!(a.duty_base_local, b.duty_base_local);
        assert_eq!(a.icms_base_local, b.icms_base_local);
    }

    #[test]
    fn test_zero_rates() {
        let t = compute_taxes(dec!(1000), dec!(100), dec!(10), Decimal::ZERO, Decimal::ZERO);
        assert_eq!(t.duty_local, Decimal::ZERO);
        assert_eq!(t.icms_local, Decimal::ZERO);
        assert_eq!(t.icms_base_local, dec!(1110));
    }

    #[test]
    fn test_out_of_range_rate_applied_unclamped() {
        let t = compute_taxes(dec!(100), Decimal::ZERO, Decimal::ZERO, dec!(1.5), Decimal::ZERO);
        assert_eq!(t.duty_local, dec!(150));
    }
}
