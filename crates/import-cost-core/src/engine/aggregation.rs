//! Per-line and simulation-wide aggregation.
//!
//! Simulation totals are plain folds over the per-line results. Nothing is
//! re-derived from the configuration, so totals always agree with the rows.

use serde::{Deserialize, Serialize};

use crate::engine::line::{ProductLineInput, ProductLineResult};
use crate::engine::taxes::TaxBreakdown;
use crate::numeric::{safe_div, sum_by, to_local};
use crate::types::{Kilograms, Money, Multiple, Rate};

/// Simulation-wide sums and summary ratios.
///
/// Per-unit costs are not summed: a total of unit costs has no meaning, so
/// the only derived fields here are per-line sums and the two ratios below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationTotals {
    pub line_count: usize,
    pub total_quantity: u64,
    pub total_weight_kg: Kilograms,
    pub total_fob_value_source: Money,
    pub total_own_cost_local: Money,
    pub total_allocated_freight_local: Money,
    pub total_cost_plus_freight_local: Money,
    pub total_duty_base_local: Money,
    pub total_duty_local: Money,
    pub total_allocated_other_fees_local: Money,
    pub total_icms_base_local: Money,
    pub total_icms_local: Money,
    pub total_landed_cost_local: Money,
    /// FOB (source currency) per kilogram; 0 when total weight is 0
    pub cost_per_kg_source: Money,
    /// Landed cost / FOB in local currency; 0 when FOB is 0
    pub import_multiplier: Multiple,
}

/// Resolve every derived field of one product line.
///
/// `taxes` must come from [`crate::engine::taxes::compute_taxes`] on the same
/// own cost and allocations.
pub fn aggregate_line(
    input: &ProductLineInput,
    exchange_rate: Rate,
    allocated_freight_local: Money,
    allocated_fees_local: Money,
    taxes: &TaxBreakdown,
) -> ProductLineResult {
    let total_weight_kg = input.total_weight_kg();
    let fob_value_source = input.fob_value_source();
    let own_cost_local = to_local(fob_value_source, exchange_rate);

    let cost_plus_freight_local = own_cost_local + allocated_freight_local;
    debug_assert_eq!(
        cost_plus_freight_local, taxes.duty_base_local,
        "tax breakdown computed on a different base"
    );

    let total_landed_cost_local =
        cost_plus_freight_local + taxes.duty_local + taxes.icms_local + allocated_fees_local;

    let quantity = Money::from(input.quantity);

    ProductLineResult {
        id: input.id.clone(),
        description: input.description.clone(),
        ncm_code: input.ncm_code.clone(),
        quantity: input.quantity,
        unit_price_source: input.unit_price_source,
        unit_weight_kg: input.unit_weight_kg,
        total_weight_kg,
        fob_value_source,
        own_cost_local,
        allocated_freight_local,
        cost_plus_freight_local,
        duty_base_local: taxes.duty_base_local,
        duty_local: taxes.duty_local,
        allocated_other_fees_local: allocated_fees_local,
        icms_base_local: taxes.icms_base_local,
        icms_local: taxes.icms_local,
        total_landed_cost_local,
        unit_cost_no_tax_local: safe_div(cost_plus_freight_local, quantity),
        unit_cost_with_tax_local: safe_div(total_landed_cost_local, quantity),
    }
}

/// Sum the per-line results and derive the summary ratios.
pub fn aggregate_simulation(lines: &[ProductLineResult], exchange_rate: Rate) -> SimulationTotals {
    let total_weight_kg = sum_by(lines, |l| l.total_weight_kg);
    let total_fob_value_source = sum_by(lines, |l| l.fob_value_source);
    let total_landed_cost_local = sum_by(lines, |l| l.total_landed_cost_local);

    SimulationTotals {
        line_count: lines.len(),
        total_quantity: lines.iter().map(|l| u64::from(l.quantity)).sum(),
        total_weight_kg,
        total_fob_value_source,
        total_own_cost_local: sum_by(lines, |l| l.own_cost_local),
        total_allocated_freight_local: sum_by(lines, |l| l.allocated_freight_local),
        total_cost_plus_freight_local: sum_by(lines, |l| l.cost_plus_freight_local),
        total_duty_base_local: sum_by(lines, |l| l.duty_base_local),
        total_duty_local: sum_by(lines, |l| l.duty_local),
        total_allocated_other_fees_local: sum_by(lines, |l| l.allocated_other_fees_local),
        total_icms_base_local: sum_by(lines, |l| l.icms_base_local),
        total_icms_local: sum_by(lines, |l| l.icms_local),
        total_landed_cost_local,
        cost_per_kg_source: safe_div(total_fob_value_source, total_weight_kg),
        import_multiplier: safe_div(
            total_landed_cost_local,
            to_local(total_fob_value_source, exchange_rate),
        ),
    }
}
