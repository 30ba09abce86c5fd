//! Side-by-side comparison of freight allocation methods.
//!
//! The allocation basis moves freight (and the taxes levied on it) between
//! lines, but never changes the simulation-wide landed cost. The report makes
//! both facts visible: the per-line split for every method, and the spread of
//! the totals across methods.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::engine::config::AllocationMethod;
use crate::engine::intake::sanitize_lines;
use crate::engine::pipeline::{simulate, validate_simulation_input, SimulationInput};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::ImportCostResult;

/// One line's outcome under a given freight method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineUnderMethod {
    pub id: String,
    pub allocated_freight_local: Money,
    pub total_landed_cost_local: Money,
    pub unit_cost_with_tax_local: Money,
}

/// Simulation outcome for one freight allocation method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodOutcome {
    pub freight_allocation_method: AllocationMethod,
    pub lines: Vec<LineUnderMethod>,
    pub total_landed_cost_local: Money,
    pub import_multiplier: Decimal,
}

/// Output of the method comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodComparisonOutput {
    /// Fees method held fixed across every run
    pub fees_allocation_method: AllocationMethod,
    pub outcomes: Vec<MethodOutcome>,
    /// max - min of total landed cost across methods (rounding noise only)
    pub total_landed_cost_spread: Money,
}

/// Re-run the simulation once per freight allocation method.
pub fn compare_allocation_methods(
    input: &SimulationInput,
) -> ImportCostResult<ComputationOutput<MethodComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let sanitized = sanitize_lines(input.lines.clone())?;
    if sanitized.clamped_values > 0 {
        warnings.push(format!(
            "{} negative line value(s) clamped to zero",
            sanitized.clamped_values
        ));
    }
    validate_simulation_input(&input.config, &sanitized.lines)?;

    let mut outcomes = Vec::with_capacity(AllocationMethod::ALL.len());
    for method in AllocationMethod::ALL {
        let mut config = input.config.clone();
        config.freight_allocation_method = method;
        let result = simulate(&config, &sanitized.lines);

        if result.totals.total_allocated_freight_local.is_zero()
            && !config.freight_total_local().is_zero()
        {
            warnings.push(format!("Freight left unallocated under '{method}' (zero basis)"));
        }

        outcomes.push(MethodOutcome {
            freight_allocation_method: method,
            lines: result
                .lines
                .iter()
                .map(|l| LineUnderMethod {
                    id: l.id.clone(),
                    allocated_freight_local: l.allocated_freight_local,
                    total_landed_cost_local: l.total_landed_cost_local,
                    unit_cost_with_tax_local: l.unit_cost_with_tax_local,
                })
                .collect(),
            total_landed_cost_local: result.totals.total_landed_cost_local,
            import_multiplier: result.totals.import_multiplier,
        });
    }

    let totals = outcomes.iter().map(|o| o.total_landed_cost_local);
    let max = totals.clone().max().unwrap_or_default();
    let min = totals.min().unwrap_or_default();

    let output = MethodComparisonOutput {
        fees_allocation_method: input.config.fees_allocation_method,
        outcomes,
        total_landed_cost_spread: max - min,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Freight allocation method comparison",
        &input.config,
        warnings,
        elapsed,
        output,
    ))
}
