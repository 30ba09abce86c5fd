//! Landed-cost simulation pipeline.
//!
//! Fixed order: allocate freight → allocate other fees → taxes per line →
//! aggregate each line → aggregate the simulation. [`simulate`] is the pure
//! core; [`run_simulation`] adds boundary sanitisation, structural validation
//! and the computation envelope.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

use crate::engine::aggregation::{aggregate_line, aggregate_simulation, SimulationTotals};
use crate::engine::allocation::{allocate, allocation_basis};
use crate::engine::config::{AllocationMethod, FreightCurrency, ImportConfig};
use crate::engine::intake::{sanitize_lines, ProductLineDraft};
use crate::engine::line::{ProductLineInput, ProductLineResult};
use crate::engine::taxes::compute_taxes;
use crate::error::ImportCostError;
use crate::numeric::to_local;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::ImportCostResult;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// A simulation request as received from a front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInput {
    pub config: ImportConfig,
    pub lines: Vec<ProductLineDraft>,
}

/// Per-line results (same order and ids as the input) plus totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub lines: Vec<ProductLineResult>,
    pub totals: SimulationTotals,
}

// ---------------------------------------------------------------------------
// Pure pipeline
// ---------------------------------------------------------------------------

/// Run the full landed-cost computation.
///
/// Preconditions (asserted in debug builds only): every numeric field of
/// `config` and `lines` is non-negative.
pub fn simulate(config: &ImportConfig, lines: &[ProductLineInput]) -> SimulationResult {
    debug_assert!(config.is_non_negative(), "configuration values must be non-negative");
    debug_assert!(
        lines
            .iter()
            .all(|l| l.unit_price_source >= Decimal::ZERO && l.unit_weight_kg >= Decimal::ZERO),
        "line values must be non-negative"
    );

    let freight = allocate(
        lines,
        config.freight_total_local(),
        config.freight_allocation_method,
    );
    let fees = allocate(lines, config.other_fees_total, config.fees_allocation_method);

    let results: Vec<ProductLineResult> = lines
        .iter()
        .zip(freight.iter().zip(fees.iter()))
        .map(|(line, (freight_share, fee_share))| {
            let own_cost_local = to_local(line.fob_value_source(), config.exchange_rate);
            let taxes = compute_taxes(
                own_cost_local,
                freight_share.amount,
                fee_share.amount,
                config.duty_rate,
                config.icms_rate,
            );
            aggregate_line(
                line,
                config.exchange_rate,
                freight_share.amount,
                fee_share.amount,
                &taxes,
            )
        })
        .collect();

    let totals = aggregate_simulation(&results, config.exchange_rate);

    SimulationResult {
        lines: results,
        totals,
    }
}

// ---------------------------------------------------------------------------
// Checked entry point
// ---------------------------------------------------------------------------

/// Sanitise, validate and simulate, returning the standard envelope.
pub fn run_simulation(
    input: &SimulationInput,
) -> ImportCostResult<ComputationOutput<SimulationResult>> {
    let start = Instant::now();

    let sanitized = sanitize_lines(input.lines.clone())?;
    validate_simulation_input(&input.config, &sanitized.lines)?;

    let mut warnings = collect_warnings(&input.config, &sanitized.lines);
    if sanitized.clamped_values > 0 {
        warnings.push(format!(
            "{} negative line value(s) clamped to zero",
            sanitized.clamped_values
        ));
    }

    let result = simulate(&input.config, &sanitized.lines);

    let elapsed = start.elapsed().as_micros() as u64;
    tracing::debug!(
        lines = result.lines.len(),
        freight_method = %input.config.freight_allocation_method,
        fees_method = %input.config.fees_allocation_method,
        elapsed_us = elapsed,
        "import simulation complete"
    );

    Ok(with_metadata(
        "Landed cost: proportional freight/fee allocation, duty on CFR, ICMS on duty-inclusive base",
        &input.config,
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Structural preconditions of [`simulate`]: non-negative configuration,
/// unique non-blank ids, and every intermediate amount within `Decimal` range.
pub(crate) fn validate_simulation_input(
    config: &ImportConfig,
    lines: &[ProductLineInput],
) -> ImportCostResult<()> {
    validate_config(config)?;
    validate_line_ids(lines)?;
    validate_value_range(config, lines)
}

/// Reject inputs whose landed-cost arithmetic would overflow `Decimal`.
///
/// Each line is bounded as if it carried the whole freight and fee totals
/// (shares never exceed 1), so passing here guarantees `simulate` cannot
/// overflow.
pub(crate) fn validate_value_range(
    config: &ImportConfig,
    lines: &[ProductLineInput],
) -> ImportCostResult<()> {
    let out_of_range = |field: String| ImportCostError::InvalidInput {
        field,
        reason: "value out of range".into(),
    };
    let config_out_of_range = || out_of_range("config".into());

    let freight_local = match config.freight_currency {
        FreightCurrency::Source => config
            .freight_total
            .checked_mul(config.exchange_rate)
            .ok_or_else(config_out_of_range)?,
        FreightCurrency::Local => config.freight_total,
    };

    let mut weight_total = Decimal::ZERO;
    let mut fob_total = Decimal::ZERO;
    let mut landed_total = Decimal::ZERO;
    for line in lines {
        let line_out_of_range = || out_of_range(format!("lines[{}]", line.id));
        let quantity = Decimal::from(line.quantity);
        let weight = line
            .unit_weight_kg
            .checked_mul(quantity)
            .ok_or_else(line_out_of_range)?;
        let fob = line
            .unit_price_source
            .checked_mul(quantity)
            .ok_or_else(line_out_of_range)?;
        let landed =
            landed_cost_bound(config, fob, freight_local).ok_or_else(line_out_of_range)?;

        weight_total = weight_total.checked_add(weight).ok_or_else(line_out_of_range)?;
        fob_total = fob_total.checked_add(fob).ok_or_else(line_out_of_range)?;
        landed_total = landed_total.checked_add(landed).ok_or_else(line_out_of_range)?;
    }

    if !weight_total.is_zero() {
        fob_total
            .checked_div(weight_total)
            .ok_or_else(config_out_of_range)?;
    }
    let fob_local = fob_total
        .checked_mul(config.exchange_rate)
        .ok_or_else(config_out_of_range)?;
    if !fob_local.is_zero() {
        landed_total
            .checked_div(fob_local)
            .ok_or_else(config_out_of_range)?;
    }
    Ok(())
}

/// Upper bound of one line's landed cost, or None on overflow.
fn landed_cost_bound(
    config: &ImportConfig,
    fob_source: Money,
    freight_local: Money,
) -> Option<Money> {
    let cost_plus_freight = fob_source
        .checked_mul(config.exchange_rate)?
        .checked_add(freight_local)?;
    let duty = cost_plus_freight.checked_mul(config.duty_rate)?;
    let icms_base = cost_plus_freight
        .checked_add(duty)?
        .checked_add(config.other_fees_total)?;
    let icms = icms_base.checked_mul(config.icms_rate)?;
    icms_base.checked_add(icms)
}

fn validate_config(config: &ImportConfig) -> ImportCostResult<()> {
    let amounts: [(&str, Money); 5] = [
        ("exchange_rate", config.exchange_rate),
        ("duty_rate", config.duty_rate),
        ("icms_rate", config.icms_rate),
        ("freight_total", config.freight_total),
        ("other_fees_total", config.other_fees_total),
    ];
    for (field, value) in amounts {
        if value < Decimal::ZERO {
            return Err(ImportCostError::InvalidInput {
                field: field.into(),
                reason: format!("Must be non-negative, got {value}"),
            });
        }
    }
    Ok(())
}

fn validate_line_ids(lines: &[ProductLineInput]) -> ImportCostResult<()> {
    let mut seen = HashSet::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        if line.id.trim().is_empty() {
            return Err(ImportCostError::InvalidInput {
                field: format!("lines[{index}].id"),
                reason: "Product line id cannot be empty".into(),
            });
        }
        if !seen.insert(line.id.as_str()) {
            return Err(ImportCostError::DuplicateLineId(line.id.clone()));
        }
    }
    Ok(())
}

fn collect_warnings(config: &ImportConfig, lines: &[ProductLineInput]) -> Vec<String> {
    let mut warnings = Vec::new();

    let rates: [(&str, Rate); 2] = [("Duty", config.duty_rate), ("ICMS", config.icms_rate)];
    for (name, rate) in rates {
        if rate > Decimal::ONE {
            warnings.push(format!(
                "{name} rate {rate} exceeds 100%; applied as given (rates are fractions, 0.17 = 17%)"
            ));
        }
    }

    if config.exchange_rate.is_zero() {
        warnings.push("Exchange rate is zero; all converted local-currency values are zero".into());
    }

    let shared_costs: [(&str, Money, AllocationMethod); 2] = [
        (
            "Freight",
            config.freight_total_local(),
            config.freight_allocation_method,
        ),
        (
            "Other fees",
            config.other_fees_total,
            config.fees_allocation_method,
        ),
    ];
    for (name, total, method) in shared_costs {
        if total.is_zero() || lines.is_empty() {
            continue;
        }
        let basis_total: Decimal = lines.iter().map(|l| allocation_basis(l, method)).sum();
        if basis_total.is_zero() {
            warnings.push(format!(
                "{name} of {total} not allocated: every line has zero {method}"
            ));
        }
    }

    let zero_quantity: Vec<&str> = lines
        .iter()
        .filter(|l| l.quantity == 0)
        .map(|l| l.id.as_str())
        .collect();
    if !zero_quantity.is_empty() {
        warnings.push(format!(
            "Zero quantity on line(s) {}; unit costs reported as 0",
            zero_quantity.join(", ")
        ));
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
