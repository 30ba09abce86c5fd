use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::engine::aggregation::SimulationTotals;
use crate::engine::config::ImportConfig;
use crate::engine::intake::sanitize_lines;
use crate::engine::line::ProductLineInput;
use crate::engine::pipeline::{
    simulate, validate_simulation_input, validate_value_range, SimulationInput,
};
use crate::error::ImportCostError;
use crate::types::*;
use crate::ImportCostResult;

/// Upper bound on evaluated cells per grid.
const MAX_GRID_CELLS: usize = 10_000;

/// Configuration value a sensitivity axis sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportParameter {
    ExchangeRate,
    DutyRate,
    IcmsRate,
    FreightTotal,
    OtherFeesTotal,
}

impl ImportParameter {
    fn read(&self, config: &ImportConfig) -> Decimal {
        match self {
            ImportParameter::ExchangeRate => config.exchange_rate,
            ImportParameter::DutyRate => config.duty_rate,
            ImportParameter::IcmsRate => config.icms_rate,
            ImportParameter::FreightTotal => config.freight_total,
            ImportParameter::OtherFeesTotal => config.other_fees_total,
        }
    }

    fn write(&self, config: &mut ImportConfig, value: Decimal) {
        match self {
            ImportParameter::ExchangeRate => config.exchange_rate = value,
            ImportParameter::DutyRate => config.duty_rate = value,
            ImportParameter::IcmsRate => config.icms_rate = value,
            ImportParameter::FreightTotal => config.freight_total = value,
            ImportParameter::OtherFeesTotal => config.other_fees_total = value,
        }
    }
}

impl fmt::Display for ImportParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportParameter::ExchangeRate => "exchange_rate",
            ImportParameter::DutyRate => "duty_rate",
            ImportParameter::IcmsRate => "icms_rate",
            ImportParameter::FreightTotal => "freight_total",
            ImportParameter::OtherFeesTotal => "other_fees_total",
        };
        f.write_str(name)
    }
}

/// Simulation-wide figure recorded in each grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMetric {
    #[default]
    TotalLandedCostLocal,
    ImportMultiplier,
    TotalDutyLocal,
    TotalIcmsLocal,
    TotalCostPlusFreightLocal,
}

impl OutputMetric {
    fn read(&self, totals: &SimulationTotals) -> Decimal {
        match self {
            OutputMetric::TotalLandedCostLocal => totals.total_landed_cost_local,
            OutputMetric::ImportMultiplier => totals.import_multiplier,
            OutputMetric::TotalDutyLocal => totals.total_duty_local,
            OutputMetric::TotalIcmsLocal => totals.total_icms_local,
            OutputMetric::TotalCostPlusFreightLocal => totals.total_cost_plus_freight_local,
        }
    }
}

/// One swept axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepVariable {
    pub parameter: ImportParameter,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

/// Input for 2-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSensitivityInput {
    /// Base case simulation
    pub base: SimulationInput,
    pub variable_1: SweepVariable,
    pub variable_2: SweepVariable,
    #[serde(default)]
    pub output_metric: OutputMetric,
}

/// Output of 2-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSensitivityOutput {
    pub variable_1: ImportParameter,
    pub variable_2: ImportParameter,
    pub variable_1_values: Vec<Decimal>,
    pub variable_2_values: Vec<Decimal>,
    pub output_metric: OutputMetric,
    /// Matrix[i][j] = metric when variable_1 = variable_1_values[i], variable_2 = variable_2_values[j]
    pub matrix: Vec<Vec<Decimal>>,
    /// Metric of the unmodified base simulation
    pub base_case_value: Decimal,
    /// Grid cell closest to the base configuration (row, col)
    pub base_case_position: (usize, usize),
}

/// Generate the sweep values for a variable from min to max with step.
fn generate_sweep_values(var: &SweepVariable) -> ImportCostResult<Vec<Decimal>> {
    if var.step <= Decimal::ZERO {
        return Err(ImportCostError::InvalidInput {
            field: format!("variable:{}", var.parameter),
            reason: "Step must be positive".into(),
        });
    }
    if var.min > var.max {
        return Err(ImportCostError::InvalidInput {
            field: format!("variable:{}", var.parameter),
            reason: "Min must be <= max".into(),
        });
    }
    if var.min < Decimal::ZERO {
        return Err(ImportCostError::InvalidInput {
            field: format!("variable:{}", var.parameter),
            reason: "Swept values must be non-negative".into(),
        });
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        if values.len() > MAX_GRID_CELLS {
            return Err(ImportCostError::InvalidInput {
                field: format!("variable:{}", var.parameter),
                reason: format!("Sweep exceeds {MAX_GRID_CELLS} values; increase the step"),
            });
        }
        match current.checked_add(var.step) {
            Some(next) => current = next,
            None => break,
        }
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    Ok(values)
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Evaluate the chosen metric over a 2-way grid of configuration values.
///
/// Every cell is a full recomputation of the base simulation with the two
/// parameters overridden.
pub fn run_import_sensitivity(
    input: &ImportSensitivityInput,
) -> ImportCostResult<ComputationOutput<ImportSensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.variable_1.parameter == input.variable_2.parameter {
        return Err(ImportCostError::InvalidInput {
            field: "variable_2".into(),
            reason: format!(
                "Both axes sweep {}; choose two different parameters",
                input.variable_1.parameter
            ),
        });
    }

    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = generate_sweep_values(&input.variable_2)?;
    let cells = v1_values.len() * v2_values.len();
    if cells > MAX_GRID_CELLS {
        return Err(ImportCostError::InvalidInput {
            field: "variable_1 x variable_2".into(),
            reason: format!("Grid of {cells} cells exceeds {MAX_GRID_CELLS}"),
        });
    }

    let sanitized = sanitize_lines(input.base.lines.clone())?;
    if sanitized.clamped_values > 0 {
        warnings.push(format!(
            "{} negative line value(s) clamped to zero",
            sanitized.clamped_values
        ));
    }
    let lines: &[ProductLineInput] = &sanitized.lines;
    let base_config = &input.base.config;
    validate_simulation_input(base_config, lines)?;

    let matrix = v1_values
        .iter()
        .map(|v1| {
            v2_values
                .iter()
                .map(|v2| {
                    let mut config = base_config.clone();
                    input.variable_1.parameter.write(&mut config, *v1);
                    input.variable_2.parameter.write(&mut config, *v2);
                    validate_value_range(&config, lines)?;
                    Ok(input.output_metric.read(&simulate(&config, lines).totals))
                })
                .collect::<ImportCostResult<Vec<Decimal>>>()
        })
        .collect::<ImportCostResult<Vec<Vec<Decimal>>>>()?;

    let base_case_value = input.output_metric.read(&simulate(base_config, lines).totals);
    let base_row = closest_index(&v1_values, input.variable_1.parameter.read(base_config));
    let base_col = closest_index(&v2_values, input.variable_2.parameter.read(base_config));

    let base_1 = input.variable_1.parameter.read(base_config);
    let base_2 = input.variable_2.parameter.read(base_config);
    if base_1 < input.variable_1.min
        || base_1 > input.variable_1.max
        || base_2 < input.variable_2.min
        || base_2 > input.variable_2.max
    {
        warnings.push("Base configuration lies outside the swept range".into());
    }

    tracing::debug!(
        cells,
        variable_1 = %input.variable_1.parameter,
        variable_2 = %input.variable_2.parameter,
        "sensitivity grid evaluated"
    );

    let output = ImportSensitivityOutput {
        variable_1: input.variable_1.parameter,
        variable_2: input.variable_2.parameter,
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        output_metric: input.output_metric,
        matrix,
        base_case_value,
        base_case_position: (base_row, base_col),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "2-Way Import Sensitivity Analysis",
        &serde_json::json!({
            "variable_1": input.variable_1.parameter,
            "variable_2": input.variable_2.parameter,
            "output_metric": input.output_metric,
            "line_count": lines.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{AllocationMethod, FreightCurrency};
    use crate::engine::intake::ProductLineDraft;
    use rust_decimal_macros::dec;

    fn base() -> SimulationInput {
        SimulationInput {
            config: ImportConfig {
                exchange_rate: dec!(5.0),
                duty_rate: dec!(0.60),
                icms_rate: dec!(0.17),
                freight_total: dec!(1000),
                freight_currency: FreightCurrency::Local,
                other_fees_total: dec!(150),
                freight_allocation_method: AllocationMethod::Weight,
                fees_allocation_method: AllocationMethod::FobValue,
            },
            lines: vec![
                ProductLineDraft {
                    id: "A".into(),
                    description: None,
                    ncm_code: None,
                    quantity: dec!(10),
                    unit_price_source: dec!(10),
                    unit_weight_kg: dec!(2),
                },
                ProductLineDraft {
                    id: "B".into(),
                    description: None,
                    ncm_code: None,
                    quantity: dec!(5),
                    unit_price_source: dec!(20),
                    unit_weight_kg: dec!(8),
                },
            ],
        }
    }

    fn sample_input() -> ImportSensitivityInput {
        ImportSensitivityInput {
            base: base(),
            variable_1: SweepVariable {
                parameter: ImportParameter::ExchangeRate,
                min: dec!(4.0),
                max: dec!(6.0),
                step: dec!(0.5),
            },
            variable_2: SweepVariable {
                parameter: ImportParameter::DutyRate,
                min: dec!(0.2),
                max: dec!(0.6),
                step: dec!(0.2),
            },
            output_metric: OutputMetric::TotalLandedCostLocal,
        }
    }

    #[test]
    fn test_grid_dimensions() {
        let out = run_import_sensitivity(&sample_input()).unwrap().result;
        // 4.0, 4.5, 5.0, 5.5, 6.0
        assert_eq!(out.variable_1_values.len(), 5);
        // 0.2, 0.4, 0.6
        assert_eq!(out.variable_2_values.len(), 3);
        assert_eq!(out.matrix.len(), 5);
        assert_eq!(out.matrix[0].len(), 3);
    }

    #[test]
    fn test_landed_cost_rises_with_both_axes() {
        let out = run_import_sensitivity(&sample_input()).unwrap().result;
        for i in 0..out.matrix.len() - 1 {
            assert!(out.matrix[i][0] < out.matrix[i + 1][0]);
        }
        for j in 0..out.matrix[0].len() - 1 {
            assert!(out.matrix[0][j] < out.matrix[0][j + 1]);
        }
    }

    #[test]
    fn test_base_case_matches_grid_cell() {
        let out = run_import_sensitivity(&sample_input()).unwrap().result;
        // exchange 5.0 => row 2, duty 0.6 => col 2
        assert_eq!(out.base_case_position, (2, 2));
        assert_eq!(out.matrix[2][2], out.base_case_value);
    }

    #[test]
    fn test_base_outside_range_warns() {
        let mut input = sample_input();
        input.variable_1.min = dec!(6.0);
        input.variable_1.max = dec!(7.0);
        let out = run_import_sensitivity(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("outside")));
    }

    #[test]
    fn test_sweep_with_non_exact_step() {
        let var = SweepVariable {
            parameter: ImportParameter::IcmsRate,
            min: dec!(0),
            max: dec!(1),
            step: dec!(0.3),
        };
        let vals = generate_sweep_values(&var).unwrap();
        // 0, 0.3, 0.6, 0.9, 1.0 (max appended)
        assert_eq!(vals.len(), 5);
        assert_eq!(*vals.last().unwrap(), dec!(1));
    }

    #[test]
    fn test_icms_axis_leaves_duty_unchanged() {
        let mut input = sample_input();
        input.variable_1 = SweepVariable {
            parameter: ImportParameter::IcmsRate,
            min: dec!(0.07),
            max: dec!(0.19),
            step: dec!(0.06),
        };
        input.output_metric = OutputMetric::TotalDutyLocal;
        let out = run_import_sensitivity(&input).unwrap().result;
        for j in 0..out.variable_2_values.len() {
            assert_eq!(out.matrix[0][j], out.matrix[1][j]);
            assert_eq!(out.matrix[1][j], out.matrix[2][j]);
        }
    }

    #[test]
    fn test_reject_same_parameter_twice() {
        let mut input = sample_input();
        input.variable_2.parameter = ImportParameter::ExchangeRate;
        assert!(run_import_sensitivity(&input).is_err());
    }

    #[test]
    fn test_reject_zero_step() {
        let mut input = sample_input();
        input.variable_1.step = Decimal::ZERO;
        assert!(run_import_sensitivity(&input).is_err());
    }

    #[test]
    fn test_reject_negative_sweep() {
        let mut input = sample_input();
        input.variable_2.min = dec!(-0.1);
        assert!(run_import_sensitivity(&input).is_err());
    }

    #[test]
    fn test_reject_oversized_grid() {
        let mut input = sample_input();
        input.variable_1.step = dec!(0.0001);
        assert!(run_import_sensitivity(&input).is_err());
    }

    #[test]
    fn test_reject_negative_base_rate() {
        let mut input = sample_input();
        input.base.config.icms_rate = dec!(-0.1);
        match run_import_sensitivity(&input) {
            Err(ImportCostError::InvalidInput { field, .. }) => assert_eq!(field, "icms_rate"),
            other => panic!("expected invalid icms_rate, got {other:?}"),
        }
    }

    #[test]
    fn test_reject_duplicate_line_ids() {
        let mut input = sample_input();
        input.base.lines[1].id = "A".into();
        assert!(matches!(
            run_import_sensitivity(&input),
            Err(ImportCostError::DuplicateLineId(id)) if id == "A"
        ));
    }

    #[test]
    fn test_reject_swept_value_overflowing_decimal() {
        let mut input = sample_input();
        input.variable_1.min = dec!(1000000000000000000000000000);
        input.variable_1.max = dec!(1000000000000000000000000000);
        input.variable_1.step = dec!(1);
        assert!(matches!(
            run_import_sensitivity(&input),
            Err(ImportCostError::InvalidInput { reason, .. }) if reason == "value out of range"
        ));
    }

    #[test]
    fn test_sweep_stops_at_decimal_max() {
        let var = SweepVariable {
            parameter: ImportParameter::FreightTotal,
            min: Decimal::MAX,
            max: Decimal::MAX,
            step: dec!(1),
        };
        assert_eq!(generate_sweep_values(&var).unwrap(), vec![Decimal::MAX]);
    }
}
