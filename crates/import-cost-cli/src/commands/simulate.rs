use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use import_cost_core::engine::allocation::{self, AllocationInput};
use import_cost_core::engine::pipeline::{self, SimulationInput};
use import_cost_core::engine::{AllocationMethod, FreightCurrency, ImportConfig};

use crate::input;

/// Arguments for a landed-cost simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to a JSON or YAML simulation file (config + lines); overrides the flags below
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a CSV file of product lines (used with the config flags)
    #[arg(long)]
    pub lines: Option<String>,

    /// Source-to-local exchange rate (e.g. 5.0)
    #[arg(long)]
    pub exchange_rate: Option<Decimal>,

    /// Import duty rate as a fraction (e.g. 0.60 for 60%)
    #[arg(long)]
    pub duty_rate: Option<Decimal>,

    /// ICMS rate as a fraction (e.g. 0.17 for 17%)
    #[arg(long)]
    pub icms_rate: Option<Decimal>,

    /// Total international freight
    #[arg(long, default_value = "0")]
    pub freight_total: Decimal,

    /// Currency the freight total is quoted in: source or local
    #[arg(long, default_value = "source")]
    pub freight_currency: FreightCurrency,

    /// Other customs fees, in local currency
    #[arg(long, default_value = "0")]
    pub other_fees: Decimal,

    /// Freight allocation basis: weight, fob_value or quantity
    #[arg(long, default_value = "weight")]
    pub freight_method: AllocationMethod,

    /// Other-fees allocation basis: weight, fob_value or quantity
    #[arg(long, default_value = "weight")]
    pub fees_method: AllocationMethod,
}

/// Arguments for allocating one shared cost
#[derive(Args)]
pub struct AllocateArgs {
    /// Path to a JSON or YAML allocation file (lines + total + method)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a CSV file of product lines
    #[arg(long)]
    pub lines: Option<String>,

    /// Amount to allocate
    #[arg(long)]
    pub total: Option<Decimal>,

    /// Allocation basis: weight, fob_value or quantity
    #[arg(long, default_value = "weight")]
    pub method: AllocationMethod,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input: SimulationInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(ref path) = args.lines {
        SimulationInput {
            config: config_from_flags(&args)?,
            lines: input::file::read_lines_csv(path)?,
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file>, --lines <file.csv> or stdin required for simulate".into());
    };
    let result = pipeline::run_simulation(&sim_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_allocate(args: AllocateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let alloc_input: AllocationInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(ref path) = args.lines {
        AllocationInput {
            lines: input::file::read_lines_csv(path)?,
            total_to_allocate: args
                .total
                .ok_or("--total is required with --lines (or provide --input)")?,
            method: args.method,
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file>, --lines <file.csv> or stdin required for allocate".into());
    };
    let result = allocation::calculate_allocation(&alloc_input)?;
    Ok(serde_json::to_value(result)?)
}

fn config_from_flags(args: &SimulateArgs) -> Result<ImportConfig, Box<dyn std::error::Error>> {
    Ok(ImportConfig {
        exchange_rate: args
            .exchange_rate
            .ok_or("--exchange-rate is required (or provide --input)")?,
        duty_rate: args.duty_rate.unwrap_or(dec!(0)),
        icms_rate: args.icms_rate.unwrap_or(dec!(0)),
        freight_total: args.freight_total,
        freight_currency: args.freight_currency,
        other_fees_total: args.other_fees,
        freight_allocation_method: args.freight_method,
        fees_allocation_method: args.fees_method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> SimulateArgs {
        SimulateArgs {
            input: None,
            lines: Some("lines.csv".into()),
            exchange_rate: Some(dec!(5.0)),
            duty_rate: Some(dec!(0.6)),
            icms_rate: None,
            freight_total: dec!(1000),
            freight_currency: FreightCurrency::Local,
            other_fees: dec!(0),
            freight_method: AllocationMethod::Weight,
            fees_method: AllocationMethod::Quantity,
        }
    }

    #[test]
    fn test_config_from_flags() {
        let config = config_from_flags(&flags()).unwrap();
        assert_eq!(config.exchange_rate, dec!(5.0));
        assert_eq!(config.icms_rate, dec!(0));
        assert_eq!(config.fees_allocation_method, AllocationMethod::Quantity);
    }

    #[test]
    fn test_exchange_rate_flag_required() {
        let mut args = flags();
        args.exchange_rate = None;
        assert!(config_from_flags(&args).is_err());
    }
}
