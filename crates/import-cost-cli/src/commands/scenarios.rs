use clap::Args;
use serde_json::Value;

use import_cost_core::engine::pipeline::SimulationInput;
use import_cost_core::scenarios::method_comparison;
use import_cost_core::scenarios::sensitivity::{self, ImportSensitivityInput};

use crate::input;

/// Arguments for sensitivity analysis
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to a JSON or YAML file: base simulation, two sweep variables, output metric
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for allocation method comparison
#[derive(Args)]
pub struct CompareMethodsArgs {
    /// Path to a JSON or YAML simulation file (config + lines)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sens_input: ImportSensitivityInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file> or stdin required for sensitivity analysis".into());
    };
    let result = sensitivity::run_import_sensitivity(&sens_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare_methods(args: CompareMethodsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input: SimulationInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file> or stdin required for method comparison".into());
    };
    let result = method_comparison::compare_allocation_methods(&sim_input)?;
    Ok(serde_json::to_value(result)?)
}
