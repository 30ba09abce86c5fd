use napi::Result as NapiResult;
use napi_derive::napi;

use import_cost_core::engine::allocation::{self, AllocationInput};
use import_cost_core::engine::pipeline::{self, SimulationInput};
use import_cost_core::scenarios::method_comparison;
use import_cost_core::scenarios::sensitivity::{self, ImportSensitivityInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Full landed-cost simulation. Called by the simulation form on every
/// input change; the caller decides when to debounce.
#[napi]
pub fn simulate_import(input_json: String) -> NapiResult<String> {
    let input: SimulationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = pipeline::run_simulation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn allocate_cost(input_json: String) -> NapiResult<String> {
    let input: AllocationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = allocation::calculate_allocation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn import_sensitivity(input_json: String) -> NapiResult<String> {
    let input: ImportSensitivityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = sensitivity::run_import_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_allocation_methods(input_json: String) -> NapiResult<String> {
    let input: SimulationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        method_comparison::compare_allocation_methods(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
