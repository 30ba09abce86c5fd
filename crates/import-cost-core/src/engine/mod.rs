//! The landed-cost engine.
//!
//! Data flows one way: configuration and raw lines → [`allocation`] →
//! [`taxes`] → [`aggregation`], composed by [`pipeline`]. Every function here
//! is pure; the engine keeps no state between calls.

pub mod aggregation;
pub mod allocation;
pub mod config;
pub mod intake;
pub mod line;
pub mod pipeline;
pub mod taxes;

pub use config::{AllocationMethod, FreightCurrency, ImportConfig};
pub use line::{ProductLineInput, ProductLineResult};
pub use pipeline::{run_simulation, simulate, SimulationInput, SimulationResult};
