pub mod engine;
pub mod error;
pub mod numeric;
pub mod types;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use error::ImportCostError;
pub use types::*;

/// Standard result type for all import-cost operations
pub type ImportCostResult<T> = Result<T, ImportCostError>;
