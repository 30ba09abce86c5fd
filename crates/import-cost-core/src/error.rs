use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportCostError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Duplicate product line id: {0}")]
    DuplicateLineId(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ImportCostError {
    fn from(e: serde_json::Error) -> Self {
        ImportCostError::SerializationError(e.to_string())
    }
}
