use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropertyRiskError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Simulation cancelled after {completed} of {total} trials")]
    Cancelled { completed: u32, total: u32 },

    #[error("Unrecoverable failure: {0}")]
    Unrecoverable(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PropertyRiskError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        PropertyRiskError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PropertyRiskError {
    fn from(e: serde_json::Error) -> Self {
        PropertyRiskError::SerializationError(e.to_string())
    }
}
