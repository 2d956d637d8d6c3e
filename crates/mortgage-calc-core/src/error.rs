use thiserror::Error;

#[derive(Debug, Error)]
pub enum MortgageError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Unknown mortgage program: {0}")]
    UnknownProgram(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Lead rejected by endpoint: {0}")]
    LeadRejected(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl MortgageError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        MortgageError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for MortgageError {
    fn from(e: serde_json::Error) -> Self {
        MortgageError::SerializationError(e.to_string())
    }
}

impl From<toml::de::Error> for MortgageError {
    fn from(e: toml::de::Error) -> Self {
        MortgageError::Config(e.to_string())
    }
}

impl From<std::io::Error> for MortgageError {
    fn from(e: std::io::Error) -> Self {
        MortgageError::Config(e.to_string())
    }
}

#[cfg(feature = "lead")]
impl From<reqwest::Error> for MortgageError {
    fn from(e: reqwest::Error) -> Self {
        MortgageError::Http(e.to_string())
    }
}
