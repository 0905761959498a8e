//! Infrastructure-specific error types

use hb_core::errors::DomainError;

#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document encoding or decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Persistence {
            message: err.to_string(),
        }
    }
}
