//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{BookingError, ValidationError};

use hb_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Business rule violation: {message}")]
    BusinessRule { message: String },

    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("Persistence failure: {message}")]
    Persistence { message: String },

    #[error("Operation requires connectivity: {operation}")]
    Offline { operation: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

impl DomainError {
    /// Not-found error for a resource kind and identifier
    pub fn not_found(resource: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Persistence error carrying the underlying failure description
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Error for reads and writes that cannot be served without connectivity
    pub fn offline(operation: impl Into<String>) -> Self {
        Self::Offline {
            operation: operation.into(),
        }
    }

    /// Whether this error reports a missing entity
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this error came from the durability layer
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }

    /// Whether retrying the same operation later can succeed.
    /// Guard, validation and not-found failures are permanent.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Persistence { .. } | Self::Offline { .. } | Self::Internal { .. }
        )
    }

    /// Stable error code for callers that report failures to users
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } | Self::ValidationErr(_) => error_codes::VALIDATION_ERROR,
            Self::BusinessRule { .. } => error_codes::BUSINESS_RULE,
            Self::NotFound { .. } => error_codes::NOT_FOUND,
            Self::Persistence { .. } => error_codes::PERSISTENCE_ERROR,
            Self::Offline { .. } => error_codes::OFFLINE,
            Self::Internal { .. } => error_codes::INTERNAL_ERROR,
            Self::Booking(_) => error_codes::BOOKING_REJECTED,
        }
    }
}

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        let response = ErrorResponse::new(self.code(), self.to_string());
        match self {
            Self::NotFound { resource, id } => response
                .add_detail("resource", resource)
                .add_detail("id", id),
            _ => response,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_and_response() {
        let error = DomainError::not_found("Booking", "b-42");
        assert!(error.is_not_found());
        assert_eq!(error.to_string(), "Booking not found: b-42");

        let response = error.to_error_response();
        assert_eq!(response.error, "NOT_FOUND");
        assert_eq!(response.details.unwrap()["id"], "b-42");
    }

    #[test]
    fn test_booking_error_bridges_transparently() {
        let error: DomainError = BookingError::RoomUnavailable.into();
        assert_eq!(error.to_string(), "Room is not available");
        assert_eq!(error.code(), "BOOKING_REJECTED");
    }

    #[test]
    fn test_retryable_errors() {
        assert!(DomainError::persistence("disk full").is_retryable());
        assert!(!DomainError::from(BookingError::RoomUnavailable).is_retryable());
        assert!(!DomainError::not_found("Room", "r-1").is_retryable());
    }

    #[test]
    fn test_validation_error_code() {
        let error: DomainError = ValidationError::InvalidEmail.into();
        assert_eq!(error.code(), "VALIDATION_ERROR");
    }
}
