//! Application-wide error types.
//!
//! Every fault path returns immediately after signaling; handlers branch on
//! `Result` values rather than continuing past an error.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed or no credential supplied.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Identity or resource lookup miss.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate relationship action (already linked or already pending).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store unavailable or write conflict; retryable.
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Dual-write asymmetry detected in the relationship graph.
    ///
    /// Triggers reconciliation; surfaced only when the repair itself fails.
    #[error("Partial update detected: {0}")]
    PartialUpdate(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::Persistence(_) | Self::PartialUpdate(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Persistence(_) => "PERSISTENCE_FAILURE",
            Self::PartialUpdate(_) => "PARTIAL_UPDATE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether a client may retry the request unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::PartialUpdate(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Unauthorized(String::new()).status_code(), 401);
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
        assert_eq!(AppError::Conflict(String::new()).status_code(), 409);
        assert_eq!(AppError::Persistence(String::new()).status_code(), 500);
        assert_eq!(AppError::PartialUpdate(String::new()).status_code(), 500);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Unauthorized(String::new()).error_code(),
            "UNAUTHORIZED"
        );
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(AppError::Conflict(String::new()).error_code(), "CONFLICT");
        assert_eq!(
            AppError::Persistence(String::new()).error_code(),
            "PERSISTENCE_FAILURE"
        );
        assert_eq!(
            AppError::PartialUpdate(String::new()).error_code(),
            "PARTIAL_UPDATE"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(AppError::Persistence(String::new()).is_retryable());
        assert!(AppError::PartialUpdate(String::new()).is_retryable());
        assert!(!AppError::Validation(String::new()).is_retryable());
        assert!(!AppError::Unauthorized(String::new()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::NotFound("user".into()).to_string(),
            "Not found: user"
        );
        assert_eq!(
            AppError::PartialUpdate("missing reciprocal link".into()).to_string(),
            "Partial update detected: missing reciprocal link"
        );
    }
}
