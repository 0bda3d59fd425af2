//! Application-wide error types.

use thiserror::Error;

/// Application error types.
///
/// Every client-side fault maps to 400; only storage faults
/// surface as 500.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input (path parameter, body shape, color, date).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request is well-formed but a business rule refuses it.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Duplicate entry.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::NotFound(_) | Self::Rejected(_) | Self::Conflict(_) => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Rejected(_) => "REJECTED",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the bare message without the variant prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m)
            | Self::NotFound(m)
            | Self::Rejected(m)
            | Self::Conflict(m)
            | Self::Database(m) => m,
        }
    }

    /// Whether this error is the server's fault.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}
