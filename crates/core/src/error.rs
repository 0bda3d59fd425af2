//! Validation errors raised before any storage access.

use pocketbook_shared::AppError;
use thiserror::Error;

/// Largest accepted list limit; row limits are bound as signed 64-bit.
pub const MAX_LIST_LIMIT: u64 = i64::MAX.unsigned_abs();

/// Checks a caller-supplied list limit.
pub const fn check_list_limit(limit: u64) -> Result<u64, ValidationError> {
    if limit > MAX_LIST_LIMIT {
        Err(ValidationError::InvalidLimit(limit))
    } else {
        Ok(limit)
    }
}

/// Input that failed a format or range rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Year is not a four-digit year in 1900-2099.
    #[error("Invalid year '{0}': expected (19|20)YY")]
    InvalidYear(String),

    /// Month is not 01-12.
    #[error("Invalid month '{0}': expected 01-12")]
    InvalidMonth(String),

    /// Date could not be parsed as a calendar date.
    #[error("Invalid date '{0}': expected YYYY-MM-DD with an optional time part")]
    InvalidDate(String),

    /// Color is not a CSS-like color value.
    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    /// A required text field was blank.
    #[error("Field '{0}' must not be empty")]
    Blank(&'static str),

    /// A total would leave the representable decimal range.
    #[error("Amount out of range")]
    AmountOutOfRange,

    /// List limit larger than the storage layer accepts.
    #[error("Invalid limit '{0}': expected at most {MAX_LIST_LIMIT}")]
    InvalidLimit(u64),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
