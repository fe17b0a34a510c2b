//! Domain error model.

use thiserror::Error;

/// Result of a record-level operation.
pub type DomainResult<T> = Result<T, DomainError>;

/// Failures a record can report about itself. Reference integrity and
/// uniqueness need a view of other records and live in the store's error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (negative quantity, unknown status code, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A structural rule was broken, such as a category becoming its own ancestor.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier string did not parse as a UUID.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A command targeted a record that was never created.
    #[error("not found")]
    NotFound,

    /// Stale version, or removal of a record the system relies on.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A category chain could not be resolved (no category, or a dangling parent).
    #[error("category missing: {0}")]
    CategoryMissing(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn category_missing(msg: impl Into<String>) -> Self {
        Self::CategoryMissing(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
