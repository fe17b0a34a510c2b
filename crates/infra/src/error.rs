use thiserror::Error;

use twotails_core::DomainError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-level failure.
///
/// Domain rule violations pass through unchanged as `Domain`; everything
/// else describes a relationship or uniqueness rule the store enforces.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A write referenced a record that does not exist.
    #[error("{entity} references missing {id}")]
    ReferenceIntegrity { entity: &'static str, id: String },

    /// A unique field already holds this value.
    #[error("{entity} with {field} {value:?} already exists")]
    Uniqueness {
        entity: &'static str,
        field: String,
        value: String,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Lock poisoning, connection and SQL failures.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn missing_reference(entity: &'static str, id: impl ToString) -> Self {
        Self::ReferenceIntegrity {
            entity,
            id: id.to_string(),
        }
    }

    pub fn duplicate(entity: &'static str, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Uniqueness {
            entity,
            field: field.into(),
            value: value.into(),
        }
    }
}
