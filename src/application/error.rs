use thiserror::Error;

use crate::domain::JournalValidationError;

/// Single error type returned by every service operation.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{kind} already exists: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Modification failed: {0:#}")]
    ModificationFailed(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn duplicate(kind: &'static str, id: impl Into<String>) -> Self {
        ServiceError::DuplicateId {
            kind,
            id: id.into(),
        }
    }

    /// Validation failures are caused by the input and can be fixed by the user.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ServiceError::Validation(_) | ServiceError::DuplicateId { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

impl From<JournalValidationError> for ServiceError {
    fn from(err: JournalValidationError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}
