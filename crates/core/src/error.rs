//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// `Validation` and `NotFound` are deterministic: retrying the same call
/// with the same state fails the same way. `Unavailable` and `Conflict`
/// are infrastructure outcomes the caller may retry without losing the
/// in-progress cart or edit state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. zero quantity, missing customer).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested document was not found.
    #[error("not found")]
    NotFound,

    /// A write collided with a concurrent change; retriable.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The document store could not be reached (or timed out); retriable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Whether the caller may retry the operation without re-entering data.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::Unavailable(_))
    }
}
