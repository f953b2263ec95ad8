//! Error types for reorder computation and order commits.

use thiserror::Error;
use uuid::Uuid;

/// Engine-local conditions. None of these are fatal; the input sequence is
/// left untouched whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    /// The moved id is not part of the sequence.
    #[error("item not found in sequence: {0}")]
    ItemNotFound(String),

    /// The sequence has zero or one element, so every move is a no-op.
    #[error("sequence has fewer than two items")]
    EmptySequence,

    /// A client supplied ordering is malformed (not a permutation, gaps,
    /// duplicates).
    #[error("invalid ordering: {0}")]
    ValidationFailed(String),
}

impl ReorderError {
    pub(crate) fn not_found(id: &impl std::fmt::Debug) -> Self {
        Self::ItemNotFound(format!("{:?}", id))
    }
}

/// Rejection returned by an order gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// The caller does not own the scope (or is not signed in).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The payload was malformed or referenced items outside the scope.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// The moved item no longer exists.
    #[error("not found: {0}")]
    NotFound(Uuid),

    /// Network or server failure. Safe to retry with the identical payload.
    #[error("transient failure: {0}")]
    Transient(String),
}

impl CommitError {
    /// Whether the same payload may be sent again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(CommitError::Transient("timeout".into()).is_retryable());
        assert!(!CommitError::Unauthorized("nope".into()).is_retryable());
        assert!(!CommitError::ValidationFailed("gap".into()).is_retryable());
        assert!(!CommitError::NotFound(Uuid::nil()).is_retryable());
    }

    #[test]
    fn test_error_messages() {
        let err = ReorderError::not_found(&"C");
        assert_eq!(err.to_string(), "item not found in sequence: \"C\"");
        assert_eq!(
            ReorderError::EmptySequence.to_string(),
            "sequence has fewer than two items"
        );
    }
}
