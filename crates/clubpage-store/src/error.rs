//! Error types for the storage layer.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Why the order gateway refused a commit. Nothing is written when any of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// The principal neither owns the scope nor is an admin.
    #[error("caller does not own the scope")]
    NotOwner,

    /// An update names an item outside the scope.
    #[error("item {0} does not belong to the scope")]
    ForeignItem(Uuid),

    /// The same item appears twice in one payload.
    #[error("item {0} appears more than once")]
    Duplicate(Uuid),

    /// Applying the updates would leave gaps or duplicate positions.
    #[error("positions would not be contiguous from zero")]
    NotDense,

    /// The entity kind cannot be ordered within the given scope.
    #[error("{0}")]
    ScopeMismatch(String),
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    /// A record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// The caller may not perform the operation.
    #[error("permission denied: {operation} on {scope}")]
    PermissionDenied { operation: String, scope: String },

    /// The order gateway rejected a commit.
    #[error("order rejected: {0}")]
    OrderRejected(#[from] RejectReason),

    /// Invalid input data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A unique value is already held by another record.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Migration error.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}
