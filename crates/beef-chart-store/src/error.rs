//! Error types for catalog storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("not found")]
    NotFound,

    /// The cut table has not been created.
    #[error("table missing: {0}")]
    TableMissing(String),

    /// Row rejected by a table constraint.
    #[error("constraint violation: {0}")]
    Constraint(String),
}
