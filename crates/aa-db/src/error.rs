//! Error types for aa-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Query error (D003)
    #[error("[D003] Query failed: {0}")]
    QueryError(String),

    /// Commit or rollback error (D004)
    #[error("[D004] Transaction failed: {0}")]
    TransactionError(String),

    /// Not implemented (D005)
    #[error("[D005] Feature not implemented for {backend}: {feature}")]
    NotImplemented { backend: String, feature: String },

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Connection used after close (D007)
    #[error("[D007] Connection already closed")]
    Closed,
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    pub(crate) fn not_implemented(backend: &str, feature: &str) -> Self {
        DbError::NotImplemented {
            backend: backend.to_string(),
            feature: feature.to_string(),
        }
    }
}
