//! Schemer error types

use thiserror::Error;

/// Schema replication errors
#[derive(Debug, Error)]
pub enum SchemerError {
    #[error("Query failed on {host}: {reason}")]
    Query { host: String, reason: String },

    #[error("Misaligned result set: {names} names, {statements} statements")]
    MisalignedResult { names: usize, statements: usize },

    #[error("Executor error: {0}")]
    Executor(String),
}

/// Result type for schemer operations
pub type Result<T> = std::result::Result<T, SchemerError>;
