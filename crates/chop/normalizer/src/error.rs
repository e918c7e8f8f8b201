//! Normalization error types

use chop_types::TypesError;
use thiserror::Error;

/// Normalization errors
#[derive(Debug, Error)]
pub enum NormalizerError {
    #[error("Specification error: {0}")]
    Spec(#[from] TypesError),

    #[error("Installation {field} must not be empty")]
    MissingIdentity { field: &'static str },

    #[error("Duplicate cluster name: {0}")]
    DuplicateCluster(String),
}

/// Result type for normalization
pub type Result<T> = std::result::Result<T, NormalizerError>;
