//! Error types for the operator facade

use thiserror::Error;

/// Errors that can occur while reconciling an installation
#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Normalization failed: {0}")]
    Normalize(#[from] chop_normalizer::NormalizerError),

    #[error("Schema planning failed: {0}")]
    Schema(#[from] chop_schemer::SchemerError),

    #[error("Observability error: {0}")]
    Observability(#[from] chop_observability::ObservabilityError),

    #[error("Report encoding failed: {0}")]
    Encode(String),
}

/// Result type for operator operations
pub type Result<T> = std::result::Result<T, OperatorError>;
