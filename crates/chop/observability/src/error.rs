//! Observability error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("Tracing initialisation failed: {0}")]
    TracingInit(String),

    #[error("Metrics encoding failed: {0}")]
    Encode(#[from] prometheus::Error),

    #[error("Metrics output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, ObservabilityError>;
