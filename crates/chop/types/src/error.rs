//! Error types for the topology model

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("Invalid specification: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, TypesError>;
