//! CHOP Normalizer - turns a raw specification into an addressed topology
//!
//! One normalization pass owns the installation exclusively. It expands
//! the requested layout, settles every shard, replica and host name,
//! resolves template references and finally assigns each host exactly one
//! [`HostAddress`]. Once [`Normalizer::normalize`] returns, the topology is
//! frozen and may be shared with naming and schema planning.
//!
//! [`HostAddress`]: chop_types::HostAddress

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod context;
pub mod error;
pub mod normalizer;
pub mod options;

pub use context::Context;
pub use error::{NormalizerError, Result};
pub use normalizer::Normalizer;
pub use options::Options;
