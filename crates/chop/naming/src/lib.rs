//! CHOP Naming - deterministic names for every addressable resource
//!
//! Every name produced here is a pure function of an already-normalized
//! topology: the same entity state yields the same string across passes and
//! process restarts, which is what lets the operator match existing objects
//! instead of recreating them.
//!
//! ## Layers
//!
//! - [`LengthBudgets`] / [`NamingContext`]: per-level length ceilings
//! - [`MacroResolver`]: expands `{token}` patterns against an [`AddressOf`]
//! - [`PatternRegistry`]: default and override patterns per resource kind
//! - [`Namer`]: resource names, FQDNs, pod and claim names
//!
//! [`AddressOf`]: chop_types::AddressOf

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod claims;
pub mod context;
pub mod fqdn;
pub mod macros;
pub mod namer;
pub mod patterns;
pub mod sanitize;

pub use context::{LengthBudgets, LevelBudgets, NameLevel, NamingContext};
pub use fqdn::{FqdnScope, NAMESPACE_DOMAIN_PATTERN};
pub use macros::{Macro, MacroResolver, UNRESOLVED_MACRO};
pub use namer::{
    host_name, is_auto_generated_host_name, is_auto_generated_replica_name,
    is_auto_generated_shard_name, pod_name_of_stateful_set, replica_name, shard_name, Namer,
};
pub use patterns::{PatternRegistry, ResourceKind, PATTERNS_VERSION};
pub use sanitize::{create_string_id, sanitize, string_head};
