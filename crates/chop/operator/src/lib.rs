//! CHOP Operator - reconciliation facade
//!
//! Wires the topology crates into one pass per installation:
//!
//! 1. [`Normalizer`](chop_normalizer::Normalizer) settles names and addresses
//! 2. [`Namer`](chop_naming::Namer) derives every resource name
//! 3. [`ClusterSchemer`](chop_schemer::ClusterSchemer) plans replicated schema
//!
//! Configuration is layered from defaults, an optional file and `CHOP_`
//! environment variables.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod config;
pub mod error;
pub mod reconciler;
pub mod report;

pub use config::{NamingConfig, OperatorConfig, SchemaConfig};
pub use error::{OperatorError, Result};
pub use reconciler::Reconciler;
pub use report::{
    ClusterReport, HostReport, HostSchemaPlan, OutputFormat, PlannedObject, ReconcileReport,
    ShardReport, TopologyReport,
};
