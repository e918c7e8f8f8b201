//! CHOP Schemer - replicated schema propagation
//!
//! When a host joins or is rebuilt, replicated databases, tables and
//! functions have to be recreated on it from its peers. This crate decides
//! whether that is needed and collects the `CREATE` statements, leaving the
//! actual SQL transport to a [`QueryExecutor`].
//!
//! ## Guarantees
//!
//! - Passes run in a fixed order: databases, tables, functions
//! - Object names are unique in a plan; the first definition wins
//! - A cancelled operation returns an empty plan without touching the network
//! - A failing peer query fails the whole plan

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod cancel;
pub mod error;
pub mod executor;
pub mod planner;
pub mod sql;

pub use cancel::{cancellation, Cancellation, CancellationHandle};
pub use error::{Result, SchemerError};
pub use executor::QueryExecutor;
pub use planner::{should_create_replicated_objects, ClusterSchemer, ReplicatedObjects};
