//! CHOP Types - Topology model for ClickHouse installations
//!
//! The declarative specification of a deployment is a tree:
//! installation → cluster → shard → host, with replicas as vertical
//! slices across shards. Every entity carries a runtime block that the
//! normalizer fills in; nothing in this crate computes addresses itself.
//!
//! ## Key Concepts
//!
//! - **Installation**: Root of one deployment, owns clusters and templates
//! - **Cluster**: Group of shards sharing a schema policy
//! - **Shard**: Horizontal partition, one host per replica
//! - **Replica**: Vertical position shared by every shard
//! - **Host**: Leaf node with a fully populated [`HostAddress`]
//! - **AddressOf**: Capability used by name resolution to read whatever
//!   address fields an entity kind carries

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod address;
pub mod cluster;
pub mod error;
pub mod host;
pub mod installation;
pub mod policy;
pub mod templates;

pub use address::{
    AddressFields, AddressOf, ClusterAddress, CyclePlacement, EntityKind, HostAddress,
    ShardAddress,
};
pub use cluster::{
    Cluster, ClusterLayout, ClusterRuntime, Replica, ReplicaRuntime, Shard, ShardRuntime,
};
pub use error::{Result, TypesError};
pub use host::{is_port_valid, Host, HostPorts, HostRuntime, PORT_MAX, PORT_MIN};
pub use installation::{Defaults, Installation};
pub use policy::{ReplicaSchemaPolicy, SchemaPolicy, ShardSchemaPolicy};
pub use templates::{
    PodTemplate, ServiceTemplate, TemplateRefs, Templates, VolumeClaimTemplate, VolumeMount,
};
