//! Schema replication policy

use serde::{Deserialize, Serialize};

/// Whether replicated objects are copied between replicas of a shard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicaSchemaPolicy {
    None,
    #[default]
    All,
}

/// Whether replicated objects are copied to additional shards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShardSchemaPolicy {
    None,
    #[default]
    All,
    DistributedTablesOnly,
}

/// Per-cluster schema policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaPolicy {
    #[serde(default)]
    pub replica: ReplicaSchemaPolicy,

    #[serde(default)]
    pub shard: ShardSchemaPolicy,
}
