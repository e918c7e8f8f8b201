//! Cluster, shard and replica

use crate::address::{AddressFields, AddressOf, ClusterAddress, EntityKind, ShardAddress};
use crate::host::Host;
use crate::policy::SchemaPolicy;
use crate::templates::{ServiceTemplate, TemplateRefs};
use serde::{Deserialize, Serialize};

/// Requested shape of a cluster
///
/// Counts and explicit lists are merged by the normalizer: the larger of
/// the two wins and missing entries are created empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterLayout {
    #[serde(default)]
    pub shards_count: usize,

    #[serde(default)]
    pub replicas_count: usize,

    #[serde(default)]
    pub shards: Vec<Shard>,

    #[serde(default)]
    pub replicas: Vec<Replica>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterRuntime {
    pub address: ClusterAddress,
    pub service_template: Option<ServiceTemplate>,
}

/// Logical group of shards sharing a schema policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub schema_policy: SchemaPolicy,

    #[serde(default)]
    pub templates: TemplateRefs,

    #[serde(default)]
    pub layout: ClusterLayout,

    #[serde(skip)]
    pub runtime: ClusterRuntime,
}

impl Cluster {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn address(&self) -> &ClusterAddress {
        &self.runtime.address
    }

    pub fn shards(&self) -> &[Shard] {
        &self.layout.shards
    }

    pub fn replicas(&self) -> &[Replica] {
        &self.layout.replicas
    }

    pub fn shard(&self, index: usize) -> Option<&Shard> {
        self.layout.shards.get(index)
    }

    pub fn replica(&self, index: usize) -> Option<&Replica> {
        self.layout.replicas.get(index)
    }

    /// Hosts in shard-major order
    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.layout.shards.iter().flat_map(|shard| shard.hosts.iter())
    }

    pub fn host_count(&self) -> usize {
        self.layout.shards.iter().map(|shard| shard.hosts.len()).sum()
    }

    pub fn service_template(&self) -> Option<&ServiceTemplate> {
        self.runtime.service_template.as_ref()
    }
}

impl AddressOf for Cluster {
    fn kind(&self) -> EntityKind {
        EntityKind::Cluster
    }

    fn address_of(&self) -> AddressFields<'_> {
        self.runtime.address.fields()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardRuntime {
    pub address: ShardAddress,
    pub service_template: Option<ServiceTemplate>,
}

/// Horizontal partition of a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shard {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub templates: TemplateRefs,

    /// One host per replica, in replica order
    #[serde(default, alias = "replicas")]
    pub hosts: Vec<Host>,

    #[serde(skip)]
    pub runtime: ShardRuntime,
}

impl Shard {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn address(&self) -> &ShardAddress {
        &self.runtime.address
    }

    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.hosts.iter()
    }

    pub fn service_template(&self) -> Option<&ServiceTemplate> {
        self.runtime.service_template.as_ref()
    }
}

impl AddressOf for Shard {
    fn kind(&self) -> EntityKind {
        EntityKind::Shard
    }

    fn address_of(&self) -> AddressFields<'_> {
        self.runtime.address.fields()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicaRuntime {
    pub index: usize,
    pub service_template: Option<ServiceTemplate>,
}

/// Vertical slice of a cluster: the same position in every shard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replica {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub templates: TemplateRefs,

    #[serde(skip)]
    pub runtime: ReplicaRuntime,
}

impl Replica {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
