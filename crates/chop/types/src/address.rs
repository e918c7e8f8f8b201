//! Address model
//!
//! Addresses are assigned by the normalizer once per pass and are read-only
//! afterwards. Name resolution never looks at entity internals directly: it
//! asks for [`AddressFields`] through [`AddressOf`] and degrades on whatever
//! the entity kind does not carry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a topology entity that can be addressed by name resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Installation,
    Cluster,
    Shard,
    Host,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Installation => "installation",
            EntityKind::Cluster => "cluster",
            EntityKind::Shard => "shard",
            EntityKind::Host => "host",
        };
        f.write_str(s)
    }
}

/// Placement of a host inside a bounded, cyclically reused resource pool
///
/// `size == 0` means the pool is unbounded: `index` stays at zero and
/// `offset` follows the scope index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclePlacement {
    /// Pool size
    pub size: usize,
    /// Number of completed passes over the pool
    pub index: usize,
    /// Position inside the current pass
    pub offset: usize,
}

impl CyclePlacement {
    /// Start of a scope with the given pool size
    pub fn start(size: usize) -> Self {
        Self {
            size,
            index: 0,
            offset: 0,
        }
    }

    /// Placement of the next host in the same scope
    pub fn next(self) -> Self {
        let mut next = Self {
            offset: self.offset + 1,
            ..self
        };
        if next.size > 0 && next.offset >= next.size {
            next.offset = 0;
            next.index += 1;
        }
        next
    }
}

/// Runtime address of a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAddress {
    pub namespace: String,
    pub installation_name: String,
    pub cluster_name: String,
    pub cluster_index: usize,
}

/// Runtime address of a shard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardAddress {
    pub namespace: String,
    pub installation_name: String,
    pub cluster_name: String,
    pub cluster_index: usize,
    pub shard_name: String,
    pub shard_index: usize,
}

/// Runtime address of a host: identity plus placement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostAddress {
    pub namespace: String,
    pub installation_name: String,
    pub cluster_name: String,
    pub cluster_index: usize,
    pub shard_name: String,
    pub shard_index: usize,
    pub replica_name: String,
    pub replica_index: usize,
    pub host_name: String,

    /// Position among all hosts of the installation
    pub installation_scope_index: usize,
    /// Position among all hosts of the cluster
    pub cluster_scope_index: usize,
    /// Position inside the shard (equals the replica index)
    pub shard_scope_index: usize,
    /// Position inside the replica (equals the shard index)
    pub replica_scope_index: usize,

    pub installation_scope_cycle: CyclePlacement,
    pub cluster_scope_cycle: CyclePlacement,
}

/// Address fields an entity exposes to name resolution
///
/// `None` means the entity kind does not carry the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressFields<'a> {
    pub namespace: Option<&'a str>,
    pub installation_name: Option<&'a str>,
    pub cluster_name: Option<&'a str>,
    pub cluster_index: Option<usize>,
    pub shard_name: Option<&'a str>,
    pub shard_index: Option<usize>,
    pub replica_name: Option<&'a str>,
    pub replica_index: Option<usize>,
    pub host_name: Option<&'a str>,
    pub installation_scope_index: Option<usize>,
    pub cluster_scope_index: Option<usize>,
    pub shard_scope_index: Option<usize>,
    pub replica_scope_index: Option<usize>,
    pub installation_scope_cycle: Option<CyclePlacement>,
    pub cluster_scope_cycle: Option<CyclePlacement>,
}

/// Capability implemented by every addressable topology kind
pub trait AddressOf {
    /// Entity kind, used for diagnostics
    fn kind(&self) -> EntityKind;

    /// Fields this entity carries
    fn address_of(&self) -> AddressFields<'_>;
}

impl ClusterAddress {
    pub fn fields(&self) -> AddressFields<'_> {
        AddressFields {
            namespace: Some(&self.namespace),
            installation_name: Some(&self.installation_name),
            cluster_name: Some(&self.cluster_name),
            cluster_index: Some(self.cluster_index),
            ..AddressFields::default()
        }
    }
}

impl ShardAddress {
    pub fn fields(&self) -> AddressFields<'_> {
        AddressFields {
            namespace: Some(&self.namespace),
            installation_name: Some(&self.installation_name),
            cluster_name: Some(&self.cluster_name),
            cluster_index: Some(self.cluster_index),
            shard_name: Some(&self.shard_name),
            shard_index: Some(self.shard_index),
            ..AddressFields::default()
        }
    }
}

impl HostAddress {
    pub fn fields(&self) -> AddressFields<'_> {
        AddressFields {
            namespace: Some(&self.namespace),
            installation_name: Some(&self.installation_name),
            cluster_name: Some(&self.cluster_name),
            cluster_index: Some(self.cluster_index),
            shard_name: Some(&self.shard_name),
            shard_index: Some(self.shard_index),
            replica_name: Some(&self.replica_name),
            replica_index: Some(self.replica_index),
            host_name: Some(&self.host_name),
            installation_scope_index: Some(self.installation_scope_index),
            cluster_scope_index: Some(self.cluster_scope_index),
            shard_scope_index: Some(self.shard_scope_index),
            replica_scope_index: Some(self.replica_scope_index),
            installation_scope_cycle: Some(self.installation_scope_cycle),
            cluster_scope_cycle: Some(self.cluster_scope_cycle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_cycle_never_wraps() {
        let mut placement = CyclePlacement::start(0);
        for _ in 0..5 {
            placement = placement.next();
        }
        assert_eq!(placement.index, 0);
        assert_eq!(placement.offset, 5);
    }

    #[test]
    fn test_bounded_cycle_wraps() {
        let mut placement = CyclePlacement::start(2);
        let mut seen = vec![(placement.index, placement.offset)];
        for _ in 0..4 {
            placement = placement.next();
            seen.push((placement.index, placement.offset));
        }
        assert_eq!(seen, vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0)]);
    }

    #[test]
    fn test_cluster_fields_omit_host_parts() {
        let address = ClusterAddress {
            namespace: "ns".into(),
            installation_name: "chi".into(),
            cluster_name: "main".into(),
            cluster_index: 1,
        };
        let fields = address.fields();
        assert_eq!(fields.cluster_name, Some("main"));
        assert_eq!(fields.cluster_index, Some(1));
        assert!(fields.shard_name.is_none());
        assert!(fields.shard_scope_index.is_none());
    }
}
