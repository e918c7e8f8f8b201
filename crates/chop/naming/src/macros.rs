//! Macro expansion
//!
//! A pattern is literal text with `{token}` macros. Name tokens are cut to
//! the level budget of the active [`NamingContext`] and sanitized; `*ID`
//! tokens use the compact hash form instead. Tokens the entity kind cannot
//! answer expand to [`UNRESOLVED_MACRO`]; unknown `{...}` sequences are kept
//! verbatim, and macros nested inside them still expand.

use crate::context::{LengthBudgets, NameLevel, NamingContext};
use crate::sanitize::{create_string_id, sanitize, string_head};
use chop_types::{AddressFields, AddressOf};
use std::collections::BTreeMap;
use tracing::warn;

/// Replacement for a macro the entity kind does not carry
pub const UNRESOLVED_MACRO: &str = "ERROR";

/// Every macro understood by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Macro {
    Namespace,
    InstallationName,
    InstallationId,
    ClusterName,
    ClusterId,
    ClusterIndex,
    ShardName,
    ShardId,
    ShardIndex,
    ReplicaName,
    ReplicaId,
    ReplicaIndex,
    HostName,
    HostId,
    InstallationScopeIndex,
    InstallationScopeCycleSize,
    InstallationScopeCycleIndex,
    InstallationScopeCycleOffset,
    ClusterScopeIndex,
    ClusterScopeCycleSize,
    ClusterScopeCycleIndex,
    ClusterScopeCycleOffset,
    ShardScopeIndex,
    ReplicaScopeIndex,
}

impl Macro {
    pub const ALL: [Macro; 24] = [
        Macro::Namespace,
        Macro::InstallationName,
        Macro::InstallationId,
        Macro::ClusterName,
        Macro::ClusterId,
        Macro::ClusterIndex,
        Macro::ShardName,
        Macro::ShardId,
        Macro::ShardIndex,
        Macro::ReplicaName,
        Macro::ReplicaId,
        Macro::ReplicaIndex,
        Macro::HostName,
        Macro::HostId,
        Macro::InstallationScopeIndex,
        Macro::InstallationScopeCycleSize,
        Macro::InstallationScopeCycleIndex,
        Macro::InstallationScopeCycleOffset,
        Macro::ClusterScopeIndex,
        Macro::ClusterScopeCycleSize,
        Macro::ClusterScopeCycleIndex,
        Macro::ClusterScopeCycleOffset,
        Macro::ShardScopeIndex,
        Macro::ReplicaScopeIndex,
    ];

    /// Token name without braces
    pub fn name(self) -> &'static str {
        match self {
            Macro::Namespace => "namespace",
            Macro::InstallationName => "chi",
            Macro::InstallationId => "chiID",
            Macro::ClusterName => "cluster",
            Macro::ClusterId => "clusterID",
            Macro::ClusterIndex => "clusterIndex",
            Macro::ShardName => "shard",
            Macro::ShardId => "shardID",
            Macro::ShardIndex => "shardIndex",
            Macro::ReplicaName => "replica",
            Macro::ReplicaId => "replicaID",
            Macro::ReplicaIndex => "replicaIndex",
            Macro::HostName => "host",
            Macro::HostId => "hostID",
            Macro::InstallationScopeIndex => "chiScopeIndex",
            Macro::InstallationScopeCycleSize => "chiScopeCycleSize",
            Macro::InstallationScopeCycleIndex => "chiScopeCycleIndex",
            Macro::InstallationScopeCycleOffset => "chiScopeCycleOffset",
            Macro::ClusterScopeIndex => "clusterScopeIndex",
            Macro::ClusterScopeCycleSize => "clusterScopeCycleSize",
            Macro::ClusterScopeCycleIndex => "clusterScopeCycleIndex",
            Macro::ClusterScopeCycleOffset => "clusterScopeCycleOffset",
            Macro::ShardScopeIndex => "shardScopeIndex",
            Macro::ReplicaScopeIndex => "replicaScopeIndex",
        }
    }

    /// Token as it appears in a pattern
    pub fn token(self) -> String {
        format!("{{{}}}", self.name())
    }

    pub fn from_name(name: &str) -> Option<Macro> {
        Macro::ALL.iter().copied().find(|m| m.name() == name)
    }
}

/// Expands macro patterns under one naming context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroResolver {
    context: NamingContext,
    budgets: LengthBudgets,
}

impl MacroResolver {
    pub fn new(context: NamingContext, budgets: LengthBudgets) -> Self {
        Self { context, budgets }
    }

    pub fn names() -> Self {
        Self::new(NamingContext::Names, LengthBudgets::default())
    }

    pub fn labels() -> Self {
        Self::new(NamingContext::Labels, LengthBudgets::default())
    }

    pub fn context(&self) -> NamingContext {
        self.context
    }

    fn budget(&self, level: NameLevel) -> usize {
        self.budgets.budget(level, self.context)
    }

    /// Truncated, sanitized name part
    pub fn name_part(&self, level: NameLevel, value: &str) -> String {
        sanitize(string_head(value, self.budget(level))).to_string()
    }

    /// Compact hash form of a name part
    pub fn name_part_id(&self, level: NameLevel, value: &str) -> String {
        create_string_id(value, self.budget(level))
    }

    /// Expand every macro of `pattern` against `entity`
    pub fn expand<E: AddressOf + ?Sized>(&self, entity: &E, pattern: &str) -> String {
        let fields = entity.address_of();
        let mut out = String::with_capacity(pattern.len());
        let mut rest = pattern;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open..];
            let Some(close) = after.find('}') else {
                out.push_str(after);
                return out;
            };
            let token = &after[1..close];
            match Macro::from_name(token) {
                Some(m) => match self.resolve(m, &fields) {
                    Some(value) => out.push_str(&value),
                    None => {
                        warn!(
                            entity = %entity.kind(),
                            token = m.name(),
                            pattern,
                            "Macro not available for entity kind"
                        );
                        out.push_str(UNRESOLVED_MACRO);
                    }
                },
                None => {
                    // Not a macro: keep the brace and rescan right after it
                    out.push('{');
                    rest = &after[1..];
                    continue;
                }
            }
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        out
    }

    /// Expand the values of a label or annotation map
    pub fn expand_map<E: AddressOf + ?Sized>(
        &self,
        entity: &E,
        map: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        map.iter()
            .map(|(k, v)| (k.clone(), self.expand(entity, v)))
            .collect()
    }

    fn resolve(&self, m: Macro, f: &AddressFields<'_>) -> Option<String> {
        use NameLevel::*;
        let value = match m {
            Macro::Namespace => self.name_part(Installation, f.namespace?),
            Macro::InstallationName => self.name_part(Installation, f.installation_name?),
            Macro::InstallationId => self.name_part_id(Installation, f.installation_name?),
            Macro::ClusterName => self.name_part(Cluster, f.cluster_name?),
            Macro::ClusterId => self.name_part_id(Cluster, f.cluster_name?),
            Macro::ClusterIndex => f.cluster_index?.to_string(),
            Macro::ShardName => self.name_part(Shard, f.shard_name?),
            Macro::ShardId => self.name_part_id(Shard, f.shard_name?),
            Macro::ShardIndex => f.shard_index?.to_string(),
            Macro::ReplicaName => self.name_part(Replica, f.replica_name?),
            Macro::ReplicaId => self.name_part_id(Replica, f.replica_name?),
            Macro::ReplicaIndex => f.replica_index?.to_string(),
            Macro::HostName => self.name_part(Replica, f.host_name?),
            Macro::HostId => self.name_part_id(Replica, f.host_name?),
            Macro::InstallationScopeIndex => f.installation_scope_index?.to_string(),
            Macro::InstallationScopeCycleSize => f.installation_scope_cycle?.size.to_string(),
            Macro::InstallationScopeCycleIndex => f.installation_scope_cycle?.index.to_string(),
            Macro::InstallationScopeCycleOffset => f.installation_scope_cycle?.offset.to_string(),
            Macro::ClusterScopeIndex => f.cluster_scope_index?.to_string(),
            Macro::ClusterScopeCycleSize => f.cluster_scope_cycle?.size.to_string(),
            Macro::ClusterScopeCycleIndex => f.cluster_scope_cycle?.index.to_string(),
            Macro::ClusterScopeCycleOffset => f.cluster_scope_cycle?.offset.to_string(),
            Macro::ShardScopeIndex => f.shard_scope_index?.to_string(),
            Macro::ReplicaScopeIndex => f.replica_scope_index?.to_string(),
        };
        Some(value)
    }
}

impl Default for MacroResolver {
    fn default() -> Self {
        Self::names()
    }
}
