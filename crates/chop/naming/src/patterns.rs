//! Name pattern registry
//!
//! Default patterns and template overrides go through the same expansion
//! path; the registry only decides which pattern string applies.

use crate::macros::Macro;
use std::collections::HashMap;
use std::fmt;

/// Version tag of the built-in pattern set
pub const PATTERNS_VERSION: &str = "v1";

/// Resource kinds with a generated name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    InstallationService,
    ClusterService,
    ShardService,
    ReplicaService,
    StatefulSet,
    StatefulSetService,
    ConfigMapCommon,
    ConfigMapCommonUsers,
    ConfigMapHost,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 9] = [
        ResourceKind::InstallationService,
        ResourceKind::ClusterService,
        ResourceKind::ShardService,
        ResourceKind::ReplicaService,
        ResourceKind::StatefulSet,
        ResourceKind::StatefulSetService,
        ResourceKind::ConfigMapCommon,
        ResourceKind::ConfigMapCommonUsers,
        ResourceKind::ConfigMapHost,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::InstallationService => "installation-service",
            ResourceKind::ClusterService => "cluster-service",
            ResourceKind::ShardService => "shard-service",
            ResourceKind::ReplicaService => "replica-service",
            ResourceKind::StatefulSet => "statefulset",
            ResourceKind::StatefulSetService => "statefulset-service",
            ResourceKind::ConfigMapCommon => "configmap-common",
            ResourceKind::ConfigMapCommonUsers => "configmap-common-users",
            ResourceKind::ConfigMapHost => "configmap-host",
        };
        f.write_str(s)
    }
}

fn v1_pattern(kind: ResourceKind) -> String {
    let chi = Macro::InstallationName.token();
    let cluster = Macro::ClusterName.token();
    let shard = Macro::ShardName.token();
    let replica = Macro::ReplicaName.token();
    let host = Macro::HostName.token();

    match kind {
        ResourceKind::InstallationService => format!("clickhouse-{chi}"),
        ResourceKind::ClusterService => format!("cluster-{chi}-{cluster}"),
        ResourceKind::ShardService => format!("shard-{chi}-{cluster}-{shard}"),
        ResourceKind::ReplicaService => format!("shard-{chi}-{cluster}-{replica}"),
        ResourceKind::StatefulSet | ResourceKind::StatefulSetService => {
            format!("chi-{chi}-{cluster}-{host}")
        }
        ResourceKind::ConfigMapCommon => format!("chi-{chi}-common-configd"),
        ResourceKind::ConfigMapCommonUsers => format!("chi-{chi}-common-usersd"),
        ResourceKind::ConfigMapHost => format!("chi-{chi}-deploy-confd-{cluster}-{host}"),
    }
}

/// Versioned set of default name patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRegistry {
    version: String,
    patterns: HashMap<ResourceKind, String>,
}

impl PatternRegistry {
    /// Built-in pattern set
    pub fn v1() -> Self {
        Self {
            version: PATTERNS_VERSION.to_string(),
            patterns: ResourceKind::ALL
                .iter()
                .map(|&kind| (kind, v1_pattern(kind)))
                .collect(),
        }
    }

    /// Replace the default pattern of one kind
    pub fn with_pattern(
        mut self,
        version: impl Into<String>,
        kind: ResourceKind,
        pattern: impl Into<String>,
    ) -> Self {
        self.version = version.into();
        self.patterns.insert(kind, pattern.into());
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn default_pattern(&self, kind: ResourceKind) -> &str {
        self.patterns.get(&kind).map(String::as_str).unwrap_or_default()
    }

    /// Pattern for `kind`: a non-empty override wins over the default
    pub fn resolve<'a>(&'a self, kind: ResourceKind, generate_name: Option<&'a str>) -> &'a str {
        match generate_name {
            Some(pattern) if !pattern.is_empty() => pattern,
            _ => self.default_pattern(kind),
        }
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::v1()
    }
}
