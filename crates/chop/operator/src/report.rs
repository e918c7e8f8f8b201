//! Outcome of a reconciliation pass

use crate::error::{OperatorError, Result};
use chop_schemer::ReplicatedObjects;
use chop_types::HostAddress;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Text encoding of reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn encode<T: Serialize>(self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Yaml => {
                serde_yaml::to_string(value).map_err(|e| OperatorError::Encode(e.to_string()))
            }
            OutputFormat::Json => serde_json::to_string_pretty(value)
                .map_err(|e| OperatorError::Encode(e.to_string())),
        }
    }
}

/// Every derived name of one installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyReport {
    pub namespace: String,
    pub name: String,
    pub service: String,
    pub service_fqdn: String,
    pub config_map_common: String,
    pub config_map_common_users: String,
    pub pod_hostname_regexp: String,
    pub clusters: Vec<ClusterReport>,
}

impl TopologyReport {
    pub fn hosts(&self) -> impl Iterator<Item = &HostReport> {
        self.clusters
            .iter()
            .flat_map(|c| c.shards.iter())
            .flat_map(|s| s.hosts.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterReport {
    pub name: String,
    pub service: String,
    pub pod_disruption_budget: String,
    pub auto_secret: String,
    pub shards: Vec<ShardReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardReport {
    pub name: String,
    pub service: String,
    pub hosts: Vec<HostReport>,
}

/// Names a single host is known by
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostReport {
    pub name: String,
    pub address: HostAddress,
    pub stateful_set: String,
    pub service: String,
    pub replica_service: String,
    pub pod: String,
    pub config_map: String,
    pub fqdn: String,
    pub instance_hostname: String,
    pub host_template: String,
}

/// One object to create on a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedObject {
    pub name: String,
    pub statement: String,
}

/// Replicated schema planned for one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostSchemaPlan {
    pub host: String,
    pub cluster: String,
    pub objects: Vec<PlannedObject>,
}

impl HostSchemaPlan {
    pub fn new(host: &HostAddress, objects: &ReplicatedObjects) -> Self {
        Self {
            host: host.host_name.clone(),
            cluster: host.cluster_name.clone(),
            objects: objects
                .iter()
                .map(|(name, statement)| PlannedObject {
                    name: name.to_string(),
                    statement: statement.to_string(),
                })
                .collect(),
        }
    }
}

/// Full result of one pass
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub pass_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub cancelled: bool,
    pub topology: TopologyReport,
    pub schema: Vec<HostSchemaPlan>,
}

impl ReconcileReport {
    /// Total number of objects planned across hosts
    pub fn planned_objects(&self) -> usize {
        self.schema.iter().map(|p| p.objects.len()).sum()
    }
}
