//! Installation - root of the topology

use crate::address::{AddressFields, AddressOf, EntityKind};
use crate::cluster::Cluster;
use crate::error::Result;
use crate::host::Host;
use crate::templates::{ServiceTemplate, TemplateRefs, Templates};
use serde::{Deserialize, Serialize};

/// Installation-wide defaults inherited by every cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    /// Address replicas by fully qualified domain name instead of the
    /// namespace-local Service name
    #[serde(default)]
    pub replicas_use_fqdn: Option<bool>,

    #[serde(default)]
    pub templates: TemplateRefs,
}

/// One distributed database deployment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    pub namespace: String,

    pub name: String,

    #[serde(default)]
    pub defaults: Defaults,

    /// Domain pattern overriding `%s.svc.cluster.local`; `%s` is the namespace
    #[serde(default)]
    pub namespace_domain_pattern: Option<String>,

    #[serde(default)]
    pub templates: Templates,

    #[serde(default)]
    pub clusters: Vec<Cluster>,
}

impl Installation {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a raw specification from YAML (JSON is accepted as well)
    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn replicas_use_fqdn(&self) -> bool {
        self.defaults.replicas_use_fqdn.unwrap_or(false)
    }

    /// Template of the installation-wide Service
    pub fn service_template(&self) -> Option<&ServiceTemplate> {
        self.defaults
            .templates
            .service_template
            .as_deref()
            .and_then(|name| self.templates.service_template(name))
    }

    pub fn cluster(&self, index: usize) -> Option<&Cluster> {
        self.clusters.get(index)
    }

    /// Hosts of every cluster in shard-major order
    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.clusters.iter().flat_map(|cluster| cluster.hosts())
    }

    pub fn host_count(&self) -> usize {
        self.clusters.iter().map(Cluster::host_count).sum()
    }
}

impl AddressOf for Installation {
    fn kind(&self) -> EntityKind {
        EntityKind::Installation
    }

    fn address_of(&self) -> AddressFields<'_> {
        AddressFields {
            namespace: Some(&self.namespace),
            installation_name: Some(&self.name),
            ..AddressFields::default()
        }
    }
}
