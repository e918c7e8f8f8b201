//! Pod, service and volume claim templates
//!
//! Templates are declared once on the installation and referenced by name
//! from any level of the tree. References inherit downwards: a field left
//! empty on a child takes the parent's value.

use serde::{Deserialize, Serialize};

/// Pod template, optionally carrying a StatefulSet name pattern
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodTemplate {
    pub name: String,

    /// Macro pattern overriding the default StatefulSet name
    #[serde(default)]
    pub generate_name: Option<String>,

    #[serde(default)]
    pub volume_mounts: Vec<VolumeMount>,
}

/// Service template, optionally carrying a Service name pattern
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTemplate {
    pub name: String,

    /// Macro pattern overriding the default Service name
    #[serde(default)]
    pub generate_name: Option<String>,
}

/// Volume claim template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeClaimTemplate {
    pub name: String,

    #[serde(default)]
    pub storage: Option<String>,
}

/// Volume mount of the database container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    pub name: String,
    pub mount_path: String,
}

/// Template declarations of an installation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Templates {
    #[serde(default)]
    pub pod_templates: Vec<PodTemplate>,

    #[serde(default)]
    pub service_templates: Vec<ServiceTemplate>,

    #[serde(default)]
    pub volume_claim_templates: Vec<VolumeClaimTemplate>,
}

impl Templates {
    pub fn pod_template(&self, name: &str) -> Option<&PodTemplate> {
        self.pod_templates.iter().find(|t| t.name == name)
    }

    pub fn service_template(&self, name: &str) -> Option<&ServiceTemplate> {
        self.service_templates.iter().find(|t| t.name == name)
    }

    pub fn volume_claim_template(&self, name: &str) -> Option<&VolumeClaimTemplate> {
        self.volume_claim_templates.iter().find(|t| t.name == name)
    }
}

/// Template references set on any level of the tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRefs {
    /// Pod template of hosts
    #[serde(default)]
    pub pod_template: Option<String>,

    /// Template of the installation-wide Service
    #[serde(default)]
    pub service_template: Option<String>,

    /// Template of the per-host StatefulSet Service
    #[serde(default)]
    pub host_service_template: Option<String>,

    #[serde(default)]
    pub cluster_service_template: Option<String>,

    #[serde(default)]
    pub shard_service_template: Option<String>,

    #[serde(default)]
    pub replica_service_template: Option<String>,
}

impl TemplateRefs {
    /// Fill every unset reference from `parent`
    pub fn inherit(&mut self, parent: &TemplateRefs) {
        fn fill(child: &mut Option<String>, parent: &Option<String>) {
            if child.is_none() {
                child.clone_from(parent);
            }
        }
        fill(&mut self.pod_template, &parent.pod_template);
        fill(&mut self.service_template, &parent.service_template);
        fill(&mut self.host_service_template, &parent.host_service_template);
        fill(&mut self.cluster_service_template, &parent.cluster_service_template);
        fill(&mut self.shard_service_template, &parent.shard_service_template);
        fill(&mut self.replica_service_template, &parent.replica_service_template);
    }
}
