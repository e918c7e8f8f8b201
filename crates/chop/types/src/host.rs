//! Host - leaf of the topology

use crate::address::{AddressFields, AddressOf, EntityKind, HostAddress};
use crate::templates::{PodTemplate, ServiceTemplate, TemplateRefs};
use serde::{Deserialize, Serialize};

/// Lowest assignable port
pub const PORT_MIN: i32 = 1;

/// Highest assignable port
pub const PORT_MAX: i32 = 65535;

/// Whether `port` can be assigned to a listener
pub fn is_port_valid(port: i32) -> bool {
    (PORT_MIN..=PORT_MAX).contains(&port)
}

/// Listener ports of a host; `None` means unassigned
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostPorts {
    #[serde(default)]
    pub tcp_port: Option<i32>,

    #[serde(default)]
    pub http_port: Option<i32>,

    #[serde(default)]
    pub interserver_http_port: Option<i32>,
}

impl HostPorts {
    /// Visit every assigned port with its name
    pub fn walk_assigned_mut(&mut self, mut f: impl FnMut(&'static str, &mut Option<i32>)) {
        for (name, port) in [
            ("tcp", &mut self.tcp_port),
            ("http", &mut self.http_port),
            ("interserver", &mut self.interserver_http_port),
        ] {
            if port.is_some() {
                f(name, port);
            }
        }
    }
}

/// Normalizer output attached to a host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostRuntime {
    pub address: HostAddress,
    pub pod_template: Option<PodTemplate>,
    pub service_template: Option<ServiceTemplate>,
    pub replica_service_template: Option<ServiceTemplate>,
}

/// One database node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub templates: TemplateRefs,

    #[serde(flatten)]
    pub ports: HostPorts,

    #[serde(skip)]
    pub runtime: HostRuntime,
}

impl Host {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn address(&self) -> &HostAddress {
        &self.runtime.address
    }

    pub fn pod_template(&self) -> Option<&PodTemplate> {
        self.runtime.pod_template.as_ref()
    }

    pub fn service_template(&self) -> Option<&ServiceTemplate> {
        self.runtime.service_template.as_ref()
    }

    pub fn replica_service_template(&self) -> Option<&ServiceTemplate> {
        self.runtime.replica_service_template.as_ref()
    }
}

impl AddressOf for Host {
    fn kind(&self) -> EntityKind {
        EntityKind::Host
    }

    fn address_of(&self) -> AddressFields<'_> {
        self.runtime.address.fields()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_bounds() {
        assert!(is_port_valid(9000));
        assert!(is_port_valid(PORT_MAX));
        assert!(!is_port_valid(0));
        assert!(!is_port_valid(-1));
        assert!(!is_port_valid(70000));
    }

    #[test]
    fn test_walk_skips_unassigned() {
        let mut ports = HostPorts {
            tcp_port: Some(9000),
            http_port: None,
            interserver_http_port: Some(9009),
        };
        let mut names = Vec::new();
        ports.walk_assigned_mut(|name, _| names.push(name));
        assert_eq!(names, vec!["tcp", "interserver"]);
    }
}
