//! Resource names
//!
//! Every `*_name` method picks a pattern (template override or registry
//! default) and expands it under the `names` context.

use crate::context::{LengthBudgets, NamingContext};
use crate::macros::MacroResolver;
use crate::patterns::{PatternRegistry, ResourceKind};
use chop_types::{
    AddressOf, Cluster, Host, Installation, PodTemplate, Replica, ServiceTemplate, Shard,
};

/// Builds names for every addressable resource kind
#[derive(Debug, Clone)]
pub struct Namer {
    names: MacroResolver,
    labels: MacroResolver,
    registry: PatternRegistry,
}

impl Default for Namer {
    fn default() -> Self {
        Self::new(LengthBudgets::default(), PatternRegistry::default())
    }
}

impl Namer {
    pub fn new(budgets: LengthBudgets, registry: PatternRegistry) -> Self {
        Self {
            names: MacroResolver::new(NamingContext::Names, budgets),
            labels: MacroResolver::new(NamingContext::Labels, budgets),
            registry,
        }
    }

    /// Resolver for object names
    pub fn names(&self) -> &MacroResolver {
        &self.names
    }

    /// Resolver for label and annotation values
    pub fn labels(&self) -> &MacroResolver {
        &self.labels
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    fn generate<E: AddressOf + ?Sized>(
        &self,
        kind: ResourceKind,
        entity: &E,
        generate_name: Option<&str>,
    ) -> String {
        let pattern = self.registry.resolve(kind, generate_name);
        self.names.expand(entity, pattern)
    }

    pub fn installation_service_name(&self, chi: &Installation) -> String {
        self.generate(
            ResourceKind::InstallationService,
            chi,
            service_pattern(chi.service_template()),
        )
    }

    pub fn cluster_service_name(&self, cluster: &Cluster) -> String {
        self.generate(
            ResourceKind::ClusterService,
            cluster,
            service_pattern(cluster.service_template()),
        )
    }

    pub fn shard_service_name(&self, shard: &Shard) -> String {
        self.generate(
            ResourceKind::ShardService,
            shard,
            service_pattern(shard.service_template()),
        )
    }

    /// Service of the replica the host belongs to
    pub fn replica_service_name(&self, host: &Host) -> String {
        self.generate(
            ResourceKind::ReplicaService,
            host,
            service_pattern(host.replica_service_template()),
        )
    }

    pub fn stateful_set_name(&self, host: &Host) -> String {
        self.generate(
            ResourceKind::StatefulSet,
            host,
            pod_pattern(host.pod_template()),
        )
    }

    pub fn stateful_set_service_name(&self, host: &Host) -> String {
        self.generate(
            ResourceKind::StatefulSetService,
            host,
            service_pattern(host.service_template()),
        )
    }

    pub fn config_map_host_name(&self, host: &Host) -> String {
        self.generate(ResourceKind::ConfigMapHost, host, None)
    }

    pub fn config_map_common_name(&self, chi: &Installation) -> String {
        self.generate(ResourceKind::ConfigMapCommon, chi, None)
    }

    pub fn config_map_common_users_name(&self, chi: &Installation) -> String {
        self.generate(ResourceKind::ConfigMapCommonUsers, chi, None)
    }

    /// Hostname a pod is reached by: the StatefulSet Service, not the pod itself
    pub fn pod_hostname(&self, host: &Host) -> String {
        self.stateful_set_service_name(host)
    }

    /// Name of the only pod of the host's StatefulSet
    pub fn pod_name(&self, host: &Host) -> String {
        pod_name_of_stateful_set(&self.stateful_set_name(host))
    }

    /// Expand an operator-level hostname regexp template for an installation
    pub fn pod_hostname_regexp(&self, chi: &Installation, template: &str) -> String {
        self.names.expand(chi, template)
    }

    pub fn host_template_name(&self, host: &Host) -> String {
        format!("HostTemplate{}", host.name)
    }

    pub fn pod_names_of_installation(&self, chi: &Installation) -> Vec<String> {
        chi.hosts().map(|host| self.pod_name(host)).collect()
    }

    pub fn pod_names_of_cluster(&self, cluster: &Cluster) -> Vec<String> {
        cluster.hosts().map(|host| self.pod_name(host)).collect()
    }

    pub fn pod_names_of_shard(&self, shard: &Shard) -> Vec<String> {
        shard.hosts().map(|host| self.pod_name(host)).collect()
    }
}

fn service_pattern(template: Option<&ServiceTemplate>) -> Option<&str> {
    template.and_then(|t| t.generate_name.as_deref())
}

fn pod_pattern(template: Option<&PodTemplate>) -> Option<&str> {
    template.and_then(|t| t.generate_name.as_deref())
}

/// Pod name of a StatefulSet; every StatefulSet runs exactly one pod
pub fn pod_name_of_stateful_set(stateful_set_name: &str) -> String {
    format!("{stateful_set_name}-0")
}

/// Generated shard name
pub fn shard_name(index: usize) -> String {
    index.to_string()
}

pub fn is_auto_generated_shard_name(name: &str, index: usize) -> bool {
    name == shard_name(index)
}

/// Generated replica name: a replica here is a vertical slice of hosts
pub fn replica_name(index: usize) -> String {
    index.to_string()
}

pub fn is_auto_generated_replica_name(name: &str, index: usize) -> bool {
    name == replica_name(index)
}

/// Generated host name
///
/// Built from the shard and replica names only; the indices are ignored.
pub fn host_name(shard: &Shard, replica: &Replica) -> String {
    format!("{}-{}", shard.name, replica.name)
}

/// Whether `name` was produced by the current or any earlier host naming scheme
///
/// Earlier schemes used `<shardIndex>-<replicaIndex>`, `<shardIndex>` and
/// `<replicaIndex>`. A user who picks one of those literally is treated as
/// auto-generated too.
pub fn is_auto_generated_host_name(
    name: &str,
    shard: &Shard,
    shard_index: usize,
    replica: &Replica,
    replica_index: usize,
) -> bool {
    name == host_name(shard, replica)
        || name == format!("{shard_index}-{replica_index}")
        || name == shard_index.to_string()
        || name == replica_index.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chop_types::{ClusterAddress, HostAddress, ShardAddress};

    fn host_with(generate_name: Option<&str>) -> Host {
        let mut host = Host::new("0-0");
        host.runtime.address = HostAddress {
            namespace: "dev".into(),
            installation_name: "demo".into(),
            cluster_name: "main".into(),
            shard_name: "0".into(),
            replica_name: "0".into(),
            host_name: "0-0".into(),
            ..Default::default()
        };
        host.runtime.pod_template = generate_name.map(|p| PodTemplate {
            name: "pod".into(),
            generate_name: Some(p.into()),
            volume_mounts: Vec::new(),
        });
        host
    }

    #[test]
    fn test_default_host_names() {
        let namer = Namer::default();
        let host = host_with(None);
        assert_eq!(namer.stateful_set_name(&host), "chi-demo-main-0-0");
        assert_eq!(namer.stateful_set_service_name(&host), "chi-demo-main-0-0");
        assert_eq!(namer.config_map_host_name(&host), "chi-demo-deploy-confd-main-0-0");
        assert_eq!(namer.replica_service_name(&host), "shard-demo-main-0");
        assert_eq!(namer.pod_name(&host), "chi-demo-main-0-0-0");
        assert_eq!(namer.pod_hostname(&host), "chi-demo-main-0-0");
        assert_eq!(namer.host_template_name(&host), "HostTemplate0-0");
    }

    #[test]
    fn test_pod_template_override() {
        let namer = Namer::default();
        let host = host_with(Some("sts-{chi}-{shardIndex}-{replicaIndex}"));
        assert_eq!(namer.stateful_set_name(&host), "sts-demo-0-0");
        assert_eq!(namer.pod_name(&host), "sts-demo-0-0-0");
    }

    #[test]
    fn test_installation_names() {
        let namer = Namer::default();
        let mut chi = Installation::new("dev", "demo");
        assert_eq!(namer.installation_service_name(&chi), "clickhouse-demo");
        assert_eq!(namer.config_map_common_name(&chi), "chi-demo-common-configd");
        assert_eq!(namer.config_map_common_users_name(&chi), "chi-demo-common-usersd");

        chi.defaults.templates.service_template = Some("svc".into());
        chi.templates.service_templates.push(ServiceTemplate {
            name: "svc".into(),
            generate_name: Some("service-{chi}".into()),
        });
        assert_eq!(namer.installation_service_name(&chi), "service-demo");
    }

    #[test]
    fn test_cluster_and_shard_service_names() {
        let namer = Namer::default();
        let mut cluster = Cluster::new("main");
        cluster.runtime.address = ClusterAddress {
            namespace: "dev".into(),
            installation_name: "demo".into(),
            cluster_name: "main".into(),
            cluster_index: 0,
        };
        assert_eq!(namer.cluster_service_name(&cluster), "cluster-demo-main");

        let mut shard = Shard::new("1");
        shard.runtime.address = ShardAddress {
            namespace: "dev".into(),
            installation_name: "demo".into(),
            cluster_name: "main".into(),
            cluster_index: 0,
            shard_name: "1".into(),
            shard_index: 1,
        };
        assert_eq!(namer.shard_service_name(&shard), "shard-demo-main-1");
    }

    #[test]
    fn test_names_are_idempotent() {
        let namer = Namer::default();
        let host = host_with(None);
        let first = namer.stateful_set_name(&host);
        for _ in 0..10 {
            assert_eq!(namer.stateful_set_name(&host), first);
        }
        assert_eq!(Namer::default().stateful_set_name(&host.clone()), first);
    }

    #[test]
    fn test_long_parts_are_cut_to_budget() {
        let namer = Namer::default();
        let mut host = host_with(None);
        host.runtime.address.cluster_name = "a-cluster-name-much-longer-than-fifteen".into();
        assert_eq!(namer.stateful_set_name(&host), "chi-demo-a-cluster-name-0-0");
    }

    #[test]
    fn test_bulk_pod_names() {
        let namer = Namer::default();
        let mut shard = Shard::new("0");
        shard.hosts.push(host_with(None));
        let mut second = host_with(None);
        second.runtime.address.replica_name = "1".into();
        second.runtime.address.host_name = "0-1".into();
        shard.hosts.push(second);

        assert_eq!(
            namer.pod_names_of_shard(&shard),
            vec!["chi-demo-main-0-0-0", "chi-demo-main-0-1-0"]
        );

        let mut cluster = Cluster::new("main");
        cluster.layout.shards.push(shard);
        assert_eq!(namer.pod_names_of_cluster(&cluster).len(), 2);

        let mut chi = Installation::new("dev", "demo");
        chi.clusters.push(cluster);
        assert_eq!(
            namer.pod_names_of_installation(&chi),
            namer.pod_names_of_cluster(&chi.clusters[0])
        );
    }

    #[test]
    fn test_pod_hostname_regexp() {
        let namer = Namer::default();
        let chi = Installation::new("dev", "demo");
        assert_eq!(
            namer.pod_hostname_regexp(&chi, r"chi-{chi}-[^.]+\d+-\d+\.{namespace}.svc.cluster.local$"),
            r"chi-demo-[^.]+\d+-\d+\.dev.svc.cluster.local$"
        );
    }

    #[test]
    fn test_shard_and_replica_names() {
        assert_eq!(shard_name(3), "3");
        assert!(is_auto_generated_shard_name("3", 3));
        assert!(!is_auto_generated_shard_name("east", 3));
        assert_eq!(replica_name(0), "0");
        assert!(is_auto_generated_replica_name("0", 0));
    }

    #[test]
    fn test_legacy_host_names_are_recognized() {
        let shard = Shard::new("east");
        let replica = Replica::new("r1");
        assert_eq!(host_name(&shard, &replica), "east-r1");

        assert!(is_auto_generated_host_name("east-r1", &shard, 2, &replica, 0));
        assert!(is_auto_generated_host_name("2-0", &shard, 2, &replica, 0));
        assert!(is_auto_generated_host_name("2", &shard, 2, &replica, 0));
        assert!(is_auto_generated_host_name("0", &shard, 2, &replica, 0));
        assert!(!is_auto_generated_host_name("custom-name", &shard, 2, &replica, 0));
        assert!(!is_auto_generated_host_name("0-2", &shard, 2, &replica, 0));
    }
}
