//! Names of storage claims, secrets and disruption budgets

use crate::namer::Namer;
use chop_types::{Cluster, Host, Installation, VolumeClaimTemplate, VolumeMount};
use std::collections::BTreeMap;

impl Namer {
    /// Claim created for `host` from a volume claim template
    pub fn pvc_name_by_volume_claim_template(
        &self,
        host: &Host,
        template: &VolumeClaimTemplate,
    ) -> String {
        format!("{}-{}", template.name, self.pod_name(host))
    }

    /// Claim behind a volume mount of `host`
    ///
    /// `None` when the mount does not refer to a volume claim template of
    /// the installation, e.g. a mount backed by a ConfigMap.
    pub fn pvc_name_by_volume_mount(
        &self,
        chi: &Installation,
        host: &Host,
        mount: &VolumeMount,
    ) -> Option<String> {
        chi.templates
            .volume_claim_template(&mount.name)
            .map(|template| self.pvc_name_by_volume_claim_template(host, template))
    }

    /// Secret holding the auto-generated inter-node credentials of a cluster
    pub fn cluster_auto_secret_name(&self, cluster: &Cluster) -> String {
        let chi = &cluster.address().installation_name;
        if cluster.name.is_empty() {
            format!("{chi}-auto-secret")
        } else {
            format!("{chi}-{}-auto-secret", cluster.name)
        }
    }

    pub fn pod_disruption_budget_name(&self, cluster: &Cluster) -> String {
        let address = cluster.address();
        format!("{}-{}", address.installation_name, address.cluster_name)
    }

    /// Label values of a cluster's disruption budget, expanded as labels
    pub fn pod_disruption_budget_labels(
        &self,
        cluster: &Cluster,
        labels: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        self.labels().expand_map(cluster, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NamingContext;
    use chop_types::{ClusterAddress, HostAddress};

    fn host() -> Host {
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
        host
    }

    fn cluster(name: &str) -> Cluster {
        let mut cluster = Cluster::new(name);
        cluster.runtime.address = ClusterAddress {
            namespace: "dev".into(),
            installation_name: "demo".into(),
            cluster_name: name.into(),
            cluster_index: 0,
        };
        cluster
    }

    #[test]
    fn test_pvc_names() {
        let namer = Namer::default();
        let mut chi = Installation::new("dev", "demo");
        chi.templates.volume_claim_templates.push(VolumeClaimTemplate {
            name: "data".into(),
            storage: Some("10Gi".into()),
        });

        let data = VolumeMount {
            name: "data".into(),
            mount_path: "/var/lib/clickhouse".into(),
        };
        assert_eq!(
            namer.pvc_name_by_volume_mount(&chi, &host(), &data).as_deref(),
            Some("data-chi-demo-main-0-0-0")
        );

        let config = VolumeMount {
            name: "config".into(),
            mount_path: "/etc/clickhouse-server/config.d".into(),
        };
        assert!(namer.pvc_name_by_volume_mount(&chi, &host(), &config).is_none());
    }

    #[test]
    fn test_auto_secret_names() {
        let namer = Namer::default();
        assert_eq!(namer.cluster_auto_secret_name(&cluster("main")), "demo-main-auto-secret");
        assert_eq!(namer.cluster_auto_secret_name(&cluster("")), "demo-auto-secret");
    }

    #[test]
    fn test_pod_disruption_budget() {
        let namer = Namer::default();
        let cluster = cluster("main");
        assert_eq!(namer.pod_disruption_budget_name(&cluster), "demo-main");

        let mut labels = BTreeMap::new();
        labels.insert("clickhouse.altinity.com/cluster".to_string(), "{cluster}".to_string());
        labels.insert("clickhouse.altinity.com/shard".to_string(), "{shard}".to_string());
        let expanded = namer.pod_disruption_budget_labels(&cluster, &labels);
        assert_eq!(expanded["clickhouse.altinity.com/cluster"], "main");
        assert_eq!(expanded["clickhouse.altinity.com/shard"], "ERROR");
    }

    #[test]
    fn test_disruption_budget_labels_use_label_budget() {
        let namer = Namer::default();
        assert_eq!(namer.labels().context(), NamingContext::Labels);
        assert_eq!(namer.names().context(), NamingContext::Names);

        let cluster = cluster("analytics-primary-cluster");
        let mut labels = BTreeMap::new();
        labels.insert("clickhouse.altinity.com/cluster".to_string(), "{cluster}".to_string());
        let expanded = namer.pod_disruption_budget_labels(&cluster, &labels);
        assert_eq!(expanded["clickhouse.altinity.com/cluster"], "analytics-primary-cluster");
    }
}
