//! Normalization walk
//!
//! Clusters are visited in order; inside a cluster, shards outer and
//! replicas inner (shard-major). Installation-scope counters run across the
//! whole walk, cluster-scope counters restart with every cluster.

use crate::context::Context;
use crate::error::{NormalizerError, Result};
use crate::options::Options;
use chop_naming::{
    host_name, is_auto_generated_host_name, is_auto_generated_replica_name,
    is_auto_generated_shard_name, replica_name, shard_name,
};
use chop_types::{
    is_port_valid, Cluster, ClusterAddress, ClusterLayout, CyclePlacement, Host, HostAddress,
    HostRuntime, Installation, PodTemplate, Replica, ReplicaRuntime, ServiceTemplate, Shard,
    ShardAddress, ShardRuntime, Templates,
};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Runs normalization passes
#[derive(Debug, Default)]
pub struct Normalizer {
    context: Context,
}

/// Counters of one placement scope
#[derive(Debug, Clone, Copy)]
struct ScopeCursor {
    index: usize,
    cycle: CyclePlacement,
}

impl ScopeCursor {
    fn start(cycle_size: usize) -> Self {
        Self {
            index: 0,
            cycle: CyclePlacement::start(cycle_size),
        }
    }

    fn advance(&mut self) {
        self.index += 1;
        self.cycle = self.cycle.next();
    }
}

impl Normalizer {
    pub fn new(options: Options) -> Self {
        Self {
            context: Context::new(options),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Parse and normalize a YAML (or JSON) specification
    pub fn normalize_yaml(&mut self, source: &str) -> Result<Installation> {
        let raw = Installation::from_yaml(source)?;
        self.normalize(raw)
    }

    /// Normalize `raw` into a fully addressed topology
    ///
    /// Runtime blocks are rebuilt from scratch, so normalizing an already
    /// normalized installation yields the same result.
    #[instrument(skip_all, fields(namespace = %raw.namespace, installation = %raw.name))]
    pub fn normalize(&mut self, raw: Installation) -> Result<Installation> {
        validate(&raw)?;
        let options = self.context.options().clone();

        let walked = {
            let chi = self.context.set_target(raw);
            normalize_installation(chi, &options);
            std::mem::take(chi)
        };
        self.context.take_target();

        info!(
            clusters = walked.clusters.len(),
            hosts = walked.host_count(),
            "Installation normalized"
        );
        Ok(walked)
    }
}

fn validate(chi: &Installation) -> Result<()> {
    if chi.namespace.is_empty() {
        return Err(NormalizerError::MissingIdentity { field: "namespace" });
    }
    if chi.name.is_empty() {
        return Err(NormalizerError::MissingIdentity { field: "name" });
    }

    let mut seen = HashSet::new();
    for cluster in &chi.clusters {
        if !seen.insert(cluster.name.as_str()) {
            return Err(NormalizerError::DuplicateCluster(cluster.name.clone()));
        }
    }
    Ok(())
}

fn normalize_installation(chi: &mut Installation, options: &Options) {
    if chi.defaults.replicas_use_fqdn.is_none() {
        chi.defaults.replicas_use_fqdn = Some(options.replicas_use_fqdn);
    }

    let Installation {
        namespace,
        name,
        defaults,
        templates,
        clusters,
        ..
    } = chi;

    let mut installation_scope = ScopeCursor::start(options.installation_cycle_size);

    for (cluster_index, cluster) in clusters.iter_mut().enumerate() {
        cluster.templates.inherit(&defaults.templates);
        expand_layout(&mut cluster.layout);

        cluster.runtime.address = ClusterAddress {
            namespace: namespace.clone(),
            installation_name: name.clone(),
            cluster_name: cluster.name.clone(),
            cluster_index,
        };
        cluster.runtime.service_template = service_template(
            templates,
            cluster.templates.cluster_service_template.as_deref(),
        );

        normalize_replicas(cluster, templates);

        let mut cluster_scope = ScopeCursor::start(options.cluster_cycle_size);
        let Cluster {
            templates: cluster_templates,
            layout,
            runtime,
            ..
        } = cluster;

        for (shard_index, shard) in layout.shards.iter_mut().enumerate() {
            if shard.name.is_empty() || is_auto_generated_shard_name(&shard.name, shard_index) {
                shard.name = shard_name(shard_index);
            }
            shard.templates.inherit(cluster_templates);
            shard.runtime = ShardRuntime {
                address: ShardAddress {
                    namespace: namespace.clone(),
                    installation_name: name.clone(),
                    cluster_name: runtime.address.cluster_name.clone(),
                    cluster_index,
                    shard_name: shard.name.clone(),
                    shard_index,
                },
                service_template: service_template(
                    templates,
                    shard.templates.shard_service_template.as_deref(),
                ),
            };

            for (replica_index, replica) in layout.replicas.iter().enumerate() {
                let host = &shard.hosts[replica_index];
                let auto_named = host.name.is_empty()
                    || is_auto_generated_host_name(
                        &host.name,
                        shard,
                        shard_index,
                        replica,
                        replica_index,
                    );
                let generated = host_name(shard, replica);

                let host = &mut shard.hosts[replica_index];
                if auto_named {
                    host.name = generated;
                }
                host.templates.inherit(&shard.templates);
                host.templates.inherit(&replica.templates);
                normalize_ports(host);

                host.runtime = HostRuntime {
                    address: HostAddress {
                        namespace: namespace.clone(),
                        installation_name: name.clone(),
                        cluster_name: runtime.address.cluster_name.clone(),
                        cluster_index,
                        shard_name: shard.name.clone(),
                        shard_index,
                        replica_name: replica.name.clone(),
                        replica_index,
                        host_name: host.name.clone(),
                        installation_scope_index: installation_scope.index,
                        cluster_scope_index: cluster_scope.index,
                        shard_scope_index: replica_index,
                        replica_scope_index: shard_index,
                        installation_scope_cycle: installation_scope.cycle,
                        cluster_scope_cycle: cluster_scope.cycle,
                    },
                    pod_template: pod_template(templates, host.templates.pod_template.as_deref()),
                    service_template: service_template(
                        templates,
                        host.templates.host_service_template.as_deref(),
                    ),
                    replica_service_template: replica.runtime.service_template.clone(),
                };

                installation_scope.advance();
                cluster_scope.advance();
            }
        }

        debug!(
            cluster = %runtime.address.cluster_name,
            shards = layout.shards_count,
            replicas = layout.replicas_count,
            "Cluster normalized"
        );
    }
}

/// Merge counts and explicit lists; every shard ends up with one host per replica
fn expand_layout(layout: &mut ClusterLayout) {
    let widest = layout.shards.iter().map(|s| s.hosts.len()).max().unwrap_or(0);
    let shards = layout.shards_count.max(layout.shards.len()).max(1);
    let replicas = layout
        .replicas_count
        .max(layout.replicas.len())
        .max(widest)
        .max(1);

    layout.shards.resize_with(shards, Shard::default);
    layout.replicas.resize_with(replicas, Replica::default);
    for shard in &mut layout.shards {
        shard.hosts.resize_with(replicas, Host::default);
    }
    layout.shards_count = shards;
    layout.replicas_count = replicas;
}

fn normalize_replicas(cluster: &mut Cluster, templates: &Templates) {
    let Cluster {
        templates: cluster_templates,
        layout,
        ..
    } = cluster;

    for (replica_index, replica) in layout.replicas.iter_mut().enumerate() {
        if replica.name.is_empty() || is_auto_generated_replica_name(&replica.name, replica_index) {
            replica.name = replica_name(replica_index);
        }
        replica.templates.inherit(cluster_templates);
        replica.runtime = ReplicaRuntime {
            index: replica_index,
            service_template: service_template(
                templates,
                replica.templates.replica_service_template.as_deref(),
            ),
        };
    }
}

/// Ports outside the assignable range become unassigned
fn normalize_ports(host: &mut Host) {
    host.ports.walk_assigned_mut(|port_name, port| {
        if let Some(value) = *port {
            if !is_port_valid(value) {
                warn!(host = %host.name, port = port_name, value, "Invalid port left unassigned");
                *port = None;
            }
        }
    });
}

fn pod_template(templates: &Templates, name: Option<&str>) -> Option<PodTemplate> {
    let name = name?;
    let found = templates.pod_template(name).cloned();
    if found.is_none() {
        warn!(template = name, "Unknown pod template");
    }
    found
}

fn service_template(templates: &Templates, name: Option<&str>) -> Option<ServiceTemplate> {
    let name = name?;
    let found = templates.service_template(name).cloned();
    if found.is_none() {
        warn!(template = name, "Unknown service template");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use chop_types::{HostPorts, ReplicaSchemaPolicy, ShardSchemaPolicy};

    fn normalize(source: &str) -> Installation {
        Normalizer::default().normalize_yaml(source).unwrap()
    }

    fn host_names(cluster: &Cluster) -> Vec<&str> {
        cluster.hosts().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn test_layout_counts_expand_to_hosts() {
        let chi = normalize(
            r#"
namespace: dev
name: demo
clusters:
  - name: main
    layout:
      shardsCount: 2
      replicasCount: 2
"#,
        );
        let cluster = &chi.clusters[0];
        assert_eq!(host_names(cluster), vec!["0-0", "0-1", "1-0", "1-1"]);
        assert_eq!(cluster.replicas().len(), 2);

        let host = &cluster.layout.shards[1].hosts[0];
        let address = host.address();
        assert_eq!(address.shard_index, 1);
        assert_eq!(address.replica_index, 0);
        assert_eq!(address.shard_scope_index, 0);
        assert_eq!(address.replica_scope_index, 1);
        assert_eq!(address.cluster_scope_index, 2);
        assert_eq!(address.installation_scope_index, 2);
        assert_eq!(address.namespace, "dev");
        assert_eq!(address.installation_name, "demo");
    }

    #[test]
    fn test_empty_layout_gets_one_host() {
        let chi = normalize("namespace: dev\nname: demo\nclusters:\n  - name: main\n");
        assert_eq!(host_names(&chi.clusters[0]), vec!["0-0"]);
    }

    #[test]
    fn test_widest_shard_sets_replica_count() {
        let chi = normalize(
            r#"
namespace: dev
name: demo
clusters:
  - name: main
    layout:
      shards:
        - name: east
          replicas:
            - name: ""
            - name: ""
            - name: ""
        - name: west
"#,
        );
        let cluster = &chi.clusters[0];
        assert_eq!(cluster.layout.replicas_count, 3);
        assert_eq!(
            host_names(cluster),
            vec!["east-0", "east-1", "east-2", "west-0", "west-1", "west-2"]
        );
    }

    #[test]
    fn test_scope_cycles() {
        let mut normalizer = Normalizer::new(Options {
            installation_cycle_size: 3,
            ..Default::default()
        });
        let chi = normalizer
            .normalize_yaml(
                r#"
namespace: dev
name: demo
clusters:
  - name: a
    layout: {replicasCount: 2}
  - name: b
    layout: {replicasCount: 2}
"#,
            )
            .unwrap();

        let placements: Vec<_> = chi
            .hosts()
            .map(|h| {
                let a = h.address();
                (
                    a.installation_scope_index,
                    a.installation_scope_cycle.index,
                    a.installation_scope_cycle.offset,
                    a.cluster_scope_index,
                    a.cluster_scope_cycle.offset,
                )
            })
            .collect();
        assert_eq!(
            placements,
            vec![(0, 0, 0, 0, 0), (1, 0, 1, 1, 1), (2, 0, 2, 0, 0), (3, 1, 0, 1, 1)]
        );
        assert!(chi.hosts().all(|h| h.address().installation_scope_cycle.size == 3));
        assert_eq!(chi.clusters[1].address().cluster_index, 1);
    }

    #[test]
    fn test_legacy_host_names_are_regenerated() {
        let chi = normalize(
            r#"
namespace: dev
name: demo
clusters:
  - name: main
    layout:
      shards:
        - name: east
          replicas:
            - name: "0"
            - name: keeper
"#,
        );
        assert_eq!(host_names(&chi.clusters[0]), vec!["east-0", "keeper"]);
        let keeper = &chi.clusters[0].layout.shards[0].hosts[1];
        assert_eq!(keeper.address().host_name, "keeper");
        assert_eq!(keeper.address().replica_name, "1");
    }

    #[test]
    fn test_invalid_ports_become_unassigned() {
        let chi = normalize(
            r#"
namespace: dev
name: demo
clusters:
  - name: main
    layout:
      shards:
        - replicas:
            - tcpPort: 9000
              httpPort: 70000
              interserverHttpPort: 0
"#,
        );
        let host = &chi.clusters[0].layout.shards[0].hosts[0];
        assert_eq!(
            host.ports,
            HostPorts {
                tcp_port: Some(9000),
                http_port: None,
                interserver_http_port: None,
            }
        );
    }

    #[test]
    fn test_templates_resolve_and_inherit() {
        let chi = normalize(
            r#"
namespace: dev
name: demo
defaults:
  templates:
    podTemplate: default-pod
    hostServiceTemplate: missing
templates:
  podTemplates:
    - name: default-pod
      generateName: "pod-{chi}-{host}"
    - name: big-pod
  serviceTemplates:
    - name: cluster-svc
      generateName: "svc-{cluster}"
    - name: replica-svc
      generateName: "replica-{replica}"
clusters:
  - name: main
    templates:
      clusterServiceTemplate: cluster-svc
    layout:
      shardsCount: 1
      replicas:
        - name: ""
        - name: ""
          templates:
            replicaServiceTemplate: replica-svc
  - name: side
    templates:
      podTemplate: big-pod
"#,
        );
        let main = &chi.clusters[0];
        assert_eq!(
            main.service_template().and_then(|t| t.generate_name.as_deref()),
            Some("svc-{cluster}")
        );

        let first = &main.layout.shards[0].hosts[0];
        let second = &main.layout.shards[0].hosts[1];
        assert_eq!(first.pod_template().map(|t| t.name.as_str()), Some("default-pod"));
        assert!(first.replica_service_template().is_none());
        assert_eq!(
            second.replica_service_template().map(|t| t.name.as_str()),
            Some("replica-svc")
        );
        assert!(first.service_template().is_none());

        let side = chi.clusters[1].hosts().next().unwrap();
        assert_eq!(side.pod_template().map(|t| t.name.as_str()), Some("big-pod"));
    }

    #[test]
    fn test_schema_policy_defaults() {
        let chi = normalize("namespace: dev\nname: demo\nclusters:\n  - name: main\n");
        let policy = chi.clusters[0].schema_policy;
        assert_eq!(policy.replica, ReplicaSchemaPolicy::All);
        assert_eq!(policy.shard, ShardSchemaPolicy::All);
    }

    #[test]
    fn test_fqdn_default_from_options() {
        let mut normalizer = Normalizer::new(Options {
            replicas_use_fqdn: true,
            ..Default::default()
        });
        let chi = normalizer.normalize(Installation::new("dev", "demo")).unwrap();
        assert!(chi.replicas_use_fqdn());

        let mut explicit = Installation::new("dev", "demo");
        explicit.defaults.replicas_use_fqdn = Some(false);
        let chi = normalizer.normalize(explicit).unwrap();
        assert!(!chi.replicas_use_fqdn());
        assert!(normalizer.context().target().is_none());
    }

    #[test]
    fn test_normalization_is_repeatable() {
        let source = r#"
namespace: dev
name: demo
clusters:
  - name: main
    layout: {shardsCount: 3, replicasCount: 2}
"#;
        let once = normalize(source);
        let twice = Normalizer::default().normalize(once.clone()).unwrap();
        assert_eq!(once, twice);
        let addresses: Vec<_> = once.hosts().map(|h| h.address().clone()).collect();
        let again: Vec<_> = twice.hosts().map(|h| h.address().clone()).collect();
        assert_eq!(addresses, again);
    }

    #[test]
    fn test_validation_errors() {
        let mut normalizer = Normalizer::default();
        assert!(matches!(
            normalizer.normalize(Installation::new("", "demo")),
            Err(NormalizerError::MissingIdentity { field: "namespace" })
        ));

        let mut chi = Installation::new("dev", "demo");
        chi.clusters.push(Cluster::new("main"));
        chi.clusters.push(Cluster::new("main"));
        assert!(matches!(
            normalizer.normalize(chi),
            Err(NormalizerError::DuplicateCluster(name)) if name == "main"
        ));

        assert!(matches!(
            normalizer.normalize_yaml("clusters: 12"),
            Err(NormalizerError::Spec(_))
        ));
    }
}
