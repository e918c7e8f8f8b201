//! Reconciliation pass: normalize, name, plan schema

use crate::config::OperatorConfig;
use crate::error::Result;
use crate::report::{
    ClusterReport, HostReport, HostSchemaPlan, ReconcileReport, ShardReport, TopologyReport,
};
use chop_naming::{Namer, PatternRegistry};
use chop_normalizer::Normalizer;
use chop_observability::{MetricsReceiver, MetricsWriter, WatchedInstallation};
use chop_schemer::{Cancellation, ClusterSchemer, QueryExecutor};
use chop_types::{Cluster, Host, Installation, Shard};
use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Drives one installation through a full pass
pub struct Reconciler {
    config: OperatorConfig,
    normalizer: Normalizer,
    namer: Namer,
}

impl Reconciler {
    pub fn new(config: OperatorConfig) -> Self {
        Self::with_registry(config, PatternRegistry::default())
    }

    /// Reconciler with a non-default set of name patterns
    pub fn with_registry(config: OperatorConfig, registry: PatternRegistry) -> Self {
        Self {
            normalizer: Normalizer::new(config.normalization.clone()),
            namer: Namer::new(config.naming.budgets, registry),
            config,
        }
    }

    pub fn config(&self) -> &OperatorConfig {
        &self.config
    }

    pub fn namer(&self) -> &Namer {
        &self.namer
    }

    /// Schema planner sharing this reconciler's naming rules
    pub fn schemer<E: QueryExecutor>(&self, executor: E) -> ClusterSchemer<E> {
        ClusterSchemer::new(executor, self.namer.clone())
    }

    /// Metrics writer for one host, publishing under the configured timeout
    pub fn metrics_writer(
        &self,
        chi: &Installation,
        host: &Host,
    ) -> (MetricsWriter, MetricsReceiver) {
        let watched = WatchedInstallation {
            namespace: chi.namespace.clone(),
            name: chi.name.clone(),
            ..Default::default()
        };
        self.config
            .metrics
            .writer(watched, self.namer.pod_fqdn(chi, host))
    }

    /// Normalize a YAML (or JSON) specification
    pub fn normalize_yaml(&mut self, source: &str) -> Result<Installation> {
        Ok(self.normalizer.normalize_yaml(source)?)
    }

    pub fn normalize(&mut self, raw: Installation) -> Result<Installation> {
        Ok(self.normalizer.normalize(raw)?)
    }

    /// Every derived name of a normalized installation
    pub fn topology(&self, chi: &Installation) -> TopologyReport {
        let namer = &self.namer;
        TopologyReport {
            namespace: chi.namespace.clone(),
            name: chi.name.clone(),
            service: namer.installation_service_name(chi),
            service_fqdn: namer.installation_service_fqdn(chi),
            config_map_common: namer.config_map_common_name(chi),
            config_map_common_users: namer.config_map_common_users_name(chi),
            pod_hostname_regexp: namer
                .pod_hostname_regexp(chi, &self.config.naming.pod_hostname_regexp),
            clusters: chi
                .clusters
                .iter()
                .map(|cluster| self.cluster_report(chi, cluster))
                .collect(),
        }
    }

    fn cluster_report(&self, chi: &Installation, cluster: &Cluster) -> ClusterReport {
        ClusterReport {
            name: cluster.name.clone(),
            service: self.namer.cluster_service_name(cluster),
            pod_disruption_budget: self.namer.pod_disruption_budget_name(cluster),
            auto_secret: self.namer.cluster_auto_secret_name(cluster),
            shards: cluster
                .shards()
                .iter()
                .map(|shard| self.shard_report(chi, shard))
                .collect(),
        }
    }

    fn shard_report(&self, chi: &Installation, shard: &Shard) -> ShardReport {
        ShardReport {
            name: shard.name.clone(),
            service: self.namer.shard_service_name(shard),
            hosts: shard
                .hosts()
                .map(|host| self.host_report(chi, host))
                .collect(),
        }
    }

    fn host_report(&self, chi: &Installation, host: &Host) -> HostReport {
        let namer = &self.namer;
        HostReport {
            name: host.name.clone(),
            address: host.address().clone(),
            stateful_set: namer.stateful_set_name(host),
            service: namer.stateful_set_service_name(host),
            replica_service: namer.replica_service_name(host),
            pod: namer.pod_name(host),
            config_map: namer.config_map_host_name(host),
            fqdn: namer.pod_fqdn(chi, host),
            instance_hostname: namer.instance_hostname(chi, host),
            host_template: namer.host_template_name(host),
        }
    }

    /// Schema plans for every host, in walk order
    ///
    /// Up to `schema.max_concurrent_hosts` hosts are planned at a time. The
    /// first failing host fails the whole call.
    pub async fn plan_schema<E: QueryExecutor>(
        &self,
        chi: &Installation,
        schemer: &ClusterSchemer<E>,
        cancel: &Cancellation,
    ) -> Result<Vec<HostSchemaPlan>> {
        let limit = self.config.schema.max_concurrent_hosts.max(1);
        let plans = stream::iter(chi.hosts())
            .map(|host| async move {
                let objects = schemer.replicated_objects(chi, host, cancel).await?;
                Ok::<_, crate::error::OperatorError>(HostSchemaPlan::new(host.address(), &objects))
            })
            .buffered(limit)
            .try_collect::<Vec<_>>()
            .await?;

        Ok(plans)
    }

    /// Full pass over a raw specification
    #[instrument(skip_all, fields(namespace = %raw.namespace, installation = %raw.name))]
    pub async fn reconcile<E: QueryExecutor>(
        &mut self,
        raw: Installation,
        schemer: &ClusterSchemer<E>,
        cancel: &Cancellation,
    ) -> Result<ReconcileReport> {
        let pass_id = Uuid::new_v4();
        let started_at = Utc::now();
        debug!(%pass_id, "Reconcile pass started");

        let chi = self.normalize(raw)?;
        let topology = self.topology(&chi);
        let schema = self.plan_schema(&chi, schemer, cancel).await?;

        let report = ReconcileReport {
            pass_id,
            started_at,
            finished_at: Utc::now(),
            cancelled: cancel.is_cancelled(),
            topology,
            schema,
        };

        info!(
            %pass_id,
            hosts = chi.host_count(),
            objects = report.planned_objects(),
            cancelled = report.cancelled,
            "Reconcile pass finished"
        );
        Ok(report)
    }
}
