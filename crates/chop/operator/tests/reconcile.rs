//! Full reconciliation passes against an in-memory schema source

use async_trait::async_trait;
use chop_operator::{OperatorConfig, OperatorError, Reconciler};
use chop_schemer::{cancellation, Cancellation, QueryExecutor, ReplicatedObjects, SchemerError};
use chop_types::Installation;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Answers every pass with fixed objects and records the peers it was asked
#[derive(Default)]
struct StaticSchema {
    fail: bool,
    peers: Mutex<Vec<Vec<String>>>,
}

impl StaticSchema {
    fn answer(
        &self,
        hosts: &[String],
        pairs: &[(&str, &str)],
    ) -> chop_schemer::Result<ReplicatedObjects> {
        self.peers.lock().unwrap().push(hosts.to_vec());
        if self.fail {
            return Err(SchemerError::Executor("peer unreachable".into()));
        }
        ReplicatedObjects::new(
            pairs.iter().map(|(n, _)| n.to_string()).collect(),
            pairs.iter().map(|(_, s)| s.to_string()).collect(),
        )
    }
}

#[async_trait]
impl QueryExecutor for StaticSchema {
    async fn query_pairs(
        &self,
        hosts: &[String],
        sql: &str,
        _cancel: &Cancellation,
    ) -> chop_schemer::Result<ReplicatedObjects> {
        if sql.contains("system.databases") {
            self.answer(hosts, &[("events", "CREATE DATABASE events ENGINE = Replicated")])
        } else {
            self.answer(hosts, &[("to_day", "CREATE FUNCTION to_day AS x -> x")])
        }
    }

    async fn query_pairs_applying_uuids(
        &self,
        hosts: &[String],
        _sql: &str,
        _cancel: &Cancellation,
    ) -> chop_schemer::Result<ReplicatedObjects> {
        self.answer(
            hosts,
            &[
                ("events.hits", "CREATE TABLE events.hits (d Date) ENGINE = ReplicatedMergeTree"),
                ("events", "CREATE DATABASE events"),
            ],
        )
    }
}

fn spec(shards: usize, replicas: usize) -> Installation {
    let source = format!(
        "namespace: prod\nname: web\nclusters:\n  - name: main\n    layout: {{shardsCount: {shards}, replicasCount: {replicas}}}\n"
    );
    Installation::from_yaml(&source).unwrap()
}

#[tokio::test]
async fn test_full_pass_plans_every_host() {
    let mut reconciler = Reconciler::new(OperatorConfig::default());
    let schemer = reconciler.schemer(StaticSchema::default());
    let cancel = Cancellation::never();

    let report = reconciler
        .reconcile(spec(1, 2), &schemer, &cancel)
        .await
        .unwrap();

    assert!(!report.cancelled);
    assert!(report.finished_at >= report.started_at);
    assert_eq!(report.topology.hosts().count(), 2);
    assert_eq!(report.schema.len(), 2);

    let first = &report.schema[0];
    assert_eq!(first.host, "0-0");
    assert_eq!(first.cluster, "main");
    let names: Vec<_> = first.objects.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["events", "events.hits", "to_day"]);
    assert_eq!(report.planned_objects(), 6);

    // Peers never include the host being planned
    let peers = schemer.executor().peers.lock().unwrap();
    assert!(peers
        .iter()
        .all(|hosts| hosts.len() == 1 && hosts[0].ends_with(".prod.svc.cluster.local")));
}

#[tokio::test]
async fn test_single_host_needs_no_schema() {
    let mut reconciler = Reconciler::new(OperatorConfig::default());
    let schemer = reconciler.schemer(StaticSchema::default());

    let report = reconciler
        .reconcile(spec(1, 1), &schemer, &Cancellation::never())
        .await
        .unwrap();

    assert_eq!(report.schema.len(), 1);
    assert!(report.schema[0].objects.is_empty());
    assert!(schemer.executor().peers.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cancelled_pass_plans_nothing() {
    let mut reconciler = Reconciler::new(OperatorConfig::default());
    let schemer = reconciler.schemer(StaticSchema::default());
    let (handle, cancel) = cancellation();
    handle.cancel();

    let report = reconciler
        .reconcile(spec(2, 2), &schemer, &cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.planned_objects(), 0);
    assert_eq!(report.topology.hosts().count(), 4);
    assert!(schemer.executor().peers.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_peer_failure_fails_the_pass() {
    let mut reconciler = Reconciler::new(OperatorConfig::default());
    let schemer = reconciler.schemer(StaticSchema {
        fail: true,
        ..Default::default()
    });

    let result = reconciler
        .reconcile(spec(1, 2), &schemer, &Cancellation::never())
        .await;

    assert!(matches!(result, Err(OperatorError::Schema(_))));
}

#[tokio::test]
async fn test_invalid_specification_stops_before_planning() {
    let mut reconciler = Reconciler::new(OperatorConfig::default());
    let schemer = reconciler.schemer(StaticSchema::default());

    let result = reconciler
        .reconcile(Installation::new("", "web"), &schemer, &Cancellation::never())
        .await;

    assert!(matches!(result, Err(OperatorError::Normalize(_))));
    assert!(schemer.executor().peers.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_metrics_writer_uses_configured_timeout() {
    let mut config = OperatorConfig::default();
    config.metrics.publish_timeout_ms = 50;
    config.metrics.channel_capacity = 1;
    let mut reconciler = Reconciler::new(config);
    let chi = reconciler.normalize(spec(1, 1)).unwrap();
    let host = chi.hosts().next().unwrap();

    let (writer, mut rx) = reconciler.metrics_writer(&chi, host);
    writer.write_ok_fetch("system.metrics").await;

    // Nobody drains the full channel; each publish gives up after 50ms
    let started = Instant::now();
    for _ in 0..3 {
        writer.write_error_fetch("system.parts").await;
    }
    assert!(started.elapsed() < Duration::from_secs(2));

    let family = rx.try_recv().unwrap();
    let hostname = family.get_metric()[0]
        .get_label()
        .iter()
        .find(|l| l.get_name() == "hostname")
        .map(|l| l.get_value().to_string());
    assert_eq!(hostname.as_deref(), Some("chi-web-main-0-0.prod.svc.cluster.local"));
    assert!(rx.try_recv().is_err());
}
