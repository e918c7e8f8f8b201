//! Metrics writer
//!
//! Rows read from database introspection tables are turned into single-sample
//! Prometheus metric families and handed to a consumer channel. Publishing
//! waits at most the configured timeout; a value the consumer does not take
//! in time is dropped so the collection loop never stalls.

use prometheus::proto::{Counter, Gauge, LabelPair, Metric, MetricFamily, MetricType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Namespace of every exported metric
pub const METRIC_NAMESPACE: &str = "chi";

/// Subsystem of every exported metric
pub const METRIC_SUBSYSTEM: &str = "clickhouse";

const NO_LABELS: &[(&str, &str)] = &[];

const FETCH_STATUS_HELP: &str =
    "status of fetching metrics from ClickHouse 1 - unsuccessful, 0 - successful";

/// Metrics section of the operator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Longest wait for the consumer to accept one metric
    pub publish_timeout_ms: u64,

    /// Capacity of the hand-off channel
    pub channel_capacity: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            publish_timeout_ms: 10_000,
            channel_capacity: 1024,
        }
    }
}

impl MetricsConfig {
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }

    /// Hand-off channel sized from this configuration
    pub fn channel(&self) -> (mpsc::Sender<MetricFamily>, MetricsReceiver) {
        mpsc::channel(self.channel_capacity.max(1))
    }

    /// Writer for one host together with the consumer end of its channel
    pub fn writer(
        &self,
        chi: WatchedInstallation,
        hostname: impl Into<String>,
    ) -> (MetricsWriter, MetricsReceiver) {
        let (tx, rx) = self.channel();
        (MetricsWriter::from_config(tx, chi, hostname, self), rx)
    }
}

/// Consumer end of the metrics hand-off
pub type MetricsReceiver = mpsc::Receiver<MetricFamily>;

/// Sample type of a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    /// `counter` selects a counter, anything else a gauge
    pub fn parse(kind: &str) -> Self {
        if kind == "counter" {
            MetricKind::Counter
        } else {
            MetricKind::Gauge
        }
    }
}

/// Installation the scraped host belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchedInstallation {
    pub namespace: String,
    pub name: String,
    /// Metadata labels copied onto every metric
    pub labels: BTreeMap<String, String>,
}

/// Replace every character Prometheus does not allow in a name with `_`
pub fn sanitize_metric_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Fully qualified name: `chi_clickhouse_<name>`
pub fn metric_name(name: &str) -> String {
    format!(
        "{METRIC_NAMESPACE}_{METRIC_SUBSYSTEM}_{}",
        sanitize_metric_name(name)
    )
}

fn label_name(name: &str) -> String {
    sanitize_metric_name(name).replace(':', "_")
}

fn label_pair(name: &str, value: &str) -> LabelPair {
    let mut pair = LabelPair::default();
    pair.set_name(label_name(name));
    pair.set_value(value.to_string());
    pair
}

/// Writes metrics of one host to the consumer channel
#[derive(Debug, Clone)]
pub struct MetricsWriter {
    out: mpsc::Sender<MetricFamily>,
    chi: WatchedInstallation,
    hostname: String,
    timeout: Duration,
}

impl MetricsWriter {
    pub fn new(
        out: mpsc::Sender<MetricFamily>,
        chi: WatchedInstallation,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            out,
            chi,
            hostname: hostname.into(),
            timeout: MetricsConfig::default().publish_timeout(),
        }
    }

    /// Writer publishing with the configured timeout
    pub fn from_config(
        out: mpsc::Sender<MetricFamily>,
        chi: WatchedInstallation,
        hostname: impl Into<String>,
        config: &MetricsConfig,
    ) -> Self {
        Self::new(out, chi, hostname).with_timeout(config.publish_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Generic rows: `name, value, description, kind`
    pub async fn write_metrics(&self, rows: &[Vec<String>]) {
        for row in rows {
            let [name, value, help, kind, ..] = row.as_slice() else {
                debug!(columns = row.len(), "Skipping short metrics row");
                continue;
            };
            self.write_single(name, help, MetricKind::parse(kind), value, NO_LABELS)
                .await;
        }
    }

    /// Rows: `database, table, active, partitions, parts, bytes, uncompressed_bytes, rows`
    pub async fn write_table_sizes(&self, rows: &[Vec<String>]) {
        for row in rows {
            let [database, table, active, partitions, parts, bytes, uncompressed, count, ..] =
                row.as_slice()
            else {
                debug!(columns = row.len(), "Skipping short table size row");
                continue;
            };
            let labels = [("database", database), ("table", table), ("active", active)];
            let labels = labels.map(|(n, v)| (n, v.as_str()));
            for (name, help, value) in [
                ("table_partitions", "Number of partitions of the table", partitions),
                ("table_parts", "Number of parts of the table", parts),
                ("table_parts_bytes", "Table size in bytes", bytes),
                (
                    "table_parts_bytes_uncompressed",
                    "Table size in bytes uncompressed",
                    uncompressed,
                ),
                ("table_parts_rows", "Number of rows in the table", count),
            ] {
                self.write_single(name, help, MetricKind::Gauge, value, &labels)
                    .await;
            }
        }
    }

    /// Rows ending in `disk data bytes, primary key bytes`, summed over all rows
    pub async fn write_system_parts(&self, rows: &[Vec<String>]) {
        let mut disk_data_bytes: i64 = 0;
        let mut primary_key_bytes: i64 = 0;
        for row in rows {
            let [.., disk, primary_key] = row.as_slice() else {
                continue;
            };
            disk_data_bytes = disk_data_bytes.saturating_add(parse_integer(disk));
            primary_key_bytes = primary_key_bytes.saturating_add(parse_integer(primary_key));
        }

        self.write_metrics(&[
            vec![
                "metric.DiskDataBytes".to_string(),
                disk_data_bytes.to_string(),
                "Total data size for all ClickHouse tables".to_string(),
                "gauge".to_string(),
            ],
            vec![
                "metric.MemoryPrimaryKeyBytesAllocated".to_string(),
                primary_key_bytes.to_string(),
                "Memory size allocated for primary keys".to_string(),
                "gauge".to_string(),
            ],
        ])
        .await;
    }

    /// Rows: `database, table, is_session_expired`
    pub async fn write_system_replicas(&self, rows: &[Vec<String>]) {
        for row in rows {
            let [database, table, expired, ..] = row.as_slice() else {
                continue;
            };
            self.write_single(
                "system_replicas_is_session_expired",
                "Number of expired Zookeeper sessions of the table",
                MetricKind::Gauge,
                expired,
                &[("database", database), ("table", table)],
            )
            .await;
        }
    }

    /// Rows: `database, table, mutations, parts_to_do`
    pub async fn write_mutations(&self, rows: &[Vec<String>]) {
        for row in rows {
            let [database, table, mutations, parts_to_do, ..] = row.as_slice() else {
                continue;
            };
            let labels = [("database", database.as_str()), ("table", table.as_str())];
            self.write_single(
                "table_mutations",
                "Number of active mutations for the table",
                MetricKind::Gauge,
                mutations,
                &labels,
            )
            .await;
            self.write_single(
                "table_mutations_parts_to_do",
                "Number of data parts that need to be mutated for the mutation to finish",
                MetricKind::Gauge,
                parts_to_do,
                &labels,
            )
            .await;
        }
    }

    /// Rows: `disk, free_bytes, total_bytes`
    pub async fn write_system_disks(&self, rows: &[Vec<String>]) {
        for row in rows {
            let [disk, free, total, ..] = row.as_slice() else {
                continue;
            };
            let labels = [("disk", disk.as_str())];
            self.write_single(
                "metric_DiskFreeBytes",
                "Free disk space available from system.disks",
                MetricKind::Gauge,
                free,
                &labels,
            )
            .await;
            self.write_single(
                "metric_DiskTotalBytes",
                "Total disk space available from system.disks",
                MetricKind::Gauge,
                total,
                &labels,
            )
            .await;
        }
    }

    /// Rows: `count, database, table, disk, reason`
    pub async fn write_detached_parts(&self, rows: &[Vec<String>]) {
        for row in rows {
            let [count, database, table, disk, reason, ..] = row.as_slice() else {
                continue;
            };
            self.write_single(
                "metric_DetachedParts",
                "Count of currently detached parts from system.detached_parts",
                MetricKind::Gauge,
                count,
                &[
                    ("database", database),
                    ("table", table),
                    ("disk", disk),
                    ("reason", reason),
                ],
            )
            .await;
        }
    }

    /// Record a failed fetch of `fetch_type`
    pub async fn write_error_fetch(&self, fetch_type: &str) {
        self.write_fetch_status(fetch_type, "1").await;
    }

    /// Record a successful fetch of `fetch_type`
    pub async fn write_ok_fetch(&self, fetch_type: &str) {
        self.write_fetch_status(fetch_type, "0").await;
    }

    async fn write_fetch_status(&self, fetch_type: &str, value: &str) {
        self.write_single(
            "metric_fetch_errors",
            FETCH_STATUS_HELP,
            MetricKind::Gauge,
            value,
            &[("fetch_type", fetch_type)],
        )
        .await;
    }

    /// Identity labels, then installation labels, then `row` labels
    ///
    /// An installation label whose sanitized name is already taken by an
    /// identity or row label is skipped, as is a second installation label
    /// sanitizing to the same name. Label names stay unique.
    fn labels<S: AsRef<str>>(&self, row: &[(&str, S)]) -> Vec<LabelPair> {
        let mut taken: BTreeSet<String> = ["chi", "namespace", "hostname"]
            .into_iter()
            .map(String::from)
            .collect();
        taken.extend(row.iter().map(|(n, _)| label_name(n)));

        let mut labels = vec![
            label_pair("chi", &self.chi.name),
            label_pair("namespace", &self.chi.namespace),
        ];
        for (key, value) in &self.chi.labels {
            if !taken.insert(label_name(key)) {
                debug!(label = %key, "Skipping installation label with a taken name");
                continue;
            }
            labels.push(label_pair(key, value));
        }
        labels.push(label_pair("hostname", &self.hostname));
        labels.extend(row.iter().map(|(n, v)| label_pair(n, v.as_ref())));
        labels
    }

    fn family<S: AsRef<str>>(
        &self,
        name: &str,
        help: &str,
        kind: MetricKind,
        value: f64,
        labels: &[(&str, S)],
    ) -> MetricFamily {
        let pairs = self.labels(labels);

        let mut metric = Metric::default();
        metric.set_label(pairs.into());

        let mut family = MetricFamily::default();
        match kind {
            MetricKind::Gauge => {
                let mut gauge = Gauge::default();
                gauge.set_value(value);
                metric.set_gauge(gauge);
                family.set_field_type(MetricType::GAUGE);
            }
            MetricKind::Counter => {
                let mut counter = Counter::default();
                counter.set_value(value);
                metric.set_counter(counter);
                family.set_field_type(MetricType::COUNTER);
            }
        }
        family.set_name(metric_name(name));
        family.set_help(help.to_string());
        family.set_metric(vec![metric].into());
        family
    }

    /// Build and publish one sample; returns whether the consumer took it
    async fn write_single<S: AsRef<str>>(
        &self,
        name: &str,
        help: &str,
        kind: MetricKind,
        value: &str,
        labels: &[(&str, S)],
    ) -> bool {
        let value = parse_float(name, value);
        let family = self.family(name, help, kind, value, labels);

        match tokio::time::timeout(self.timeout, self.out.send(family)).await {
            Ok(Ok(())) => true,
            Ok(Err(_)) => {
                warn!(metric = name, "Metrics consumer is gone, dropping value");
                false
            }
            Err(_) => {
                warn!(
                    metric = name,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Metrics consumer did not accept value in time, dropping it"
                );
                false
            }
        }
    }
}

fn parse_float(name: &str, value: &str) -> f64 {
    match value.trim().parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            warn!(metric = name, value, "Non-numeric metric value, using 0");
            0.0
        }
    }
}

fn parse_integer(value: &str) -> i64 {
    match value.trim().parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            debug!(value, "Non-integer system.parts value, using 0");
            0
        }
    }
}
