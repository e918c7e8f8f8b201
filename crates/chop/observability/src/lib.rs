//! CHOP Observability
//!
//! Metrics hand-off and tracing setup for the operator.
//!
//! ## Features
//!
//! - **Metrics**: [`MetricsWriter`] turns introspection rows into
//!   Prometheus metric families and publishes them with a bounded wait
//! - **Export**: text exposition of collected families
//! - **Logging**: `tracing-subscriber` initialisation from [`LoggingConfig`]

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod export;
pub mod logging;
pub mod metrics;

pub use error::{ObservabilityError, Result};
pub use export::{drain_available, encode_text};
pub use logging::{init_tracing, LoggingConfig};
pub use metrics::{
    metric_name, sanitize_metric_name, MetricKind, MetricsConfig, MetricsReceiver,
    MetricsWriter, WatchedInstallation,
};
