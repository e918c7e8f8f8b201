//! Consumer side of the metrics hand-off

use crate::error::Result;
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, TextEncoder};
use tokio::sync::mpsc;

/// Take every family already queued without waiting for more
pub fn drain_available(rx: &mut mpsc::Receiver<MetricFamily>) -> Vec<MetricFamily> {
    let mut families = Vec::new();
    while let Ok(family) = rx.try_recv() {
        families.push(family);
    }
    families
}

/// Prometheus text exposition of `families`
pub fn encode_text(families: &[MetricFamily]) -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
