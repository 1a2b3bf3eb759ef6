//! A single process-wide Prometheus registry, so every crate's
//! `prometheus_metric_storage::MetricStorage` struct registers against the
//! same collector regardless of which crate constructs it first.

use std::sync::OnceLock;

static REGISTRY: OnceLock<prometheus::Registry> = OnceLock::new();

/// Returns the shared registry, creating it on first use.
pub fn registry() -> &'static prometheus::Registry {
    REGISTRY.get_or_init(prometheus::Registry::new)
}

/// Encodes the current state of every registered metric in the Prometheus
/// text exposition format. The out-of-scope dashboard (§1) is the only
/// consumer; the core just needs to make the numbers observable.
pub fn encode() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let families = registry().gather();
    let mut buf = Vec::new();
    encoder.encode(&families, &mut buf).unwrap_or_default();
    String::from_utf8(buf).unwrap_or_default()
}
