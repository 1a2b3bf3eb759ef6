//! The transaction counts-by-state and gas totals that `stats()` (§4.A)
//! reports are exposed directly as Prometheus gauges, so `Stats` is a thin
//! read of the same numbers the metrics endpoint would serve (§10.5).

use crate::stats::Stats;

#[derive(prometheus_metric_storage::MetricStorage)]
pub struct Metrics {
    /// Transactions currently in each lifecycle state.
    #[metric(labels("state"))]
    tx_by_state: prometheus::IntGaugeVec,
    /// Cumulative gas used across confirmed and failed transactions.
    total_gas_used: prometheus::IntGauge,
    /// Mean time from submission to confirmation, in milliseconds.
    avg_confirmation_ms: prometheus::Gauge,
}

impl Metrics {
    fn get() -> &'static Self {
        Metrics::instance(observe::metrics::registry()).expect("metric registration never fails")
    }

    /// Publishes a freshly summarized `Stats` to the shared registry.
    pub(crate) fn record(stats: &Stats) {
        let metrics = Self::get();
        metrics.tx_by_state.with_label_values(&["queued"]).set(stats.queued as i64);
        metrics.tx_by_state.with_label_values(&["submitted"]).set(stats.submitted as i64);
        metrics.tx_by_state.with_label_values(&["confirmed"]).set(stats.confirmed as i64);
        metrics.tx_by_state.with_label_values(&["failed"]).set(stats.failed as i64);
        metrics.total_gas_used.set(stats.total_gas_used as i64);
        metrics.avg_confirmation_ms.set(stats.avg_confirmation_ms);
    }
}
