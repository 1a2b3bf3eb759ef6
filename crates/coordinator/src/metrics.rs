//! Counters/gauges for open requests, open segments, reservations by
//! settlement state, and router bundle-candidate counts (§10.5). Dashboards
//! that render these are out of scope (§1); the core only needs to make the
//! numbers observable.

use marketplace::StoreCounts;

#[derive(prometheus_metric_storage::MetricStorage)]
pub struct Metrics {
    requests_open: prometheus::IntGauge,
    requests_matched: prometheus::IntGauge,
    segments_open: prometheus::IntGauge,
    segments_held: prometheus::IntGauge,
    reservations_total: prometheus::IntGauge,
    matches_total: prometheus::IntGauge,
    /// Number of candidate bundles returned by a single `buildBundles` call.
    bundle_candidates: prometheus::Histogram,
}

impl Metrics {
    fn get() -> &'static Self {
        Metrics::instance(observe::metrics::registry()).expect("metric registration never fails")
    }

    pub(crate) fn record_store_counts(counts: &StoreCounts) {
        let metrics = Self::get();
        metrics.requests_open.set(counts.requests_open as i64);
        metrics.requests_matched.set(counts.requests_matched as i64);
        metrics.segments_open.set(counts.segments_open as i64);
        metrics.segments_held.set(counts.segments_held as i64);
        metrics.reservations_total.set(counts.reservations as i64);
        metrics.matches_total.set(counts.matches as i64);
    }

    pub(crate) fn observe_bundle_candidates(count: usize) {
        Self::get().bundle_candidates.observe(count as f64);
    }
}
