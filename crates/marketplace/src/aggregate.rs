//! Per-tick snapshots of store-wide counts, recorded by `tick()` so the
//! analytical exporter can write the "per-tick aggregates" table (§4.E item
//! 8) without replaying the whole run from scratch.

use {model::Mode, std::collections::HashMap};

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct TickAggregate {
    pub tick: u64,
    pub requests_open: usize,
    pub segments_open: usize,
    pub mean_segment_price: f64,
    pub mode_histogram: HashMap<Mode, usize>,
}
