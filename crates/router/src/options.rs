use {model::Mode, std::collections::HashSet};

/// Tunables for `build`, all with the defaults named in §4.C.
#[derive(Debug, Clone)]
pub struct Options {
    /// Max path length in edges.
    pub max_transfers: usize,
    /// Max wait time between consecutive segments, in ticks.
    pub time_tolerance: u64,
    /// Point-equality tolerance.
    pub nearness_epsilon: f64,
    /// Ignore segments departing before `startTime` or after `startTime +
    /// time_window`.
    pub time_window: u64,
    /// Optional allow-list of modes.
    pub mode_filter: Option<HashSet<Mode>>,
    pub max_results: usize,
    pub per_segment_discount: f64,
    pub max_discount_rate: f64,
    pub wait_penalty_weight: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_transfers: 3,
            time_tolerance: 5,
            nearness_epsilon: 0.5,
            // The spec names the knob but not a default; 500 ticks comfortably
            // covers a multi-transfer bundle under the default time tolerance
            // and max-transfers without scanning the whole simulation horizon.
            time_window: 500,
            mode_filter: None,
            max_results: 10,
            per_segment_discount: 0.05,
            max_discount_rate: 0.15,
            wait_penalty_weight: 0.5,
        }
    }
}
