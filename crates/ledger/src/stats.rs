use {
    crate::client::TxEntry,
    model::TxState,
    serde::{Deserialize, Serialize},
};

/// Aggregated ledger statistics (§4.A `stats()`): counts by state, mean
/// confirmation latency, and total gas spent across all tracked transactions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    pub queued: usize,
    pub submitted: usize,
    pub confirmed: usize,
    pub failed: usize,
    pub avg_confirmation_ms: f64,
    pub total_gas_used: u64,
}

impl Stats {
    pub(crate) fn summarize<'a>(entries: impl Iterator<Item = &'a TxEntry>) -> Self {
        let mut stats = Stats::default();
        let mut latencies = Vec::new();
        for entry in entries {
            match entry.tx.state {
                TxState::Queued => stats.queued += 1,
                TxState::Submitted => stats.submitted += 1,
                TxState::Confirmed => stats.confirmed += 1,
                TxState::Failed => stats.failed += 1,
            }
            if let Some(gas) = entry.tx.gas_used {
                stats.total_gas_used += gas;
            }
            if let (Some(submitted), Some(confirmed)) = (entry.submitted_at, entry.confirmed_at) {
                latencies.push(confirmed.duration_since(submitted).as_millis() as f64);
            }
        }
        if !latencies.is_empty() {
            stats.avg_confirmation_ms = latencies.iter().sum::<f64>() / latencies.len() as f64;
        }
        stats
    }
}
