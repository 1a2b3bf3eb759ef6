use {ledger::Stats as LedgerStats, marketplace::StoreCounts, serde::Serialize};

/// Aggregated counts across the store and the ledger (§6.1 `stats()`).
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub store: StoreCounts,
    pub ledger: LedgerStats,
}
