//! The immutable view of one completed run that `export` writes out. The
//! Coordinator assembles this from its store and ledger client; the
//! exporter itself never touches either (§3.4, "the Exporter consumes an
//! immutable snapshot of the store").

use {
    chrono::{DateTime, Utc},
    marketplace::{BundleRecord, StoreCounts, TickAggregate},
    model::{Agent, Match, Request, RunId, Segment},
};

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub config: serde_json::Value,
    pub counts: StoreCounts,
    pub agents: Vec<Agent>,
    pub requests: Vec<Request>,
    pub segments: Vec<Segment>,
    pub bundles: Vec<BundleRecord>,
    pub reservations: Vec<model::Reservation>,
    pub matches: Vec<Match>,
    pub tick_aggregates: Vec<TickAggregate>,
    pub ledger_stats: ledger::Stats,
}
