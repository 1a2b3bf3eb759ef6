//! Assembles an `exporter::Snapshot` from the Coordinator's own state and
//! hands it to the Analytical Exporter (§4.E, §6.1 `exportSimulation`).

use {crate::Coordinator, chrono::Utc, model::RunId};

impl Coordinator {
    /// Connects to `config.database_url`, builds a snapshot of everything
    /// observed since construction, and writes it as a single transaction.
    /// Fails with `exporter::Error::DuplicateRun` if `run_id` was already
    /// exported and `overwrite` is false (§4.E).
    #[tracing::instrument(skip(self, config))]
    pub async fn export_simulation(
        &self,
        run_id: RunId,
        config: &exporter::Config,
        overwrite: bool,
    ) -> Result<(), exporter::Error> {
        let snapshot = exporter::Snapshot {
            run_id,
            started_at: self.started_at,
            ended_at: Utc::now(),
            config: serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null),
            counts: self.store.counts(),
            agents: self.store.list_agents(),
            requests: self.store.list_requests(),
            segments: self.store.list_segments(),
            bundles: self.store.list_bundles(),
            reservations: self.store.list_reservations(),
            matches: self.store.list_matches(),
            tick_aggregates: self.store.tick_aggregates(),
            ledger_stats: self.ledger.stats(),
        };
        let pool = exporter::connect(config).await?;
        exporter::export(&pool, &snapshot, overwrite).await
    }
}
