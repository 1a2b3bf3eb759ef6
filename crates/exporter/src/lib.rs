//! The Analytical Exporter: a transactional bulk write of one completed
//! simulation run's state to a relational store (§4.E).

mod schema;
mod snapshot;
mod write;

pub use snapshot::Snapshot;

use serde::{Deserialize, Serialize};

/// Connection configuration, deserializable from the same TOML manifest
/// style as `ledger::Config` (§10.4). `database_url` is any URL `sqlx::Any`
/// accepts -- `sqlite://path/to/file.db` or `postgres://...` -- the only
/// difference the rest of the system sees between a server-based and a
/// file-based engine (§4.E "Schema portability").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self { database_url: "sqlite::memory:".to_string() }
    }
}

impl Config {
    /// Parses a connection manifest in the same TOML style as
    /// `ledger::Config` (§10.4).
    pub fn from_toml_str(manifest: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(manifest)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("export failed: {0}")]
    ExportFailed(String),
    #[error("run {0} already exists; call export with overwrite=true to replace it")]
    DuplicateRun(String),
}

/// Opens a connection pool for `config.database_url`. Registers the
/// compiled-in `sqlx::Any` drivers on first use; safe to call repeatedly.
pub async fn connect(config: &Config) -> Result<sqlx::AnyPool, Error> {
    sqlx::any::install_default_drivers();
    sqlx::AnyPool::connect(&config.database_url)
        .await
        .map_err(|e| Error::ExportFailed(e.to_string()))
}

/// Writes `snapshot` to `pool` as a single all-or-nothing transaction
/// (§4.E). See [`write::export`] for the per-table dependency order.
pub async fn export(pool: &sqlx::AnyPool, snapshot: &Snapshot, overwrite: bool) -> Result<(), Error> {
    write::export(pool, snapshot, overwrite).await
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        chrono::Utc,
        marketplace::StoreCounts,
        model::{AgentId, RunId},
    };

    fn empty_snapshot(run_id: &str) -> Snapshot {
        Snapshot {
            run_id: RunId::from(run_id),
            started_at: Utc::now(),
            ended_at: Utc::now(),
            config: serde_json::json!({}),
            counts: StoreCounts::default(),
            agents: Vec::new(),
            requests: Vec::new(),
            segments: Vec::new(),
            bundles: Vec::new(),
            reservations: Vec::new(),
            matches: Vec::new(),
            tick_aggregates: Vec::new(),
            ledger_stats: ledger::Stats::default(),
        }
    }

    #[tokio::test]
    async fn export_then_duplicate_fails_without_overwrite() {
        let pool = connect(&Config::default()).await.unwrap();
        let snapshot = empty_snapshot("run-1");
        export(&pool, &snapshot, false).await.unwrap();

        let err = export(&pool, &snapshot, false).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateRun(id) if id == "run-1"));
    }

    #[tokio::test]
    async fn export_with_overwrite_replaces_the_run() {
        let pool = connect(&Config::default()).await.unwrap();
        let mut snapshot = empty_snapshot("run-2");
        snapshot.agents.push(model::Agent {
            id: AgentId::from("c1"),
            role: model::Role::Commuter,
            metadata: Default::default(),
        });
        export(&pool, &snapshot, false).await.unwrap();

        snapshot.agents.clear();
        export(&pool, &snapshot, true).await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM commuters WHERE run_id = 'run-2'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }
}
