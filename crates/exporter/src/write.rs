use {
    crate::{schema, snapshot::Snapshot, Error},
    model::Role,
    sqlx::{Any, AnyPool, Transaction},
};

type Tx<'a> = Transaction<'a, Any>;

/// Serializes a `serde`-tagged enum to the plain lowercase/kebab string it
/// round-trips as in JSON (`RequestStatus::Open` -> `"open"`), so the schema
/// stores the same vocabulary the rest of the system uses instead of Rust's
/// `Debug` spelling.
fn tag<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => "unknown".into(),
    }
}

/// Writes one completed run to `pool` as a single transaction. On any
/// failure the transaction is rolled back and `Error::ExportFailed` is
/// returned without partial state (§4.E). If a row for `snapshot.run_id`
/// already exists, fails with `Error::DuplicateRun` unless `overwrite` is
/// set, in which case the existing run subtree is deleted first, inside the
/// same transaction.
pub async fn export(pool: &AnyPool, snapshot: &Snapshot, overwrite: bool) -> Result<(), Error> {
    ensure_schema(pool).await?;

    let mut tx = pool.begin().await.map_err(|e| Error::ExportFailed(e.to_string()))?;

    let run_id = snapshot.run_id.as_str();
    let existing: Option<(String,)> = sqlx::query_as("SELECT run_id FROM run WHERE run_id = ?")
        .bind(run_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| Error::ExportFailed(e.to_string()))?;

    if existing.is_some() {
        if !overwrite {
            return Err(Error::DuplicateRun(run_id.to_string()));
        }
        delete_run_subtree(&mut tx, run_id).await?;
    }

    write_run(&mut tx, snapshot).await?;
    write_agents(&mut tx, snapshot).await?;
    write_requests(&mut tx, snapshot).await?;
    write_segments(&mut tx, snapshot).await?;
    write_bundles(&mut tx, snapshot).await?;
    write_reservations(&mut tx, snapshot).await?;
    write_matches(&mut tx, snapshot).await?;
    write_tick_aggregates(&mut tx, snapshot).await?;
    write_ledger_stats(&mut tx, snapshot).await?;

    tx.commit().await.map_err(|e| Error::ExportFailed(e.to_string()))?;
    tracing::info!(run_id, "simulation run exported");
    Ok(())
}

async fn ensure_schema(pool: &AnyPool) -> Result<(), Error> {
    for ddl in schema::CREATE_TABLES {
        sqlx::query(ddl).execute(pool).await.map_err(|e| Error::ExportFailed(e.to_string()))?;
    }
    Ok(())
}

async fn delete_run_subtree(tx: &mut Tx<'_>, run_id: &str) -> Result<(), Error> {
    for table in schema::TABLES_CHILD_FIRST {
        let query = format!("DELETE FROM {table} WHERE run_id = ?");
        sqlx::query(&query)
            .bind(run_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| Error::ExportFailed(e.to_string()))?;
    }
    Ok(())
}

async fn write_run(tx: &mut Tx<'_>, snapshot: &Snapshot) -> Result<(), Error> {
    sqlx::query(
        "INSERT INTO run (run_id, config_json, started_at, ended_at, requests_count, \
         segments_count, reservations_count, matches_count) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(snapshot.run_id.as_str())
    .bind(snapshot.config.to_string())
    .bind(snapshot.started_at.to_rfc3339())
    .bind(snapshot.ended_at.to_rfc3339())
    .bind(snapshot.requests.len() as i64)
    .bind(snapshot.segments.len() as i64)
    .bind(snapshot.reservations.len() as i64)
    .bind(snapshot.matches.len() as i64)
    .execute(&mut **tx)
    .await
    .map_err(|e| Error::ExportFailed(e.to_string()))?;
    Ok(())
}

async fn write_agents(tx: &mut Tx<'_>, snapshot: &Snapshot) -> Result<(), Error> {
    for agent in &snapshot.agents {
        let table = match agent.role {
            Role::Commuter => "commuters",
            Role::Provider => "providers",
        };
        let query = format!("INSERT INTO {table} (run_id, agent_id, metadata_json) VALUES (?, ?, ?)");
        sqlx::query(&query)
            .bind(snapshot.run_id.as_str())
            .bind(agent.id.as_str())
            .bind(serde_json::to_string(&agent.metadata).unwrap_or_default())
            .execute(&mut **tx)
            .await
            .map_err(|e| Error::ExportFailed(e.to_string()))?;
    }
    Ok(())
}

async fn write_requests(tx: &mut Tx<'_>, snapshot: &Snapshot) -> Result<(), Error> {
    for r in &snapshot.requests {
        sqlx::query(
            "INSERT INTO requests (run_id, request_id, commuter_id, origin_x, origin_y, \
             destination_x, destination_y, start_time, max_price, created_tick, expires_tick, \
             status, purpose) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(snapshot.run_id.as_str())
        .bind(r.request_id.as_str())
        .bind(r.commuter_id.as_str())
        .bind(r.origin.x)
        .bind(r.origin.y)
        .bind(r.destination.x)
        .bind(r.destination.y)
        .bind(r.start_time as i64)
        .bind(r.max_price.map(|p| p.to_string()))
        .bind(r.created_tick as i64)
        .bind(r.expires_tick as i64)
        .bind(tag(&r.status))
        .bind(r.purpose.clone())
        .execute(&mut **tx)
        .await
        .map_err(|e| Error::ExportFailed(e.to_string()))?;
    }
    Ok(())
}

async fn write_segments(tx: &mut Tx<'_>, snapshot: &Snapshot) -> Result<(), Error> {
    for s in &snapshot.segments {
        sqlx::query(
            "INSERT INTO segments (run_id, segment_id, provider_id, mode, origin_x, origin_y, \
             destination_x, destination_y, depart_time, arrive_time, price, capacity, \
             remaining, status) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(snapshot.run_id.as_str())
        .bind(s.segment_id.as_str())
        .bind(s.provider_id.as_str())
        .bind(tag(&s.mode))
        .bind(s.origin.x)
        .bind(s.origin.y)
        .bind(s.destination.x)
        .bind(s.destination.y)
        .bind(s.depart_time as i64)
        .bind(s.arrive_time as i64)
        .bind(s.price.to_string())
        .bind(s.capacity as i64)
        .bind(s.remaining as i64)
        .bind(tag(&s.status))
        .execute(&mut **tx)
        .await
        .map_err(|e| Error::ExportFailed(e.to_string()))?;
    }
    Ok(())
}

async fn write_bundles(tx: &mut Tx<'_>, snapshot: &Snapshot) -> Result<(), Error> {
    for b in &snapshot.bundles {
        sqlx::query(
            "INSERT INTO bundles (run_id, bundle_id, origin_x, origin_y, destination_x, \
             destination_y, depart_time, arrive_time, base_price, discount, final_price) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(snapshot.run_id.as_str())
        .bind(b.bundle_id.as_str())
        .bind(b.origin.x)
        .bind(b.origin.y)
        .bind(b.destination.x)
        .bind(b.destination.y)
        .bind(b.depart_time as i64)
        .bind(b.arrive_time as i64)
        .bind(b.base_price.to_string())
        .bind(b.discount)
        .bind(b.final_price.to_string())
        .execute(&mut **tx)
        .await
        .map_err(|e| Error::ExportFailed(e.to_string()))?;

        for (position, (segment_id, mode)) in b.segments.iter().zip(b.modes.iter()).enumerate() {
            sqlx::query(
                "INSERT INTO bundle_segments (run_id, bundle_id, position, segment_id, mode) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(snapshot.run_id.as_str())
            .bind(b.bundle_id.as_str())
            .bind(position as i64)
            .bind(segment_id.as_str())
            .bind(tag(mode))
            .execute(&mut **tx)
            .await
            .map_err(|e| Error::ExportFailed(e.to_string()))?;
        }
    }
    Ok(())
}

async fn write_reservations(tx: &mut Tx<'_>, snapshot: &Snapshot) -> Result<(), Error> {
    for r in &snapshot.reservations {
        sqlx::query(
            "INSERT INTO reservations (run_id, reservation_id, commuter_id, request_id, \
             bundle_id, cleared_price, created_tick, settlement_state, tx_hash) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(snapshot.run_id.as_str())
        .bind(r.reservation_id.as_str())
        .bind(r.commuter_id.as_str())
        .bind(r.request_id.as_str())
        .bind(r.bundle_id.as_str())
        .bind(r.cleared_price.to_string())
        .bind(r.created_tick as i64)
        .bind(tag(&r.settlement_state))
        .bind(r.tx_hash.clone())
        .execute(&mut **tx)
        .await
        .map_err(|e| Error::ExportFailed(e.to_string()))?;

        for segment_id in &r.segment_ids {
            sqlx::query(
                "INSERT INTO segment_reservations (run_id, reservation_id, segment_id) \
                 VALUES (?, ?, ?)",
            )
            .bind(snapshot.run_id.as_str())
            .bind(r.reservation_id.as_str())
            .bind(segment_id.as_str())
            .execute(&mut **tx)
            .await
            .map_err(|e| Error::ExportFailed(e.to_string()))?;
        }
    }
    Ok(())
}

async fn write_matches(tx: &mut Tx<'_>, snapshot: &Snapshot) -> Result<(), Error> {
    for m in &snapshot.matches {
        sqlx::query(
            "INSERT INTO matches (run_id, request_id, provider_id, offer_id, final_price, \
             reservation_id, recorded_tick, tx_hash) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(snapshot.run_id.as_str())
        .bind(m.request_id.as_str())
        .bind(m.provider_id.as_str())
        .bind(m.offer_id.as_str())
        .bind(m.final_price.to_string())
        .bind(m.reservation_id.as_str())
        .bind(m.recorded_tick as i64)
        .bind(m.tx_hash.clone())
        .execute(&mut **tx)
        .await
        .map_err(|e| Error::ExportFailed(e.to_string()))?;
    }
    Ok(())
}

async fn write_tick_aggregates(tx: &mut Tx<'_>, snapshot: &Snapshot) -> Result<(), Error> {
    for a in &snapshot.tick_aggregates {
        let histogram: std::collections::HashMap<String, usize> =
            a.mode_histogram.iter().map(|(mode, count)| (tag(mode), *count)).collect();
        sqlx::query(
            "INSERT INTO tick_aggregates (run_id, tick, requests_open, segments_open, \
             mean_segment_price, mode_histogram_json) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(snapshot.run_id.as_str())
        .bind(a.tick as i64)
        .bind(a.requests_open as i64)
        .bind(a.segments_open as i64)
        .bind(a.mean_segment_price)
        .bind(serde_json::to_string(&histogram).unwrap_or_default())
        .execute(&mut **tx)
        .await
        .map_err(|e| Error::ExportFailed(e.to_string()))?;
    }
    Ok(())
}

async fn write_ledger_stats(tx: &mut Tx<'_>, snapshot: &Snapshot) -> Result<(), Error> {
    let s = &snapshot.ledger_stats;
    sqlx::query(
        "INSERT INTO run_ledger_stats (run_id, queued, submitted, confirmed, failed, \
         avg_confirmation_ms, total_gas_used) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(snapshot.run_id.as_str())
    .bind(s.queued as i64)
    .bind(s.submitted as i64)
    .bind(s.confirmed as i64)
    .bind(s.failed as i64)
    .bind(s.avg_confirmation_ms)
    .bind(s.total_gas_used as i64)
    .execute(&mut **tx)
    .await
    .map_err(|e| Error::ExportFailed(e.to_string()))?;
    Ok(())
}
