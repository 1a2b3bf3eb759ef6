//! DDL for the analytical schema (§6.4). Written in a dialect both Postgres
//! and SQLite accept unmodified -- no serial/autoincrement columns, since
//! every primary key is caller-supplied (`runId`, or `(runId, localId)`) --
//! so the only difference exposed to the rest of the system really is the
//! connection handle, per §4.E's schema-portability contract.

pub const TABLES_CHILD_FIRST: &[&str] = &[
    "run_ledger_stats",
    "tick_aggregates",
    "matches",
    "segment_reservations",
    "reservations",
    "bundle_segments",
    "bundles",
    "segments",
    "requests",
    "providers",
    "commuters",
    "run",
];

pub const CREATE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS run (
        run_id TEXT PRIMARY KEY,
        config_json TEXT NOT NULL,
        started_at TEXT NOT NULL,
        ended_at TEXT NOT NULL,
        requests_count INTEGER NOT NULL,
        segments_count INTEGER NOT NULL,
        reservations_count INTEGER NOT NULL,
        matches_count INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS commuters (
        run_id TEXT NOT NULL,
        agent_id TEXT NOT NULL,
        metadata_json TEXT NOT NULL,
        PRIMARY KEY (run_id, agent_id)
    )",
    "CREATE TABLE IF NOT EXISTS providers (
        run_id TEXT NOT NULL,
        agent_id TEXT NOT NULL,
        metadata_json TEXT NOT NULL,
        PRIMARY KEY (run_id, agent_id)
    )",
    "CREATE TABLE IF NOT EXISTS requests (
        run_id TEXT NOT NULL,
        request_id TEXT NOT NULL,
        commuter_id TEXT NOT NULL,
        origin_x DOUBLE PRECISION NOT NULL,
        origin_y DOUBLE PRECISION NOT NULL,
        destination_x DOUBLE PRECISION NOT NULL,
        destination_y DOUBLE PRECISION NOT NULL,
        start_time BIGINT NOT NULL,
        max_price TEXT,
        created_tick BIGINT NOT NULL,
        expires_tick BIGINT NOT NULL,
        status TEXT NOT NULL,
        purpose TEXT NOT NULL,
        PRIMARY KEY (run_id, request_id)
    )",
    "CREATE TABLE IF NOT EXISTS segments (
        run_id TEXT NOT NULL,
        segment_id TEXT NOT NULL,
        provider_id TEXT NOT NULL,
        mode TEXT NOT NULL,
        origin_x DOUBLE PRECISION NOT NULL,
        origin_y DOUBLE PRECISION NOT NULL,
        destination_x DOUBLE PRECISION NOT NULL,
        destination_y DOUBLE PRECISION NOT NULL,
        depart_time BIGINT NOT NULL,
        arrive_time BIGINT NOT NULL,
        price TEXT NOT NULL,
        capacity BIGINT NOT NULL,
        remaining BIGINT NOT NULL,
        status TEXT NOT NULL,
        PRIMARY KEY (run_id, segment_id)
    )",
    "CREATE TABLE IF NOT EXISTS bundles (
        run_id TEXT NOT NULL,
        bundle_id TEXT NOT NULL,
        origin_x DOUBLE PRECISION NOT NULL,
        origin_y DOUBLE PRECISION NOT NULL,
        destination_x DOUBLE PRECISION NOT NULL,
        destination_y DOUBLE PRECISION NOT NULL,
        depart_time BIGINT NOT NULL,
        arrive_time BIGINT NOT NULL,
        base_price TEXT NOT NULL,
        discount DOUBLE PRECISION NOT NULL,
        final_price TEXT NOT NULL,
        PRIMARY KEY (run_id, bundle_id)
    )",
    "CREATE TABLE IF NOT EXISTS bundle_segments (
        run_id TEXT NOT NULL,
        bundle_id TEXT NOT NULL,
        position BIGINT NOT NULL,
        segment_id TEXT NOT NULL,
        mode TEXT NOT NULL,
        PRIMARY KEY (run_id, bundle_id, position)
    )",
    "CREATE TABLE IF NOT EXISTS reservations (
        run_id TEXT NOT NULL,
        reservation_id TEXT NOT NULL,
        commuter_id TEXT NOT NULL,
        request_id TEXT NOT NULL,
        bundle_id TEXT NOT NULL,
        cleared_price TEXT NOT NULL,
        created_tick BIGINT NOT NULL,
        settlement_state TEXT NOT NULL,
        tx_hash TEXT,
        PRIMARY KEY (run_id, reservation_id)
    )",
    "CREATE TABLE IF NOT EXISTS segment_reservations (
        run_id TEXT NOT NULL,
        reservation_id TEXT NOT NULL,
        segment_id TEXT NOT NULL,
        PRIMARY KEY (run_id, reservation_id, segment_id)
    )",
    "CREATE TABLE IF NOT EXISTS matches (
        run_id TEXT NOT NULL,
        request_id TEXT NOT NULL,
        provider_id TEXT NOT NULL,
        offer_id TEXT NOT NULL,
        final_price TEXT NOT NULL,
        reservation_id TEXT NOT NULL,
        recorded_tick BIGINT NOT NULL,
        tx_hash TEXT,
        PRIMARY KEY (run_id, request_id)
    )",
    "CREATE TABLE IF NOT EXISTS tick_aggregates (
        run_id TEXT NOT NULL,
        tick BIGINT NOT NULL,
        requests_open BIGINT NOT NULL,
        segments_open BIGINT NOT NULL,
        mean_segment_price DOUBLE PRECISION NOT NULL,
        mode_histogram_json TEXT NOT NULL,
        PRIMARY KEY (run_id, tick)
    )",
    "CREATE TABLE IF NOT EXISTS run_ledger_stats (
        run_id TEXT PRIMARY KEY,
        queued BIGINT NOT NULL,
        submitted BIGINT NOT NULL,
        confirmed BIGINT NOT NULL,
        failed BIGINT NOT NULL,
        avg_confirmation_ms DOUBLE PRECISION NOT NULL,
        total_gas_used BIGINT NOT NULL
    )",
];
