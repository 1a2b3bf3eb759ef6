//! A thin wrapper around `tracing-subscriber`'s `EnvFilter` + `fmt` layer.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a global `tracing` subscriber filtered by `log_filter` (the
/// usual `RUST_LOG`-style directive string, e.g. `"info,coordinator=debug"`).
/// Safe to call at most once per process; a second call is a no-op rather
/// than a panic, so test harnesses that spin up many Coordinators can call
/// it unconditionally.
pub fn initialize(log_filter: &str) {
    let filter = EnvFilter::try_new(log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry().with(fmt::layer()).with(filter).try_init();
}
