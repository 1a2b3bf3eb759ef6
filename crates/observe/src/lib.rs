//! Ambient logging and metrics initialization shared by every binary or test
//! harness that embeds the Coordinator. Mirrors the teacher's own `observe`
//! crate, trimmed to the pieces this workspace actually needs: a tracing
//! subscriber and a process-wide Prometheus registry.

pub mod metrics;
pub mod tracing;
