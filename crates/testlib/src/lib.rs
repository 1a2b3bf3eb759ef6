//! Shared fixtures for the integration tests of every other crate in the
//! workspace: a scripted fake JSON-RPC backend and builders for the
//! concrete end-to-end scenarios.

pub mod builders;
pub mod fake_rpc;
pub mod harness;
pub mod scenarios;

pub use {
    builders::{RequestorBuilder, SegmentBuilder},
    fake_rpc::FakeRpc,
    harness::{fixture, Fixture},
};
