//! Wires a `Coordinator` to a fresh `FakeRpc` so integration tests never
//! touch a live chain. Mirrors the per-test `InstantRpc` setup in
//! `ledger`'s own unit tests, generalized into a shared fixture.

use {crate::fake_rpc::FakeRpc, coordinator::Coordinator, marketplace::Store, std::sync::Arc};

pub const CHAIN_ID: u64 = 7;

/// A coordinator backed by a scriptable fake chain, plus a handle to the
/// fake so the test can script reverts/stalls/nonce gaps before driving it.
pub struct Fixture {
    pub coordinator: Arc<Coordinator>,
    pub rpc: Arc<FakeRpc>,
}

/// Builds a `Fixture` with fast polling so scenario tests don't wait on the
/// ledger's default production intervals.
pub async fn fixture() -> Fixture {
    let rpc = Arc::new(FakeRpc::new(CHAIN_ID));
    let ledger_config = ledger::Config {
        chain_id: CHAIN_ID,
        poll_interval_ms: 5,
        confirmation_blocks: 1,
        timeout_ticks: 20,
        ..ledger::Config::default()
    };
    let ledger = Arc::new(
        ledger::LedgerClient::connect(ledger_config, rpc.clone(), "0xabc".to_string())
            .await
            .expect("fake rpc always connects"),
    );
    let store = Arc::new(Store::new());
    let coordinator = Arc::new(Coordinator::new(
        store,
        ledger,
        router::Options::default(),
        coordinator::Config::default(),
    ));
    Fixture { coordinator, rpc }
}
