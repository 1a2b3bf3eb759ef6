//! Thread-safe async submission of transactions to a JSON-RPC blockchain
//! endpoint: nonce serialization, retries, batching, and receipt tracking
//! (§4.A).

mod client;
mod config;
mod metrics;
mod rpc;
mod stats;

pub use {
    client::LedgerClient,
    config::{Config, GasPolicy, RetryPolicy},
    rpc::{alloy_rpc::AlloyRpc, Receipt, Rpc},
    stats::Stats,
};

#[cfg(test)]
mod tests {
    use {
        super::*,
        async_trait::async_trait,
        model::TxOrigin,
        serde_json::json,
        std::sync::{
            atomic::{AtomicU64, Ordering},
            Arc, Mutex,
        },
    };

    /// A deterministic in-memory `Rpc` for exercising the submitter/watcher
    /// tasks without a live chain. `testlib::FakeRpc` extends this pattern
    /// with richer scripting for integration tests.
    struct InstantRpc {
        nonce: AtomicU64,
        receipts: Mutex<std::collections::HashMap<String, Receipt>>,
    }

    #[async_trait]
    impl Rpc for InstantRpc {
        async fn chain_id(&self) -> anyhow::Result<u64> {
            Ok(7)
        }

        async fn nonce(&self, _address: &str) -> anyhow::Result<u64> {
            Ok(self.nonce.load(Ordering::SeqCst))
        }

        async fn suggested_gas_price(&self) -> anyhow::Result<u64> {
            Ok(10)
        }

        async fn block_number(&self) -> anyhow::Result<u64> {
            Ok(100)
        }

        async fn send(
            &self,
            _method: &str,
            _params: &serde_json::Value,
            nonce: u64,
            _gas_limit: u64,
            _gas_price: u64,
        ) -> anyhow::Result<String> {
            self.nonce.store(nonce + 1, Ordering::SeqCst);
            let tx_hash = format!("0xhash{nonce}");
            self.receipts.lock().unwrap().insert(
                tx_hash.clone(),
                Receipt { block_number: 100, gas_used: 21_000, status: true, revert_reason: None },
            );
            Ok(tx_hash)
        }

        async fn receipt(&self, tx_hash: &str) -> anyhow::Result<Option<Receipt>> {
            Ok(self.receipts.lock().unwrap().get(tx_hash).cloned())
        }
    }

    #[tokio::test]
    async fn submit_and_await_reaches_confirmed() {
        let rpc: Arc<dyn Rpc> =
            Arc::new(InstantRpc { nonce: AtomicU64::new(0), receipts: Mutex::new(Default::default()) });
        let config = Config { confirmation_blocks: 1, poll_interval_ms: 5, ..Config::default() };
        let client = LedgerClient::connect(config, rpc, "0xabc".into()).await.unwrap();

        let tx_id = client.submit("recordMatch", json!({"price": "7.02"}), 50_000, TxOrigin::Match, 1);
        let result = client.await_tx(&tx_id).await.unwrap();
        assert_eq!(result.state, model::TxState::Confirmed);
        assert_eq!(result.gas_used, Some(21_000));

        let stats = client.stats();
        assert_eq!(stats.confirmed, 1);
        client.shutdown();
    }

    #[tokio::test]
    async fn gas_limit_over_policy_ceiling_fails_immediately() {
        let rpc: Arc<dyn Rpc> =
            Arc::new(InstantRpc { nonce: AtomicU64::new(0), receipts: Mutex::new(Default::default()) });
        let config = Config { gas_limit: 1_000, poll_interval_ms: 5, ..Config::default() };
        let client = LedgerClient::connect(config, rpc, "0xabc".into()).await.unwrap();

        let tx_id = client.submit("recordMatch", json!({}), 50_000, TxOrigin::Match, 1);
        let result = client.await_tx(&tx_id).await.unwrap();
        assert_eq!(result.state, model::TxState::Failed);
        assert!(result.error.unwrap().contains("GasExceeds"));
        client.shutdown();
    }

    #[rstest::rstest]
    #[case::fixed(crate::config::GasPolicy::Fixed { gas_price: 42 })]
    #[case::multiplier(crate::config::GasPolicy::MultiplierOfSuggested { multiplier: 2.0 })]
    #[case::capped(crate::config::GasPolicy::Capped { cap: 5 })]
    #[tokio::test]
    async fn every_gas_policy_variant_reaches_confirmed(#[case] gas_policy: crate::config::GasPolicy) {
        let rpc: Arc<dyn Rpc> =
            Arc::new(InstantRpc { nonce: AtomicU64::new(0), receipts: Mutex::new(Default::default()) });
        let config = Config { gas_policy, poll_interval_ms: 5, ..Config::default() };
        let client = LedgerClient::connect(config, rpc, "0xabc".into()).await.unwrap();

        let tx_id = client.submit("recordMatch", json!({}), 50_000, TxOrigin::Match, 1);
        let result = client.await_tx(&tx_id).await.unwrap();
        assert_eq!(result.state, model::TxState::Confirmed);
        client.shutdown();
    }
}
