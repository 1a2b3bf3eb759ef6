//! A scriptable in-memory `ledger::Rpc`, for integration tests that need
//! control over nonce gaps, reverts, and stalled receipts that a real chain
//! would only produce non-deterministically.

use {
    async_trait::async_trait,
    ledger::{Receipt, Rpc},
    std::{
        collections::{HashMap, HashSet},
        sync::{
            atomic::{AtomicU64, AtomicUsize, Ordering},
            Mutex,
        },
    },
};

pub struct FakeRpc {
    chain_id: u64,
    nonce: AtomicU64,
    receipts: Mutex<HashMap<String, Receipt>>,
    /// Tx hashes whose receipt should never arrive, simulating the watcher's
    /// `timeoutTicks` path.
    stalled: Mutex<HashSet<String>>,
    /// `send` calls left that should fail outright (an RPC-level error, not a
    /// revert), forcing the submitter's retry/resync path.
    fail_sends_remaining: AtomicUsize,
    /// `send` calls left whose eventual receipt should report `status: false`.
    revert_next_remaining: AtomicUsize,
}

impl FakeRpc {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            nonce: AtomicU64::new(0),
            receipts: Mutex::new(HashMap::new()),
            stalled: Mutex::new(HashSet::new()),
            fail_sends_remaining: AtomicUsize::new(0),
            revert_next_remaining: AtomicUsize::new(0),
        }
    }

    /// The next `n` calls to `send` return an RPC error, as if the endpoint
    /// rejected the call; exercises the submitter's retry/nonce-resync path.
    pub fn fail_next_sends(&self, n: usize) {
        self.fail_sends_remaining.store(n, Ordering::SeqCst);
    }

    /// Simulates another actor advancing the signer's nonce out from under
    /// the submitter, so its next `send` attempt disagrees with the chain.
    pub fn bump_nonce_externally(&self, by: u64) {
        self.nonce.fetch_add(by, Ordering::SeqCst);
    }

    /// The next `n` transactions that do get submitted will confirm with
    /// `status: false` (on-chain revert) instead of succeeding.
    pub fn revert_next(&self, n: usize) {
        self.revert_next_remaining.store(n, Ordering::SeqCst);
    }

    /// `tx_hash`'s receipt never becomes available; the watcher's
    /// `timeoutTicks` counter will eventually fail it.
    pub fn stall_receipt(&self, tx_hash: &str) {
        self.stalled.lock().unwrap().insert(tx_hash.to_string());
    }
}

#[async_trait]
impl Rpc for FakeRpc {
    async fn chain_id(&self) -> anyhow::Result<u64> {
        Ok(self.chain_id)
    }

    async fn nonce(&self, _address: &str) -> anyhow::Result<u64> {
        Ok(self.nonce.load(Ordering::SeqCst))
    }

    async fn suggested_gas_price(&self) -> anyhow::Result<u64> {
        Ok(10)
    }

    async fn block_number(&self) -> anyhow::Result<u64> {
        Ok(1_000)
    }

    async fn send(
        &self,
        _method: &str,
        _params: &serde_json::Value,
        nonce: u64,
        _gas_limit: u64,
        _gas_price: u64,
    ) -> anyhow::Result<String> {
        if self.fail_sends_remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            if n > 0 {
                Some(n - 1)
            } else {
                None
            }
        }).is_ok()
        {
            anyhow::bail!("simulated rpc send failure");
        }

        let tx_hash = format!("0xhash{nonce}");
        if self.stalled.lock().unwrap().contains(&tx_hash) {
            return Ok(tx_hash);
        }

        let status = self
            .revert_next_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                if n > 0 {
                    Some(n - 1)
                } else {
                    None
                }
            })
            .is_err();

        self.nonce.store(nonce + 1, Ordering::SeqCst);
        self.receipts.lock().unwrap().insert(
            tx_hash.clone(),
            Receipt {
                block_number: 1_000,
                gas_used: 21_000,
                status,
                revert_reason: if status { None } else { Some("simulated revert".into()) },
            },
        );
        Ok(tx_hash)
    }

    async fn receipt(&self, tx_hash: &str) -> anyhow::Result<Option<Receipt>> {
        if self.stalled.lock().unwrap().contains(tx_hash) {
            return Ok(None);
        }
        Ok(self.receipts.lock().unwrap().get(tx_hash).cloned())
    }
}
