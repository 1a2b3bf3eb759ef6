use {
    crate::{
        config::{Config, GasPolicy},
        rpc::Rpc,
        stats::Stats,
    },
    model::{Error, ErrorKind, Result, Transaction, TxId, TxOrigin, TxState},
    std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicU64, Ordering},
            Arc, Mutex,
        },
        time::{Duration, Instant},
    },
    tokio::{
        sync::{mpsc, Notify, Semaphore},
        task::JoinHandle,
    },
};

struct SubmitJob {
    tx_id: TxId,
    method: String,
    params: serde_json::Value,
    gas_limit: u64,
}

pub(crate) struct TxEntry {
    pub(crate) tx: Transaction,
    pub(crate) submitted_at: Option<Instant>,
    pub(crate) confirmed_at: Option<Instant>,
    polls_without_receipt: u32,
}

/// The shared state map from §4.A: "reads by the watcher are via the shared
/// state map guarded by a mutex." `changed` wakes every `await_tx` caller on
/// any transition; coarse but cheap at simulation scale.
struct Shared {
    state: Mutex<HashMap<TxId, TxEntry>>,
    changed: Notify,
}

impl Shared {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TxId, TxEntry>> {
        self.state.lock().expect("ledger state poisoned")
    }
}

/// A connected ledger client: owns the submitter task (single-writer nonce
/// counter, FIFO submission order) and the watcher task (receipt polling),
/// per §4.A's concurrency model.
pub struct LedgerClient {
    shared: Arc<Shared>,
    submit_tx: mpsc::UnboundedSender<SubmitJob>,
    next_seq: AtomicU64,
    submitter: JoinHandle<()>,
    watcher: JoinHandle<()>,
}

fn next_tx_id(seq: &AtomicU64) -> TxId {
    TxId(format!("tx-{}", seq.fetch_add(1, Ordering::Relaxed)))
}

impl LedgerClient {
    /// Connects to the RPC endpoint, verifies the chain id, and spawns the
    /// submitter and watcher tasks. `ConnectFail` if the handshake fails or
    /// the reported chain id disagrees with `config.chain_id`.
    pub async fn connect(
        config: Config,
        rpc: Arc<dyn Rpc>,
        signer_address: String,
    ) -> Result<Self> {
        let chain_id = rpc.chain_id().await.map_err(|e| {
            Error::with_cause(ErrorKind::ConnectFail, "failed to reach RPC endpoint", e)
        })?;
        if chain_id != config.chain_id {
            return Err(Error::new(
                ErrorKind::ConnectFail,
                format!("chain id mismatch: expected {}, got {chain_id}", config.chain_id),
            ));
        }
        let starting_nonce = rpc.nonce(&signer_address).await.map_err(|e| {
            Error::with_cause(ErrorKind::ConnectFail, "failed to fetch starting nonce", e)
        })?;

        let shared = Arc::new(Shared { state: Mutex::new(HashMap::new()), changed: Notify::new() });
        let (submit_tx, submit_rx) = mpsc::unbounded_channel();
        let permits = Arc::new(Semaphore::new(config.max_batch_size));

        let submitter = tokio::spawn(submitter_loop(
            shared.clone(),
            submit_rx,
            rpc.clone(),
            config.clone(),
            starting_nonce,
            signer_address,
            permits.clone(),
        ));
        let watcher = tokio::spawn(watcher_loop(shared.clone(), rpc, config, permits));

        Ok(Self { shared, submit_tx, next_seq: AtomicU64::new(0), submitter, watcher })
    }

    /// Assigns a `TxId`, records the transaction as `queued`, and enqueues
    /// it for the submitter. Never blocks on network I/O (§4.A).
    pub fn submit(
        &self,
        method: impl Into<String>,
        params: serde_json::Value,
        gas_limit: u64,
        origin: TxOrigin,
        now_tick: u64,
    ) -> TxId {
        let tx_id = next_tx_id(&self.next_seq);
        let method = method.into();
        let tx = Transaction {
            tx_id: tx_id.clone(),
            method: method.clone(),
            params: params.clone(),
            gas_limit,
            nonce: None,
            submitted_at: now_tick,
            state: TxState::Queued,
            tx_hash: None,
            gas_used: None,
            error: None,
            origin,
        };
        self.shared.lock().insert(
            tx_id.clone(),
            TxEntry { tx, submitted_at: None, confirmed_at: None, polls_without_receipt: 0 },
        );
        let _ = self.submit_tx.send(SubmitJob { tx_id: tx_id.clone(), method, params, gas_limit });
        tx_id
    }

    /// Blocks until `tx_id` reaches a terminal state (`confirmed` or
    /// `failed`) and returns its final record.
    pub async fn await_tx(&self, tx_id: &TxId) -> Result<Transaction> {
        loop {
            match self.shared.lock().get(tx_id) {
                None => {
                    return Err(Error::new(
                        ErrorKind::NotFound,
                        format!("transaction {tx_id} not found"),
                    ))
                }
                Some(entry) if is_terminal(entry.tx.state) => return Ok(entry.tx.clone()),
                _ => {}
            }
            self.shared.changed.notified().await;
        }
    }

    pub fn stats(&self) -> Stats {
        let stats = Stats::summarize(self.shared.lock().values());
        crate::metrics::Metrics::record(&stats);
        stats
    }

    pub fn shutdown(self) {
        self.submitter.abort();
        self.watcher.abort();
    }
}

fn is_terminal(state: TxState) -> bool {
    matches!(state, TxState::Confirmed | TxState::Failed)
}

fn fail(shared: &Shared, tx_id: &TxId, kind: ErrorKind, reason: &str) {
    let mut state = shared.lock();
    if let Some(entry) = state.get_mut(tx_id) {
        entry.tx.state = TxState::Failed;
        entry.tx.error = Some(format!("{kind}: {reason}"));
    }
    drop(state);
    shared.changed.notify_waiters();
}

async fn submitter_loop(
    shared: Arc<Shared>,
    mut rx: mpsc::UnboundedReceiver<SubmitJob>,
    rpc: Arc<dyn Rpc>,
    config: Config,
    starting_nonce: u64,
    signer_address: String,
    permits: Arc<Semaphore>,
) {
    let mut nonce = starting_nonce;
    while let Some(job) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else { break };

        if job.gas_limit > config.gas_limit {
            fail(&shared, &job.tx_id, ErrorKind::GasExceeds, "gas limit exceeds policy ceiling");
            drop(permit);
            continue;
        }

        let gas_price = match resolve_gas_price(&config.gas_policy, rpc.as_ref()).await {
            Ok(price) => price,
            Err(e) => {
                fail(&shared, &job.tx_id, ErrorKind::RpcFailed, &e.to_string());
                drop(permit);
                continue;
            }
        };

        let mut delay = Duration::from_millis(config.retry.initial_delay_ms);
        let mut last_err = None;
        let mut sent = None;
        for attempt_no in 0..config.retry.max_attempts.max(1) {
            match rpc.send(&job.method, &job.params, nonce, job.gas_limit, gas_price).await {
                Ok(tx_hash) => {
                    sent = Some(tx_hash);
                    break;
                }
                Err(e) => {
                    last_err = Some(e);
                    if attempt_no + 1 >= config.retry.max_attempts {
                        break;
                    }
                    if let Ok(fresh) = rpc.nonce(&signer_address).await {
                        if fresh != nonce {
                            tracing::warn!(old = nonce, new = fresh, "nonce gap detected, resyncing");
                            nonce = fresh;
                        }
                    }
                    tokio::time::sleep(delay).await;
                    delay = delay.mul_f64(config.retry.backoff_factor);
                }
            }
        }

        match sent {
            Some(tx_hash) => {
                {
                    let mut state = shared.lock();
                    if let Some(entry) = state.get_mut(&job.tx_id) {
                        entry.tx.nonce = Some(nonce);
                        entry.tx.tx_hash = Some(tx_hash);
                        entry.tx.state = TxState::Submitted;
                        entry.submitted_at = Some(Instant::now());
                    }
                }
                nonce += 1;
                // Held until the watcher observes a terminal receipt; that is
                // what bounds in-flight submitted-but-unconfirmed txs (§4.A
                // `maxBatchSize`).
                permit.forget();
                shared.changed.notify_waiters();
            }
            None => {
                let message = last_err.map(|e| e.to_string()).unwrap_or_else(|| "rpc send failed".into());
                fail(&shared, &job.tx_id, ErrorKind::RpcFailed, &message);
                drop(permit);
            }
        }
    }
}

async fn resolve_gas_price(policy: &GasPolicy, rpc: &dyn Rpc) -> anyhow::Result<u64> {
    match policy {
        GasPolicy::Fixed { gas_price } => Ok(*gas_price),
        GasPolicy::MultiplierOfSuggested { multiplier } => {
            let suggested = rpc.suggested_gas_price().await?;
            Ok((suggested as f64 * multiplier) as u64)
        }
        GasPolicy::Capped { cap } => Ok(rpc.suggested_gas_price().await?.min(*cap)),
    }
}

async fn watcher_loop(shared: Arc<Shared>, rpc: Arc<dyn Rpc>, config: Config, permits: Arc<Semaphore>) {
    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    loop {
        tokio::time::sleep(poll_interval).await;

        let in_flight: Vec<(TxId, String)> = {
            let state = shared.lock();
            state
                .iter()
                .filter(|(_, e)| e.tx.state == TxState::Submitted)
                .filter_map(|(id, e)| e.tx.tx_hash.clone().map(|h| (id.clone(), h)))
                .collect()
        };
        if in_flight.is_empty() {
            continue;
        }

        let current_block = rpc.block_number().await.unwrap_or_default();

        for (tx_id, tx_hash) in in_flight {
            match rpc.receipt(&tx_hash).await {
                Ok(Some(receipt)) if !receipt.status => {
                    {
                        let mut state = shared.lock();
                        if let Some(entry) = state.get_mut(&tx_id) {
                            entry.tx.state = TxState::Failed;
                            entry.tx.gas_used = Some(receipt.gas_used);
                            entry.tx.error = receipt.revert_reason.or(Some("reverted".into()));
                        }
                    }
                    permits.add_permits(1);
                    shared.changed.notify_waiters();
                }
                Ok(Some(receipt)) => {
                    let confirmations = current_block.saturating_sub(receipt.block_number) + 1;
                    if confirmations >= config.confirmation_blocks {
                        {
                            let mut state = shared.lock();
                            if let Some(entry) = state.get_mut(&tx_id) {
                                entry.tx.state = TxState::Confirmed;
                                entry.tx.gas_used = Some(receipt.gas_used);
                                entry.confirmed_at = Some(Instant::now());
                            }
                        }
                        permits.add_permits(1);
                        shared.changed.notify_waiters();
                    }
                }
                Ok(None) => {
                    let mut timed_out = false;
                    {
                        let mut state = shared.lock();
                        if let Some(entry) = state.get_mut(&tx_id) {
                            entry.polls_without_receipt += 1;
                            if entry.polls_without_receipt as u64 >= config.timeout_ticks {
                                entry.tx.state = TxState::Failed;
                                entry.tx.error = Some("timeout".into());
                                timed_out = true;
                            }
                        }
                    }
                    if timed_out {
                        permits.add_permits(1);
                        shared.changed.notify_waiters();
                    }
                }
                Err(e) => {
                    tracing::warn!(%tx_id, error = %e, "receipt poll failed, will retry");
                }
            }
        }
    }
}
