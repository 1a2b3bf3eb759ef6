//! The public-facing facade combining the Marketplace Store, Bundle Router
//! and Ledger Client (§4.D). Owns the invariant that every reservation
//! corresponds to both an off-chain state change and a queued on-chain
//! settlement.

mod config;
mod export;
mod metrics;
mod reserve;
mod stats;

pub use {config::Config, stats::Stats};

use {
    chrono::{DateTime, Utc},
    ledger::LedgerClient,
    marketplace::{NewOffer, NewRequest, NewSegment, Store},
    model::{
        AgentId, Bundle, Notification, Offer, Point, Request, RequestId, Result, Role, Segment,
        SegmentId, TxId, TxOrigin,
    },
    std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicU64, Ordering},
            Arc,
        },
    },
};

fn next_id(prefix: &str, counter: &AtomicU64) -> String {
    format!("{prefix}-{}", counter.fetch_add(1, Ordering::Relaxed))
}

pub struct Coordinator {
    store: Arc<Store>,
    ledger: Arc<LedgerClient>,
    router_opts: router::Options,
    config: Config,
    current_tick: AtomicU64,
    next_reservation_seq: AtomicU64,
    started_at: DateTime<Utc>,
}

impl Coordinator {
    pub fn new(
        store: Arc<Store>,
        ledger: Arc<LedgerClient>,
        router_opts: router::Options,
        config: Config,
    ) -> Self {
        Self {
            store,
            ledger,
            router_opts,
            config,
            current_tick: AtomicU64::new(0),
            next_reservation_seq: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    fn now(&self) -> u64 {
        self.current_tick.load(Ordering::Relaxed)
    }

    fn next_reservation_id(&self) -> model::ReservationId {
        model::ReservationId(next_id("res", &self.next_reservation_seq))
    }

    #[tracing::instrument(skip(self, profile), fields(agent_id = %id))]
    pub fn register_commuter(&self, id: AgentId, profile: HashMap<String, String>) -> Result<TxId> {
        self.store.upsert_agent(id.clone(), Role::Commuter, profile.clone())?;
        let params = serde_json::json!({ "id": id.as_str(), "metadataHash": hash_of(&profile) });
        Ok(self.ledger.submit(
            "registerCommuter",
            params,
            self.config.register_gas_limit,
            TxOrigin::Register,
            self.now(),
        ))
    }

    #[tracing::instrument(skip(self, profile), fields(agent_id = %id, ?mode))]
    pub fn register_provider(
        &self,
        id: AgentId,
        profile: HashMap<String, String>,
        mode: model::Mode,
    ) -> Result<TxId> {
        self.store.upsert_agent(id.clone(), Role::Provider, profile.clone())?;
        let params =
            serde_json::json!({ "id": id.as_str(), "mode": mode, "metadataHash": hash_of(&profile) });
        Ok(self.ledger.submit(
            "registerProvider",
            params,
            self.config.register_gas_limit,
            TxOrigin::Register,
            self.now(),
        ))
    }

    #[tracing::instrument(skip(self, new), fields(request_id = %new.request_id))]
    pub fn create_request(&self, new: NewRequest) -> Result<RequestId> {
        let now = self.now();
        let request = self.store.create_request(new, now)?;
        let params = serde_json::json!({
            "id": request.request_id.as_str(),
            "commuterId": request.commuter_id.as_str(),
            "contentHash": hash_of(&request.purpose),
        });
        self.ledger.submit(
            "createRequestHash",
            params,
            self.config.request_gas_limit,
            TxOrigin::Request,
            now,
        );
        Ok(request.request_id)
    }

    #[tracing::instrument(skip(self, new), fields(segment_id = %new.segment_id))]
    pub fn publish_segment(&self, new: NewSegment) -> Result<SegmentId> {
        let now = self.now();
        let segment = self.store.publish_segment(new, now)?;
        let params = serde_json::json!({ "id": segment.segment_id.as_str() });
        self.ledger.submit(
            "mintSegment",
            params,
            self.config.segment_gas_limit,
            TxOrigin::Segment,
            now,
        );
        Ok(segment.segment_id)
    }

    #[tracing::instrument(skip(self, new), fields(request_id = %new.request_id))]
    pub fn submit_offer(&self, new: NewOffer) -> Result<SegmentId> {
        let now = self.now();
        let offer: Offer = self.store.submit_offer(new, now)?;
        let params = serde_json::json!({
            "requestId": offer.request_id.as_str(),
            "providerId": offer.segment.provider_id.as_str(),
            "contentHash": hash_of(&offer.segment.segment_id.as_str()),
        });
        self.ledger.submit(
            "submitOfferHash",
            params,
            self.config.offer_gas_limit,
            TxOrigin::Offer,
            now,
        );
        Ok(offer.segment.segment_id)
    }

    /// Reads a snapshot of currently open/held segments and delegates to the
    /// router; never errors (§4.C's failure model).
    #[tracing::instrument(skip(self))]
    pub fn build_bundles(
        &self,
        origin: Point,
        destination: Point,
        start_time: u64,
    ) -> Vec<Bundle> {
        let window = (start_time, start_time.saturating_add(self.router_opts.time_window));
        let snapshot = self.store.snapshot_segments(
            window,
            &[model::SegmentStatus::Open, model::SegmentStatus::Held],
        );
        let bundles = router::build(&snapshot, origin, destination, start_time, &self.router_opts);
        metrics::Metrics::observe_bundle_candidates(bundles.len());
        bundles
    }

    /// Broadcasts a notification inviting providers to respond with offers;
    /// synchronous and non-blocking (§4.D).
    #[tracing::instrument(skip(self, request), fields(request_id = %request.request_id))]
    pub fn mint_direct_segment_for(&self, request: &Request) {
        self.store.notify_new_request(&request.request_id, request.purpose.clone(), self.now());
    }

    pub fn list_provider_notifications(&self, provider_id: &AgentId, since: usize) -> Vec<Notification> {
        self.store.list_provider_notifications(provider_id, since)
    }

    /// Advances simulated time: expires stale requests/segments and fails
    /// their dependent reservations (§4.D `tick`).
    #[tracing::instrument(skip(self))]
    pub fn tick(&self, now: u64) -> marketplace::ExpiryReport {
        self.current_tick.store(now, Ordering::Relaxed);
        let report = self.store.expire_tick(now);
        self.store.record_tick_aggregate(now);
        report
    }

    #[tracing::instrument(skip(self))]
    pub fn stats(&self) -> Stats {
        let store = self.store.counts();
        metrics::Metrics::record_store_counts(&store);
        Stats { store, ledger: self.ledger.stats() }
    }

    pub fn get_segment(&self, id: &SegmentId) -> Option<Segment> {
        self.store.get_segment(id)
    }
}

/// A short, deterministic content digest standing in for the on-chain
/// `metadataHash`/`contentHash` fields (§6.2); the core never needs to
/// invert it, only to commit to the content once.
fn hash_of(value: &impl serde::Serialize) -> String {
    use sha2::{Digest, Sha256};
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
