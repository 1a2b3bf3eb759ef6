use {
    crate::{
        aggregate::TickAggregate,
        bundle_record::BundleRecord,
        inputs::{NewOffer, NewRequest, NewSegment},
    },
    model::{
        Agent, AgentId, Bundle, BundleId, Error, ErrorKind, Match, Mode, Notification,
        NotificationKind, Offer, OfferId, Point, Price, Request, RequestId, RequestStatus,
        Reservation, ReservationId, Result, Role, Segment, SegmentId, SegmentStatus, round_price,
    },
    std::{
        collections::HashMap,
        sync::RwLock,
    },
};

fn not_found(what: &str, id: impl std::fmt::Display) -> Error {
    Error::new(ErrorKind::NotFound, format!("{what} {id} not found"))
}

fn duplicate(what: &str, id: impl std::fmt::Display) -> Error {
    Error::new(ErrorKind::Duplicate, format!("{what} {id} already exists"))
}

fn invalid(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::InvalidArgument, message)
}

/// An offer and a directly published segment share the same id space: an
/// offer's id is its segment's id (§4.D's "representative" offer is just the
/// bundle's first segment). This avoids inventing a second identifier space
/// that §3.1 never names.
pub fn offer_id_of(segment_id: &SegmentId) -> OfferId {
    OfferId(segment_id.0.clone())
}

struct Inner {
    agents: HashMap<AgentId, Agent>,
    requests: HashMap<RequestId, Request>,
    segments: HashMap<SegmentId, Segment>,
    offers: HashMap<OfferId, Offer>,
    reservations: HashMap<ReservationId, Reservation>,
    matches: HashMap<RequestId, Match>,
    notifications: HashMap<AgentId, Vec<Notification>>,
    bundles: HashMap<BundleId, BundleRecord>,
    tick_aggregates: Vec<TickAggregate>,
}

impl Inner {
    fn new() -> Self {
        Self {
            agents: HashMap::new(),
            requests: HashMap::new(),
            segments: HashMap::new(),
            offers: HashMap::new(),
            reservations: HashMap::new(),
            matches: HashMap::new(),
            notifications: HashMap::new(),
            bundles: HashMap::new(),
            tick_aggregates: Vec::new(),
        }
    }

    fn notify_one(&mut self, provider_id: &AgentId, notification: Notification) {
        self.notifications.entry(provider_id.clone()).or_default().push(notification);
    }

    /// Broadcasts to every known provider regardless of `target`: the store
    /// has no notion of a provider's service area (that is agent behavior,
    /// out of scope per §1), so providers filter on `request_id` themselves.
    fn notify_target_or_broadcast(
        &mut self,
        target: Option<&RequestId>,
        kind: NotificationKind,
        payload: String,
        now: u64,
    ) {
        let notification =
            Notification { kind, request_id: target.cloned(), payload, created_tick: now };
        let providers: Vec<AgentId> =
            self.agents.values().filter(|a| a.role == Role::Provider).map(|a| a.id.clone()).collect();
        for provider in providers {
            self.notify_one(&provider, notification.clone());
        }
    }
}

/// Single source of truth for off-chain marketplace state, guarded by one
/// reader-writer lock. Readers (snapshot builders, the exporter) take the
/// read lock; writers hold the write lock for the duration of a multi-record
/// operation. No operation performs I/O while the lock is held.
pub struct Store {
    inner: RwLock<Inner>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self { inner: RwLock::new(Inner::new()) }
    }

    pub fn upsert_agent(
        &self,
        id: AgentId,
        role: Role,
        metadata: HashMap<String, String>,
    ) -> Result<()> {
        let mut inner = self.inner.write().expect("marketplace store poisoned");
        match inner.agents.get_mut(&id) {
            Some(existing) => {
                if existing.role != role {
                    return Err(invalid(format!(
                        "agent {id} already registered with role {:?}",
                        existing.role
                    )));
                }
                existing.metadata = metadata;
            }
            None => {
                inner.agents.insert(id.clone(), Agent { id, role, metadata });
            }
        }
        Ok(())
    }

    pub fn create_request(&self, new: NewRequest, now: u64) -> Result<Request> {
        let mut inner = self.inner.write().expect("marketplace store poisoned");
        if inner.requests.contains_key(&new.request_id) {
            return Err(duplicate("request", &new.request_id));
        }
        let request = Request {
            request_id: new.request_id,
            commuter_id: new.commuter_id,
            origin: new.origin,
            destination: new.destination,
            start_time: new.start_time,
            max_price: new.max_price,
            created_tick: now,
            expires_tick: now + new.ttl_ticks,
            status: RequestStatus::Open,
            purpose: new.purpose,
            requirements: new.requirements,
        };
        inner.requests.insert(request.request_id.clone(), request.clone());
        tracing::debug!(request_id = %request.request_id, "request created");
        Ok(request)
    }

    pub fn publish_segment(&self, new: NewSegment, now: u64) -> Result<Segment> {
        let mut inner = self.inner.write().expect("marketplace store poisoned");
        if inner.segments.contains_key(&new.segment_id) {
            return Err(duplicate("segment", &new.segment_id));
        }
        if new.arrive_time <= new.depart_time {
            return Err(invalid("arriveTime must be strictly greater than departTime"));
        }
        if new.capacity < 1 {
            return Err(invalid("capacity must be at least 1"));
        }
        let segment = Segment {
            segment_id: new.segment_id,
            provider_id: new.provider_id,
            mode: new.mode,
            origin: new.origin,
            destination: new.destination,
            depart_time: new.depart_time,
            arrive_time: new.arrive_time,
            price: round_price(new.price),
            capacity: new.capacity,
            remaining: new.capacity,
            created_tick: now,
            status: SegmentStatus::Open,
            source: new.source,
            target_request_id: new.target_request_id.clone(),
        };
        inner.segments.insert(segment.segment_id.clone(), segment.clone());
        inner.notify_target_or_broadcast(
            new.target_request_id.as_ref(),
            NotificationKind::NewSegment,
            segment.segment_id.to_string(),
            now,
        );
        tracing::debug!(segment_id = %segment.segment_id, "segment published");
        Ok(segment)
    }

    pub fn submit_offer(&self, new: NewOffer, now: u64) -> Result<Offer> {
        let mut inner = self.inner.write().expect("marketplace store poisoned");
        let request = inner
            .requests
            .get(&new.request_id)
            .ok_or_else(|| not_found("request", &new.request_id))?;
        if !request.is_open() {
            return Err(Error::new(
                ErrorKind::WrongStatus,
                format!("request {} is not open", new.request_id),
            ));
        }
        if inner.segments.contains_key(&new.segment.segment_id) {
            return Err(duplicate("segment", &new.segment.segment_id));
        }
        if new.segment.arrive_time <= new.segment.depart_time {
            return Err(invalid("arriveTime must be strictly greater than departTime"));
        }
        if new.segment.capacity < 1 {
            return Err(invalid("capacity must be at least 1"));
        }
        let segment = Segment {
            segment_id: new.segment.segment_id,
            provider_id: new.segment.provider_id,
            mode: new.segment.mode,
            origin: new.segment.origin,
            destination: new.segment.destination,
            depart_time: new.segment.depart_time,
            arrive_time: new.segment.arrive_time,
            price: round_price(new.segment.price),
            capacity: new.segment.capacity,
            remaining: new.segment.capacity,
            created_tick: now,
            status: SegmentStatus::Open,
            source: new.segment.source,
            target_request_id: Some(new.request_id.clone()),
        };
        inner.segments.insert(segment.segment_id.clone(), segment.clone());
        let offer = Offer { segment: segment.clone(), request_id: new.request_id.clone() };
        inner.offers.insert(offer_id_of(&segment.segment_id), offer.clone());
        inner.notify_target_or_broadcast(
            Some(&new.request_id),
            NotificationKind::NewOffer,
            segment.segment_id.to_string(),
            now,
        );
        tracing::debug!(segment_id = %offer.segment.segment_id, request_id = %offer.request_id, "offer submitted");
        Ok(offer)
    }

    /// A deep-enough copy of matching segments so the router can operate
    /// without holding the store lock.
    pub fn snapshot_segments(
        &self,
        window: (u64, u64),
        statuses: &[SegmentStatus],
    ) -> Vec<Segment> {
        let inner = self.inner.read().expect("marketplace store poisoned");
        inner
            .segments
            .values()
            .filter(|s| s.depart_time >= window.0 && s.depart_time <= window.1)
            .filter(|s| statuses.contains(&s.status))
            .cloned()
            .collect()
    }

    pub fn get_request(&self, id: &RequestId) -> Option<Request> {
        self.inner.read().expect("marketplace store poisoned").requests.get(id).cloned()
    }

    pub fn get_segment(&self, id: &SegmentId) -> Option<Segment> {
        self.inner.read().expect("marketplace store poisoned").segments.get(id).cloned()
    }

    pub fn get_reservation(&self, id: &ReservationId) -> Option<Reservation> {
        self.inner.read().expect("marketplace store poisoned").reservations.get(id).cloned()
    }

    pub fn get_match(&self, request_id: &RequestId) -> Option<Match> {
        self.inner.read().expect("marketplace store poisoned").matches.get(request_id).cloned()
    }

    /// Full dumps of store contents, for the analytical exporter (§4.E);
    /// unlike `snapshot_segments` these are unfiltered and unordered.
    pub fn list_agents(&self) -> Vec<Agent> {
        self.inner.read().expect("marketplace store poisoned").agents.values().cloned().collect()
    }

    pub fn list_requests(&self) -> Vec<Request> {
        self.inner.read().expect("marketplace store poisoned").requests.values().cloned().collect()
    }

    pub fn list_segments(&self) -> Vec<Segment> {
        self.inner.read().expect("marketplace store poisoned").segments.values().cloned().collect()
    }

    pub fn list_reservations(&self) -> Vec<Reservation> {
        self.inner.read().expect("marketplace store poisoned").reservations.values().cloned().collect()
    }

    pub fn list_matches(&self) -> Vec<Match> {
        self.inner.read().expect("marketplace store poisoned").matches.values().cloned().collect()
    }

    /// Atomically decrements `remaining` of every segment by `seats_each`.
    /// If any segment would go negative, doesn't exist, or isn't
    /// `open|held`, the whole call is rolled back (§4.B).
    pub fn hold_segments(
        &self,
        segment_ids: &[SegmentId],
        seats_each: u32,
        holder_request: &RequestId,
    ) -> Result<()> {
        let mut inner = self.inner.write().expect("marketplace store poisoned");
        for id in segment_ids {
            let segment =
                inner.segments.get(id).ok_or_else(|| capacity_denied(format!("{id} missing")))?;
            if !segment.is_open_or_held() {
                return Err(capacity_denied(format!("{id} is not open or held")));
            }
            if segment.remaining < seats_each {
                return Err(capacity_denied(format!("{id} has insufficient remaining capacity")));
            }
        }
        for id in segment_ids {
            let segment = inner.segments.get_mut(id).expect("checked above");
            segment.remaining -= seats_each;
            segment.status = SegmentStatus::Held;
        }
        tracing::debug!(holder = %holder_request, count = segment_ids.len(), "segments held");
        Ok(())
    }

    /// Inverse of `hold_segments`; restores `status` to `open` if
    /// `remaining` returns to `capacity`.
    pub fn release_segments(&self, segment_ids: &[SegmentId], seats_each: u32) -> Result<()> {
        let mut inner = self.inner.write().expect("marketplace store poisoned");
        for id in segment_ids {
            let Some(segment) = inner.segments.get_mut(id) else { continue };
            segment.remaining = (segment.remaining + seats_each).min(segment.capacity);
            if matches!(segment.status, SegmentStatus::Held | SegmentStatus::Consumed)
                && segment.remaining == segment.capacity
            {
                segment.status = SegmentStatus::Open;
            } else if segment.status == SegmentStatus::Consumed {
                segment.status = SegmentStatus::Held;
            }
        }
        tracing::debug!(count = segment_ids.len(), "segments released");
        Ok(())
    }

    /// Finalizes a hold into a consumption once its settlement is
    /// confirmed on-chain (§4.D step 6): any segment whose `remaining` has
    /// reached zero becomes `consumed`.
    pub fn consume_segments(&self, segment_ids: &[SegmentId]) {
        let mut inner = self.inner.write().expect("marketplace store poisoned");
        for id in segment_ids {
            if let Some(segment) = inner.segments.get_mut(id) {
                if segment.remaining == 0 {
                    segment.status = SegmentStatus::Consumed;
                }
            }
        }
    }

    pub fn record_match(
        &self,
        request_id: &RequestId,
        offer_id: OfferId,
        provider_id: AgentId,
        final_price: Price,
        reservation_id: ReservationId,
        now: u64,
    ) -> Result<()> {
        let mut inner = self.inner.write().expect("marketplace store poisoned");
        let request =
            inner.requests.get_mut(request_id).ok_or_else(|| not_found("request", request_id))?;
        if !request.is_open() {
            return Err(Error::new(
                ErrorKind::WrongStatus,
                format!("request {request_id} is not open"),
            ));
        }
        if inner.matches.contains_key(request_id) {
            return Err(Error::new(
                ErrorKind::WrongStatus,
                format!("request {request_id} already matched"),
            ));
        }
        request.status = RequestStatus::Matched;
        inner.matches.insert(
            request_id.clone(),
            Match {
                request_id: request_id.clone(),
                provider_id,
                offer_id,
                final_price: round_price(final_price),
                reservation_id,
                recorded_tick: now,
                tx_hash: None,
            },
        );
        Ok(())
    }

    /// Captures a digest of `bundle` for the analytical exporter (§4.E item
    /// 5). Called once, at the moment a bundle is reserved; idempotent
    /// since a given `bundleId` always carries the same segment list.
    pub fn record_bundle(&self, bundle: &Bundle) {
        let mut inner = self.inner.write().expect("marketplace store poisoned");
        inner.bundles.insert(bundle.bundle_id.clone(), BundleRecord::from(bundle));
    }

    pub fn list_bundles(&self) -> Vec<BundleRecord> {
        self.inner.read().expect("marketplace store poisoned").bundles.values().cloned().collect()
    }

    pub fn record_reservation(&self, reservation: Reservation) -> Result<()> {
        let mut inner = self.inner.write().expect("marketplace store poisoned");
        if inner.reservations.contains_key(&reservation.reservation_id) {
            return Err(duplicate("reservation", &reservation.reservation_id));
        }
        inner.reservations.insert(reservation.reservation_id.clone(), reservation);
        Ok(())
    }

    pub fn update_reservation_state(
        &self,
        reservation_id: &ReservationId,
        new_state: model::SettlementState,
        tx_hash: Option<String>,
        reason: Option<&str>,
    ) -> Result<()> {
        let mut inner = self.inner.write().expect("marketplace store poisoned");
        let reservation = inner
            .reservations
            .get_mut(reservation_id)
            .ok_or_else(|| not_found("reservation", reservation_id))?;
        if reservation.settlement_state == new_state {
            return Ok(()); // idempotent resubmission of the same terminal state
        }
        if !reservation.settlement_state.can_advance_to(new_state) {
            return Err(Error::new(
                ErrorKind::WrongStatus,
                format!(
                    "reservation {reservation_id} cannot advance {:?} -> {:?}",
                    reservation.settlement_state, new_state
                ),
            ));
        }
        reservation.settlement_state = new_state;
        if let Some(hash) = tx_hash {
            reservation.tx_hash = Some(hash);
        }
        if let Some(reason) = reason {
            tracing::info!(%reservation_id, ?new_state, reason, "reservation settlement updated");
        } else {
            tracing::info!(%reservation_id, ?new_state, "reservation settlement updated");
        }
        Ok(())
    }

    /// Tombstones requests and segments whose deadlines have passed. Held
    /// segments that expire release their holds back to the reservations
    /// that were still relying on them, which transition to `failed`; the
    /// reservation's other, still-valid segments are released back to the
    /// pool. Idempotent: re-running with the same `now` changes nothing
    /// (§8.2).
    pub fn expire_tick(&self, now: u64) -> ExpiryReport {
        let mut inner = self.inner.write().expect("marketplace store poisoned");
        let mut report = ExpiryReport::default();

        let expiring_requests: Vec<RequestId> = inner
            .requests
            .values()
            .filter(|r| r.expires_tick <= now && r.status == RequestStatus::Open)
            .map(|r| r.request_id.clone())
            .collect();
        for id in &expiring_requests {
            if let Some(r) = inner.requests.get_mut(id) {
                r.status = RequestStatus::Expired;
                tracing::debug!(request_id = %id, "request expired");
            }
        }
        report.requests_expired = expiring_requests.len();

        let expiring_segments: Vec<SegmentId> = inner
            .segments
            .values()
            .filter(|s| {
                s.depart_time < now
                    && matches!(s.status, SegmentStatus::Open | SegmentStatus::Held)
            })
            .map(|s| s.segment_id.clone())
            .collect();

        for segment_id in &expiring_segments {
            let was_held =
                inner.segments.get(segment_id).map(|s| s.status == SegmentStatus::Held);
            if let Some(segment) = inner.segments.get_mut(segment_id) {
                segment.status = SegmentStatus::Expired;
            }
            if was_held == Some(true) {
                let affected: Vec<ReservationId> = inner
                    .reservations
                    .values()
                    .filter(|res| {
                        res.segment_ids.contains(segment_id)
                            && matches!(
                                res.settlement_state,
                                model::SettlementState::Pending | model::SettlementState::Submitted
                            )
                    })
                    .map(|res| res.reservation_id.clone())
                    .collect();
                for reservation_id in affected {
                    let (request_id, other_segments) = {
                        let res = inner.reservations.get(&reservation_id).expect("just found");
                        (
                            res.request_id.clone(),
                            res.segment_ids
                                .iter()
                                .filter(|id| *id != segment_id)
                                .cloned()
                                .collect::<Vec<_>>(),
                        )
                    };
                    for other in &other_segments {
                        if let Some(seg) = inner.segments.get_mut(other) {
                            seg.remaining = (seg.remaining + 1).min(seg.capacity);
                            if seg.remaining == seg.capacity {
                                seg.status = SegmentStatus::Open;
                            }
                        }
                    }
                    if let Some(res) = inner.reservations.get_mut(&reservation_id) {
                        res.settlement_state = model::SettlementState::Failed;
                    }
                    if let Some(req) = inner.requests.get_mut(&request_id) {
                        if req.status == RequestStatus::Matched {
                            req.status = RequestStatus::Open;
                        }
                    }
                    report.reservations_failed += 1;
                }
            }
            // §3.2: `expireSegment` drives `remaining` to 0, same as any
            // other terminal status transition on a segment.
            if let Some(segment) = inner.segments.get_mut(segment_id) {
                segment.remaining = 0;
            }
        }
        report.segments_expired = expiring_segments.len();

        if report.requests_expired > 0 || report.segments_expired > 0 {
            tracing::info!(
                requests_expired = report.requests_expired,
                segments_expired = report.segments_expired,
                reservations_failed = report.reservations_failed,
                "expire_tick completed"
            );
        }
        report
    }

    /// All reservations citing `request_id`, used by the confirmation
    /// handler to decide whether a request should revert to `open` after one
    /// of its reservations fails (§4.D step 6: only if no other reservation
    /// is still `submitted|confirmed`).
    pub fn reservations_for_request(&self, request_id: &RequestId) -> Vec<Reservation> {
        let inner = self.inner.read().expect("marketplace store poisoned");
        inner.reservations.values().filter(|r| &r.request_id == request_id).cloned().collect()
    }

    /// Reverts `request_id` to `open` after a reservation failure; a no-op
    /// if it is not currently `matched` (§4.D step 6).
    pub fn reopen_request(&self, request_id: &RequestId) {
        let mut inner = self.inner.write().expect("marketplace store poisoned");
        if let Some(req) = inner.requests.get_mut(request_id) {
            if req.status == RequestStatus::Matched {
                req.status = RequestStatus::Open;
            }
        }
    }

    pub fn list_provider_notifications(&self, provider_id: &AgentId, since: usize) -> Vec<Notification> {
        let inner = self.inner.read().expect("marketplace store poisoned");
        inner
            .notifications
            .get(provider_id)
            .map(|log| log.iter().skip(since).cloned().collect())
            .unwrap_or_default()
    }

    /// Broadcasts a `NewRequest` notification without creating any segment
    /// (§4.D `mintDirectSegmentFor`: providers respond externally via
    /// `submitOffer`).
    pub fn notify_new_request(&self, request_id: &RequestId, payload: String, now: u64) {
        let mut inner = self.inner.write().expect("marketplace store poisoned");
        inner.notify_target_or_broadcast(Some(request_id), NotificationKind::NewRequest, payload, now);
    }

    /// A single-pass tally of store contents, for the Coordinator's
    /// aggregated `stats()`.
    pub fn counts(&self) -> StoreCounts {
        let inner = self.inner.read().expect("marketplace store poisoned");
        let mut counts = StoreCounts::default();
        for r in inner.requests.values() {
            match r.status {
                RequestStatus::Open => counts.requests_open += 1,
                RequestStatus::Matched => counts.requests_matched += 1,
                RequestStatus::Cancelled => counts.requests_cancelled += 1,
                RequestStatus::Expired => counts.requests_expired += 1,
            }
        }
        for s in inner.segments.values() {
            match s.status {
                SegmentStatus::Open => counts.segments_open += 1,
                SegmentStatus::Held => counts.segments_held += 1,
                SegmentStatus::Consumed => counts.segments_consumed += 1,
                SegmentStatus::Expired => counts.segments_expired += 1,
                SegmentStatus::Cancelled => counts.segments_cancelled += 1,
            }
        }
        counts.reservations = inner.reservations.len();
        counts.matches = inner.matches.len();
        counts
    }

    /// Computes and appends one `TickAggregate` snapshot for `now`, for the
    /// exporter's per-tick aggregates table (§4.E item 8). Intended to be
    /// called once per `tick()` after `expire_tick`.
    pub fn record_tick_aggregate(&self, now: u64) {
        let mut inner = self.inner.write().expect("marketplace store poisoned");
        let mut aggregate = TickAggregate { tick: now, ..Default::default() };
        let mut price_sum = Price::ZERO;
        let mut price_count: u32 = 0;
        for r in inner.requests.values() {
            if r.status == RequestStatus::Open {
                aggregate.requests_open += 1;
            }
        }
        for s in inner.segments.values() {
            if s.status == SegmentStatus::Open {
                aggregate.segments_open += 1;
                price_sum += s.price;
                price_count += 1;
                *aggregate.mode_histogram.entry(s.mode).or_insert(0) += 1;
            }
        }
        if price_count > 0 {
            aggregate.mean_segment_price =
                (price_sum / Price::from(price_count as u64)).to_string().parse().unwrap_or(0.0);
        }
        inner.tick_aggregates.push(aggregate);
    }

    pub fn tick_aggregates(&self) -> Vec<TickAggregate> {
        self.inner.read().expect("marketplace store poisoned").tick_aggregates.clone()
    }
}

#[derive(Debug, Default, Clone, Copy, serde::Serialize)]
pub struct StoreCounts {
    pub requests_open: usize,
    pub requests_matched: usize,
    pub requests_cancelled: usize,
    pub requests_expired: usize,
    pub segments_open: usize,
    pub segments_held: usize,
    pub segments_consumed: usize,
    pub segments_expired: usize,
    pub segments_cancelled: usize,
    pub reservations: usize,
    pub matches: usize,
}

fn capacity_denied(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::CapacityDenied, message)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ExpiryReport {
    pub requests_expired: usize,
    pub segments_expired: usize,
    pub reservations_failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{Point, SegmentSource};
    use std::collections::HashMap as Map;

    fn segment(id: &str, capacity: u32) -> NewSegment {
        NewSegment {
            segment_id: SegmentId::from(id),
            provider_id: AgentId::from("prov-1"),
            mode: Mode::Bike,
            origin: Point::new(0.0, 0.0),
            destination: Point::new(10.0, 10.0),
            depart_time: 50,
            arrive_time: 70,
            price: Price::new(1200, 2),
            capacity,
            source: Some(SegmentSource::Proactive),
            target_request_id: None,
        }
    }

    #[test]
    fn publish_then_snapshot_round_trips_at_full_capacity() {
        let store = Store::new();
        store.publish_segment(segment("A", 1), 10).unwrap();
        let found = store.snapshot_segments((0, 100), &[SegmentStatus::Open]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].remaining, found[0].capacity);
    }

    #[test]
    fn hold_is_atomic_across_segments() {
        let store = Store::new();
        store.publish_segment(segment("A", 1), 10).unwrap();
        store.publish_segment(segment("B", 0), 10).unwrap_err(); // capacity 0 invalid
        store.publish_segment(segment("B", 1), 10).unwrap();

        // Exhaust B's capacity first so the joint hold fails entirely.
        store
            .hold_segments(&[SegmentId::from("B")], 1, &RequestId::from("other"))
            .unwrap();

        let result = store.hold_segments(
            &[SegmentId::from("A"), SegmentId::from("B")],
            1,
            &RequestId::from("R1"),
        );
        assert!(result.is_err());
        let a = store.get_segment(&SegmentId::from("A")).unwrap();
        assert_eq!(a.remaining, 1, "A must not be touched when B fails");
    }

    #[test]
    fn upsert_agent_rejects_role_change() {
        let store = Store::new();
        store.upsert_agent(AgentId::from("c1"), Role::Commuter, Map::new()).unwrap();
        let err = store.upsert_agent(AgentId::from("c1"), Role::Provider, Map::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn expire_tick_is_idempotent() {
        let store = Store::new();
        store
            .publish_segment(NewSegment { depart_time: 5, arrive_time: 6, ..segment("X", 1) }, 1)
            .unwrap();
        let first = store.expire_tick(10);
        let second = store.expire_tick(10);
        assert_eq!(first.segments_expired, 1);
        assert_eq!(second.segments_expired, 0);
    }

    #[test]
    fn expire_tick_zeroes_remaining_capacity() {
        let store = Store::new();
        store
            .publish_segment(NewSegment { depart_time: 5, arrive_time: 6, ..segment("X", 3) }, 1)
            .unwrap();
        store.expire_tick(10);
        let expired = store.get_segment(&SegmentId::from("X")).unwrap();
        assert_eq!(expired.status, SegmentStatus::Expired);
        assert_eq!(expired.remaining, 0);
    }
}
