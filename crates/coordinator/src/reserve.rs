use {
    crate::Coordinator,
    model::{
        Bundle, Error, ErrorKind, AgentId, Reservation, ReservationId, RequestId, Result,
        SettlementState, TxOrigin, TxState,
    },
    serde_json::json,
};

impl Coordinator {
    /// The atomic commit point of the system (§4.D). Validates the bundle
    /// against the current store, holds its segments, records the
    /// reservation and match, queues the on-chain settlement, and spawns a
    /// background task to reconcile the reservation's final state once the
    /// ledger confirms or fails the transaction.
    #[tracing::instrument(skip(self, bundle), fields(request_id = %request_id, bundle_id = %bundle.bundle_id))]
    pub async fn reserve_bundle(
        &self,
        commuter_id: AgentId,
        request_id: RequestId,
        bundle: Bundle,
    ) -> Result<ReservationId> {
        let now = self.now();
        let request = self
            .store
            .get_request(&request_id)
            .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("request {request_id} not found")))?;
        if !request.is_open() {
            return Err(Error::new(
                ErrorKind::WrongStatus,
                format!("request {request_id} is not open"),
            ));
        }
        if request.commuter_id != commuter_id {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "commuter does not own this request",
            ));
        }

        let mut segments = Vec::with_capacity(bundle.segments.len());
        for id in &bundle.segments {
            let segment = self
                .store
                .get_segment(id)
                .ok_or_else(|| Error::new(ErrorKind::BundleStale, format!("segment {id} no longer exists")))?;
            if !segment.is_open_or_held() {
                return Err(Error::new(
                    ErrorKind::BundleStale,
                    format!("segment {id} is no longer open"),
                ));
            }
            segments.push(segment);
        }
        for pair in segments.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let tolerance = self.router_opts.time_tolerance;
            if b.depart_time < a.arrive_time || b.depart_time - a.arrive_time > tolerance {
                return Err(Error::new(ErrorKind::BundleStale, "temporal invariant violated"));
            }
            if !a.destination.is_near(&b.origin, self.router_opts.nearness_epsilon) {
                return Err(Error::new(ErrorKind::BundleStale, "spatial invariant violated"));
            }
        }
        if let Some(max_price) = request.max_price {
            if bundle.final_price > max_price {
                return Err(Error::new(
                    ErrorKind::InvalidArgument,
                    "bundle price exceeds request maxPrice",
                ));
            }
        }

        self.store.hold_segments(&bundle.segments, 1, &request_id).map_err(|e| {
            if e.kind == ErrorKind::CapacityDenied {
                Error::new(ErrorKind::BundleStale, e.message)
            } else {
                e
            }
        })?;

        let reservation_id = self.next_reservation_id();
        let reservation = Reservation {
            reservation_id: reservation_id.clone(),
            commuter_id,
            request_id: request_id.clone(),
            bundle_id: bundle.bundle_id.clone(),
            segment_ids: bundle.segments.clone(),
            cleared_price: bundle.final_price,
            created_tick: now,
            settlement_state: SettlementState::Pending,
            tx_hash: None,
        };
        if let Err(e) = self.store.record_reservation(reservation) {
            self.store.release_segments(&bundle.segments, 1)?;
            return Err(e);
        }
        self.store.record_bundle(&bundle);

        // §4.D step 3 note: a multi-provider bundle is recorded on-chain
        // against a single "representative" offer, the bundle's first
        // segment; providers beyond it are only visible through the
        // analytical store's per-segment reservation rows.
        let primary_offer_id = marketplace::offer_id_of(&bundle.segments[0]);
        let representative_provider = segments[0].provider_id.clone();
        if let Err(e) = self.store.record_match(
            &request_id,
            primary_offer_id.clone(),
            representative_provider.clone(),
            bundle.final_price,
            reservation_id.clone(),
            now,
        ) {
            self.store.release_segments(&bundle.segments, 1)?;
            return Err(e);
        }

        let params = json!({
            "requestId": request_id.as_str(),
            "offerId": primary_offer_id.as_str(),
            "providerId": representative_provider.as_str(),
            "priceWei": bundle.final_price.to_string(),
        });
        let tx_id =
            self.ledger.submit("recordMatch", params, self.config.match_gas_limit, TxOrigin::Match, now);
        self.store.update_reservation_state(&reservation_id, SettlementState::Submitted, None, None)?;

        self.spawn_confirmation_handler(
            reservation_id.clone(),
            tx_id,
            bundle.segments.clone(),
            request_id,
        );

        Ok(reservation_id)
    }

    fn spawn_confirmation_handler(
        &self,
        reservation_id: ReservationId,
        tx_id: model::TxId,
        segment_ids: Vec<model::SegmentId>,
        request_id: RequestId,
    ) {
        let store = self.store.clone();
        let ledger = self.ledger.clone();
        tokio::spawn(async move {
            let Ok(tx) = ledger.await_tx(&tx_id).await else {
                tracing::warn!(%reservation_id, "ledger lost track of settlement transaction");
                return;
            };
            match tx.state {
                TxState::Confirmed => {
                    let _ = store.update_reservation_state(
                        &reservation_id,
                        SettlementState::Confirmed,
                        tx.tx_hash.clone(),
                        None,
                    );
                    store.consume_segments(&segment_ids);
                }
                _ => {
                    let _ = store.update_reservation_state(
                        &reservation_id,
                        SettlementState::Failed,
                        None,
                        tx.error.as_deref(),
                    );
                    let _ = store.release_segments(&segment_ids, 1);
                    let still_active = store.reservations_for_request(&request_id).iter().any(|r| {
                        r.reservation_id != reservation_id
                            && matches!(
                                r.settlement_state,
                                SettlementState::Submitted | SettlementState::Confirmed
                            )
                    });
                    if !still_active {
                        store.reopen_request(&request_id);
                    }
                }
            }
        });
    }
}
