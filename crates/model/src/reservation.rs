use {
    crate::{
        ids::{AgentId, BundleId, ReservationId, RequestId, SegmentId, TxId},
        price::Price,
    },
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementState {
    Pending,
    Submitted,
    Confirmed,
    Failed,
    Reverted,
}

impl SettlementState {
    /// Enforces the monotonic state machine of §3.2: `pending -> submitted ->
    /// (confirmed | failed) | reverted` (reverted only from confirmed).
    pub fn can_advance_to(self, next: SettlementState) -> bool {
        use SettlementState::*;
        matches!(
            (self, next),
            (Pending, Submitted)
                | (Submitted, Confirmed)
                | (Submitted, Failed)
                | (Confirmed, Reverted)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub commuter_id: AgentId,
    pub request_id: RequestId,
    pub bundle_id: BundleId,
    pub segment_ids: Vec<SegmentId>,
    pub cleared_price: Price,
    pub created_tick: u64,
    pub settlement_state: SettlementState,
    pub tx_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::SettlementState::*;

    #[test]
    fn state_machine_forbids_skipping_submitted() {
        assert!(Pending.can_advance_to(Submitted));
        assert!(!Pending.can_advance_to(Confirmed));
        assert!(Confirmed.can_advance_to(Reverted));
        assert!(!Failed.can_advance_to(Confirmed));
    }
}
