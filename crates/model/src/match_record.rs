use {
    crate::{
        ids::{AgentId, OfferId, ReservationId, RequestId},
        price::Price,
    },
    serde::{Deserialize, Serialize},
};

/// The authoritative record of a won offer for a request; one per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub request_id: RequestId,
    pub provider_id: AgentId,
    pub offer_id: OfferId,
    pub final_price: Price,
    pub reservation_id: ReservationId,
    pub recorded_tick: u64,
    pub tx_hash: Option<String>,
}
