use {
    crate::{
        ids::{AgentId, RequestId, SegmentId},
        point::Point,
        price::Price,
    },
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Bike,
    Bus,
    Train,
    Car,
    Scooter,
    Walk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStatus {
    Open,
    Held,
    Consumed,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentSource {
    Proactive,
    ResponseToRequest,
}

/// The tokenizable capacity unit: one provider, one leg, one price, one
/// small integer capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub segment_id: SegmentId,
    pub provider_id: AgentId,
    pub mode: Mode,
    pub origin: Point,
    pub destination: Point,
    pub depart_time: u64,
    pub arrive_time: u64,
    pub price: Price,
    pub capacity: u32,
    pub remaining: u32,
    pub created_tick: u64,
    pub status: SegmentStatus,
    pub source: Option<SegmentSource>,
    pub target_request_id: Option<RequestId>,
}

impl Segment {
    pub fn is_open_or_held(&self) -> bool {
        matches!(self.status, SegmentStatus::Open | SegmentStatus::Held)
    }
}
