//! Caller-supplied construction parameters for records whose derived fields
//! (`createdTick`, `status`, `remaining`, ...) are computed by the store
//! rather than supplied by the caller.

use {
    model::{AgentId, Mode, Point, Price, RequestId, SegmentId, SegmentSource},
    std::collections::HashMap,
};

#[derive(Debug, Clone)]
pub struct NewRequest {
    pub request_id: RequestId,
    pub commuter_id: AgentId,
    pub origin: Point,
    pub destination: Point,
    pub start_time: u64,
    pub max_price: Option<Price>,
    pub purpose: String,
    pub requirements: HashMap<String, String>,
    pub ttl_ticks: u64,
}

#[derive(Debug, Clone)]
pub struct NewSegment {
    pub segment_id: SegmentId,
    pub provider_id: AgentId,
    pub mode: Mode,
    pub origin: Point,
    pub destination: Point,
    pub depart_time: u64,
    pub arrive_time: u64,
    pub price: Price,
    pub capacity: u32,
    pub source: Option<SegmentSource>,
    pub target_request_id: Option<RequestId>,
}

#[derive(Debug, Clone)]
pub struct NewOffer {
    pub segment: NewSegment,
    pub request_id: RequestId,
}
