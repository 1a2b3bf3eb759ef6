use {
    crate::{ids::RequestId, segment::Segment},
    serde::{Deserialize, Serialize},
};

/// A Segment submitted in response to a specific Request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub segment: Segment,
    pub request_id: RequestId,
}
