use {
    crate::{
        ids::{AgentId, RequestId},
        point::Point,
        price::Price,
    },
    serde::{Deserialize, Serialize},
    std::collections::HashMap,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Open,
    Matched,
    Cancelled,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub request_id: RequestId,
    pub commuter_id: AgentId,
    pub origin: Point,
    pub destination: Point,
    pub start_time: u64,
    pub max_price: Option<Price>,
    pub created_tick: u64,
    pub expires_tick: u64,
    pub status: RequestStatus,
    pub purpose: String,
    pub requirements: HashMap<String, String>,
}

impl Request {
    pub fn is_open(&self) -> bool {
        self.status == RequestStatus::Open
    }
}
