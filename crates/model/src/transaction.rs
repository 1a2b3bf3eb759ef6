use {crate::ids::TxId, serde::{Deserialize, Serialize}};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxState {
    Queued,
    Submitted,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxOrigin {
    Register,
    Request,
    Offer,
    Match,
    Segment,
    Reservation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub tx_id: TxId,
    pub method: String,
    pub params: serde_json::Value,
    pub gas_limit: u64,
    pub nonce: Option<u64>,
    pub submitted_at: u64,
    pub state: TxState,
    pub tx_hash: Option<String>,
    pub gas_used: Option<u64>,
    pub error: Option<String>,
    pub origin: TxOrigin,
}
