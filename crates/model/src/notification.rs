use {crate::ids::RequestId, serde::{Deserialize, Serialize}};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    NewRequest,
    NewOffer,
    NewSegment,
}

/// A providerId-scoped message. Delivery is in-process, at-least-once, and
/// not persisted across restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub request_id: Option<RequestId>,
    pub payload: String,
    pub created_tick: u64,
}
