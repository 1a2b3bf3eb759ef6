use {crate::ids::AgentId, serde::{Deserialize, Serialize}, std::collections::HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Commuter,
    Provider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub role: Role,
    pub metadata: HashMap<String, String>,
}
