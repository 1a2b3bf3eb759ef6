use serde::{Deserialize, Serialize};

/// How `gasPrice` is derived for each submission (§4.A).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum GasPolicy {
    Fixed { gas_price: u64 },
    MultiplierOfSuggested { multiplier: f64 },
    Capped { cap: u64 },
}

impl Default for GasPolicy {
    fn default() -> Self {
        GasPolicy::MultiplierOfSuggested { multiplier: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 5, initial_delay_ms: 200, backoff_factor: 2.0 }
    }
}

/// Deserializable connection and policy configuration for the ledger client
/// (§4.A "Configuration options").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rpc_url: String,
    pub chain_id: u64,
    pub signing_key: String,
    pub gas_policy: GasPolicy,
    pub gas_limit: u64,
    pub max_batch_size: usize,
    pub retry: RetryPolicy,
    pub confirmation_blocks: u64,
    pub poll_interval_ms: u64,
    pub timeout_ticks: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            chain_id: 1,
            signing_key: String::new(),
            gas_policy: GasPolicy::default(),
            gas_limit: 300_000,
            max_batch_size: 16,
            retry: RetryPolicy::default(),
            confirmation_blocks: 1,
            poll_interval_ms: 250,
            timeout_ticks: 200,
        }
    }
}

impl Config {
    /// Parses a deployment manifest in the TOML form described by §6.3,
    /// with `#[serde(default)]` filling in every field the manifest omits.
    pub fn from_toml_str(manifest: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(manifest)?)
    }
}
