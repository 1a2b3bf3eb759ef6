/// Gas ceilings the Coordinator attaches to each kind of ledger submission.
/// The spec names the contracts (§6.2) but not per-call gas sizing; these
/// defaults are generous round numbers for simple hash/state-flag calls.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct Config {
    pub register_gas_limit: u64,
    pub request_gas_limit: u64,
    pub segment_gas_limit: u64,
    pub offer_gas_limit: u64,
    pub match_gas_limit: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            register_gas_limit: 60_000,
            request_gas_limit: 80_000,
            segment_gas_limit: 80_000,
            offer_gas_limit: 80_000,
            match_gas_limit: 120_000,
        }
    }
}
