use {async_trait::async_trait, serde_json::Value};

/// An inclusion receipt as reported by the chain.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub block_number: u64,
    pub gas_used: u64,
    pub status: bool,
    pub revert_reason: Option<String>,
}

/// The minimal JSON-RPC surface the submitter and watcher tasks need.
/// Isolated behind a trait so the client's retry/nonce/batching logic is
/// testable without a live chain (`testlib::FakeRpc` implements this for
/// integration tests; `AlloyRpc` talks to a real endpoint).
#[async_trait]
pub trait Rpc: Send + Sync {
    async fn chain_id(&self) -> anyhow::Result<u64>;
    async fn nonce(&self, address: &str) -> anyhow::Result<u64>;
    async fn suggested_gas_price(&self) -> anyhow::Result<u64>;
    async fn block_number(&self) -> anyhow::Result<u64>;
    /// Signs and submits `method(params)` at `nonce`; returns the tx hash.
    async fn send(
        &self,
        method: &str,
        params: &Value,
        nonce: u64,
        gas_limit: u64,
        gas_price: u64,
    ) -> anyhow::Result<String>;
    /// `Ok(None)` while the transaction is still pending.
    async fn receipt(&self, tx_hash: &str) -> anyhow::Result<Option<Receipt>>;
}

/// Production `Rpc` backed by a live JSON-RPC endpoint.
pub mod alloy_rpc {
    use {
        super::{Receipt, Rpc},
        alloy::{
            network::EthereumWallet,
            primitives::Address,
            providers::{DynProvider, Provider, ProviderBuilder},
            rpc::types::TransactionRequest,
            signers::local::PrivateKeySigner,
        },
        async_trait::async_trait,
        serde_json::Value,
        std::str::FromStr,
    };

    /// Encodes `method`/`params` into calldata for contract addressing
    /// (§4.A "contract method addressing"). The core never decodes an ABI;
    /// it only needs a stable, deterministic byte encoding per call.
    fn encode_call(method: &str, params: &Value) -> Vec<u8> {
        let payload = serde_json::json!({ "method": method, "params": params });
        payload.to_string().into_bytes()
    }

    pub struct AlloyRpc {
        provider: DynProvider,
        signer_address: Address,
        to: Address,
    }

    impl AlloyRpc {
        pub async fn connect(rpc_url: &str, signing_key: &str, to: &str) -> anyhow::Result<Self> {
            let signer = PrivateKeySigner::from_str(signing_key)?;
            let signer_address = signer.address();
            let wallet = EthereumWallet::from(signer);
            let provider = ProviderBuilder::new()
                .wallet(wallet)
                .connect_http(rpc_url.parse()?)
                .erased();
            let to = Address::from_str(to)?;
            Ok(Self { provider, signer_address, to })
        }
    }

    #[async_trait]
    impl Rpc for AlloyRpc {
        async fn chain_id(&self) -> anyhow::Result<u64> {
            Ok(self.provider.get_chain_id().await?)
        }

        async fn nonce(&self, address: &str) -> anyhow::Result<u64> {
            let address = Address::from_str(address)?;
            Ok(self.provider.get_transaction_count(address).await?)
        }

        async fn suggested_gas_price(&self) -> anyhow::Result<u64> {
            Ok(self.provider.get_gas_price().await? as u64)
        }

        async fn block_number(&self) -> anyhow::Result<u64> {
            Ok(self.provider.get_block_number().await?)
        }

        async fn send(
            &self,
            method: &str,
            params: &Value,
            nonce: u64,
            gas_limit: u64,
            gas_price: u64,
        ) -> anyhow::Result<String> {
            let data = encode_call(method, params);
            let tx = TransactionRequest::default()
                .from(self.signer_address)
                .to(self.to)
                .input(data.into())
                .nonce(nonce)
                .gas_limit(gas_limit)
                .gas_price(gas_price as u128);
            let pending = self.provider.send_transaction(tx).await?;
            Ok(format!("{:#x}", pending.tx_hash()))
        }

        async fn receipt(&self, tx_hash: &str) -> anyhow::Result<Option<Receipt>> {
            let hash = alloy::primitives::B256::from_str(tx_hash)?;
            match self.provider.get_transaction_receipt(hash).await? {
                None => Ok(None),
                Some(r) => Ok(Some(Receipt {
                    block_number: r.block_number.unwrap_or_default(),
                    gas_used: r.gas_used as u64,
                    status: r.status(),
                    revert_reason: None,
                })),
            }
        }
    }
}
