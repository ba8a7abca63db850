//! Node RPC capability used by the benchmark.

use alloy_network::Ethereum;
use alloy_primitives::{Address, B256, Bytes};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_client::RpcClient;
use async_trait::async_trait;
use url::Url;

use crate::{ReceiptInfo, RpcError};

/// Chain id that uses the realtime submit-and-wait method.
pub const REALTIME_CHAIN_ID: u64 = 6342;

/// Submit-and-wait method on [`REALTIME_CHAIN_ID`].
pub const REALTIME_SEND_METHOD: &str = "realtime_sendRawTransaction";

/// Submit-and-wait method on every other chain.
pub const SYNC_SEND_METHOD: &str = "eth_sendRawTransactionSync";

/// Returns the submit-and-wait method name for `chain_id`.
pub const fn sync_send_method(chain_id: u64) -> &'static str {
    if chain_id == REALTIME_CHAIN_ID { REALTIME_SEND_METHOD } else { SYNC_SEND_METHOD }
}

/// The node calls the benchmark engine depends on.
///
/// Every method maps to one JSON-RPC request. Implementations must not retry internally; retry
/// policy belongs to the caller.
#[async_trait]
pub trait BenchRpc: Send + Sync {
    /// `eth_chainId`.
    async fn chain_id(&self) -> Result<u64, RpcError>;

    /// `eth_getTransactionCount` at the pending block.
    async fn pending_nonce(&self, address: Address) -> Result<u64, RpcError>;

    /// `eth_gasPrice`.
    async fn gas_price(&self) -> Result<u128, RpcError>;

    /// `eth_maxPriorityFeePerGas`.
    async fn max_priority_fee(&self) -> Result<u128, RpcError>;

    /// `eth_sendRawTransaction`, returning the hash reported by the node.
    async fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, RpcError>;

    /// `eth_getTransactionReceipt`. `Ok(None)` means the transaction is not mined yet.
    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<ReceiptInfo>, RpcError>;

    /// Submits through a method that only returns once the receipt exists.
    ///
    /// The raw JSON result is returned undecoded.
    async fn send_raw_transaction_sync(
        &self,
        method: &'static str,
        raw: &Bytes,
    ) -> Result<serde_json::Value, RpcError>;

    /// `eth_blockNumber`.
    async fn block_number(&self) -> Result<u64, RpcError>;
}

/// [`BenchRpc`] over an alloy HTTP client.
///
/// A single client is shared by every call of a run.
#[derive(Debug, Clone)]
pub struct AlloyRpc {
    client: RpcClient,
    provider: RootProvider<Ethereum>,
}

impl AlloyRpc {
    /// Creates a client for the given HTTP endpoint.
    ///
    /// No request is made until the first call.
    pub fn new_http(url: Url) -> Self {
        let client = RpcClient::builder().http(url);
        let provider = RootProvider::<Ethereum>::new(client.clone());
        Self { client, provider }
    }
}

#[async_trait]
impl BenchRpc for AlloyRpc {
    async fn chain_id(&self) -> Result<u64, RpcError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, RpcError> {
        Ok(self.provider.get_transaction_count(address).pending().await?)
    }

    async fn gas_price(&self) -> Result<u128, RpcError> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn max_priority_fee(&self) -> Result<u128, RpcError> {
        Ok(self.provider.get_max_priority_fee_per_gas().await?)
    }

    async fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, RpcError> {
        let pending = self.provider.send_raw_transaction(raw).await?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<ReceiptInfo>, RpcError> {
        Ok(self
            .client
            .request::<_, Option<ReceiptInfo>>("eth_getTransactionReceipt", (tx_hash,))
            .await?)
    }

    async fn send_raw_transaction_sync(
        &self,
        method: &'static str,
        raw: &Bytes,
    ) -> Result<serde_json::Value, RpcError> {
        Ok(self.client.request::<_, serde_json::Value>(method, (raw.clone(),)).await?)
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        Ok(self.provider.get_block_number().await?)
    }
}
