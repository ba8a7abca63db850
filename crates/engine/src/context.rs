//! Per-run context shared by the transaction builder and the strategies.

use std::sync::Arc;

use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use tracing::info;

use crate::{AccountState, BenchError, BenchRpc};

/// The node handle, signing key and chain id of a benchmark run.
#[derive(Debug)]
pub struct BenchContext<R> {
    rpc: Arc<R>,
    signer: PrivateKeySigner,
    chain_id: u64,
}

impl<R> Clone for BenchContext<R> {
    fn clone(&self) -> Self {
        Self { rpc: Arc::clone(&self.rpc), signer: self.signer.clone(), chain_id: self.chain_id }
    }
}

impl<R: BenchRpc> BenchContext<R> {
    /// Queries the chain id and builds the context.
    ///
    /// This is the first request of a run, so it doubles as the connectivity check.
    pub async fn connect(rpc: Arc<R>, signer: PrivateKeySigner) -> Result<Self, BenchError> {
        let chain_id = rpc.chain_id().await.map_err(BenchError::ChainId)?;
        info!(chain_id, signer = %signer.address(), "Connected to node");
        Ok(Self { rpc, signer, chain_id })
    }

    /// Fetches the signer's pending nonce as a fresh [`AccountState`].
    pub async fn account_state(&self) -> Result<AccountState, BenchError> {
        let address = self.address();
        let nonce = self.rpc.pending_nonce(address).await.map_err(BenchError::Nonce)?;
        Ok(AccountState::new(address, nonce))
    }
}

impl<R> BenchContext<R> {
    /// Builds a context from already known parts.
    pub const fn new(rpc: Arc<R>, signer: PrivateKeySigner, chain_id: u64) -> Self {
        Self { rpc, signer, chain_id }
    }

    /// Returns the node handle.
    pub const fn rpc(&self) -> &Arc<R> {
        &self.rpc
    }

    /// Returns the signing key.
    pub const fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// Returns the chain id transactions are signed for.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Returns the sending address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }
}
