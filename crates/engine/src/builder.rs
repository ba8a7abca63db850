//! Self-transfer construction and signing.

use alloy_consensus::SignableTransaction;
use alloy_eips::eip2718::Encodable2718;
use alloy_network::TransactionBuilder;
use alloy_primitives::{B256, Bytes, U256};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer::SignerSync;
use tracing::debug;

use crate::{AccountState, BenchContext, BenchError, BenchRpc};

/// Gas limit of a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Value moved by every benchmark transfer, in wei.
pub const TRANSFER_VALUE_WEI: u64 = 10_000_000_000;

/// How fee parameters are derived from the node's suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeStrategy {
    /// Legacy transaction priced at `eth_gasPrice`.
    Legacy,
    /// EIP-1559 transaction: tip from `eth_maxPriorityFeePerGas`, cap at
    /// `eth_gasPrice * fee_cap_multiplier`.
    Eip1559 {
        /// Multiplier applied to the suggested gas price.
        fee_cap_multiplier: u128,
    },
}

/// Fee parameters of one built transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeParams {
    /// Legacy gas price.
    Legacy {
        /// Gas price in wei.
        gas_price: u128,
    },
    /// EIP-1559 caps.
    Eip1559 {
        /// Fee cap in wei.
        max_fee_per_gas: u128,
        /// Tip cap in wei.
        max_priority_fee_per_gas: u128,
    },
}

/// A signed transfer ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
    /// Transaction hash, used for receipt lookups.
    pub tx_hash: B256,
    /// EIP-2718 encoded transaction.
    pub raw: Bytes,
    /// Nonce the transaction was signed with.
    pub nonce: u64,
    /// Fees the transaction was priced with.
    pub fees: FeeParams,
}

/// Builds signed self-transfers for the benchmark account.
#[derive(Debug, Clone)]
pub struct TransferBuilder<R> {
    ctx: BenchContext<R>,
    fees: FeeStrategy,
}

impl<R: BenchRpc> TransferBuilder<R> {
    /// Creates a builder pricing transactions with `fees`.
    pub const fn new(ctx: BenchContext<R>, fees: FeeStrategy) -> Self {
        Self { ctx, fees }
    }

    /// Returns the run context.
    pub const fn context(&self) -> &BenchContext<R> {
        &self.ctx
    }

    /// Queries the node for fresh fee parameters.
    ///
    /// Never cached: every call issues new estimation requests.
    pub async fn fee_params(&self) -> Result<FeeParams, BenchError> {
        let rpc = self.ctx.rpc();
        match self.fees {
            FeeStrategy::Legacy => {
                let gas_price = rpc.gas_price().await.map_err(BenchError::GasPrice)?;
                Ok(FeeParams::Legacy { gas_price })
            }
            FeeStrategy::Eip1559 { fee_cap_multiplier } => {
                let max_priority_fee_per_gas =
                    rpc.max_priority_fee().await.map_err(BenchError::TipCap)?;
                let gas_price = rpc.gas_price().await.map_err(BenchError::GasPrice)?;
                Ok(FeeParams::Eip1559 {
                    max_fee_per_gas: gas_price.saturating_mul(fee_cap_multiplier),
                    max_priority_fee_per_gas,
                })
            }
        }
    }

    /// Builds and signs a transfer for the account's current nonce with fresh fees.
    pub async fn build(&self, account: &AccountState) -> Result<SignedTransfer, BenchError> {
        let fees = self.fee_params().await?;
        self.sign(account, fees)
    }

    /// Signs a transfer for the account's current nonce with the given fees.
    pub fn sign(&self, account: &AccountState, fees: FeeParams) -> Result<SignedTransfer, BenchError> {
        let address = account.address();
        let nonce = account.nonce();

        let request = TransactionRequest::default()
            .from(address)
            .to(address)
            .value(U256::from(TRANSFER_VALUE_WEI))
            .with_nonce(nonce)
            .with_gas_limit(TRANSFER_GAS_LIMIT)
            .with_chain_id(self.ctx.chain_id());
        let request = match fees {
            FeeParams::Legacy { gas_price } => request.with_gas_price(gas_price),
            FeeParams::Eip1559 { max_fee_per_gas, max_priority_fee_per_gas } => request
                .with_max_fee_per_gas(max_fee_per_gas)
                .with_max_priority_fee_per_gas(max_priority_fee_per_gas),
        };

        let tx = request
            .build_typed_tx()
            .map_err(|req| BenchError::Build(format!("incomplete transaction request: {req:?}")))?;

        let signature = self.ctx.signer().sign_hash_sync(&tx.signature_hash())?;
        let signed_tx = tx.into_signed(signature);
        let raw: Bytes = signed_tx.encoded_2718().into();
        let tx_hash = *signed_tx.hash();

        debug!(%tx_hash, nonce, ?fees, "Signed transfer");

        Ok(SignedTransfer { tx_hash, raw, nonce, fees })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alloy_consensus::{Transaction, TxEnvelope};
    use alloy_eips::eip2718::Decodable2718;
    use alloy_primitives::{TxKind, keccak256};

    use super::*;
    use crate::test_utils::{MockRpc, test_signer};

    fn builder(rpc: MockRpc, fees: FeeStrategy) -> (Arc<MockRpc>, TransferBuilder<MockRpc>) {
        let rpc = Arc::new(rpc);
        let ctx = BenchContext::new(Arc::clone(&rpc), test_signer(), rpc.configured_chain_id());
        (rpc, TransferBuilder::new(ctx, fees))
    }

    fn decode(raw: &Bytes) -> TxEnvelope {
        TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap()
    }

    #[tokio::test]
    async fn legacy_transfer_is_a_self_transfer() {
        let (_, builder) = builder(MockRpc::new(1).with_gas_price(3_000), FeeStrategy::Legacy);
        let account = AccountState::new(builder.context().address(), 5);

        let transfer = builder.build(&account).await.unwrap();
        assert_eq!(transfer.nonce, 5);
        assert_eq!(transfer.fees, FeeParams::Legacy { gas_price: 3_000 });
        assert_eq!(transfer.tx_hash, keccak256(&transfer.raw));

        let envelope = decode(&transfer.raw);
        assert!(envelope.is_legacy());
        assert_eq!(envelope.nonce(), 5);
        assert_eq!(envelope.gas_limit(), TRANSFER_GAS_LIMIT);
        assert_eq!(envelope.gas_price(), Some(3_000));
        assert_eq!(envelope.value(), U256::from(TRANSFER_VALUE_WEI));
        assert_eq!(envelope.kind(), TxKind::Call(account.address()));
        assert_eq!(envelope.chain_id(), Some(1));
    }

    #[tokio::test]
    async fn eip1559_fee_cap_is_multiplied() {
        let rpc = MockRpc::new(6342).with_gas_price(1_000).with_priority_fee(7);
        let (_, builder) = builder(rpc, FeeStrategy::Eip1559 { fee_cap_multiplier: 2 });
        let account = AccountState::new(builder.context().address(), 0);

        let transfer = builder.build(&account).await.unwrap();
        assert_eq!(
            transfer.fees,
            FeeParams::Eip1559 { max_fee_per_gas: 2_000, max_priority_fee_per_gas: 7 }
        );

        let envelope = decode(&transfer.raw);
        assert!(envelope.is_eip1559());
        assert_eq!(envelope.max_fee_per_gas(), 2_000);
        assert_eq!(envelope.max_priority_fee_per_gas(), Some(7));
        assert_eq!(envelope.chain_id(), Some(6342));
    }

    #[tokio::test]
    async fn fees_are_fetched_for_every_build() {
        let (rpc, builder) = builder(MockRpc::new(1), FeeStrategy::Legacy);
        let mut account = AccountState::new(builder.context().address(), 0);

        for _ in 0..3 {
            builder.build(&account).await.unwrap();
            account.advance();
        }
        assert_eq!(rpc.gas_price_calls(), 3);
    }

    #[tokio::test]
    async fn fee_estimation_failure_is_fatal() {
        let (_, builder) = builder(MockRpc::new(1).with_failing_gas_price(), FeeStrategy::Legacy);
        let account = AccountState::new(builder.context().address(), 0);
        assert!(matches!(builder.build(&account).await, Err(BenchError::GasPrice(_))));
    }

    #[tokio::test]
    async fn tip_estimation_failure_is_fatal() {
        let rpc = MockRpc::new(1).with_failing_priority_fee();
        let (_, builder) = builder(rpc, FeeStrategy::Eip1559 { fee_cap_multiplier: 2 });
        let account = AccountState::new(builder.context().address(), 0);
        assert!(matches!(builder.build(&account).await, Err(BenchError::TipCap(_))));
    }
}
