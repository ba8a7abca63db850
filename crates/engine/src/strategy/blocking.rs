//! Submit-and-wait submission.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{SubmissionStrategy, sleep_or_cancel};
use crate::{
    AccountState, BenchConfig, BenchContext, BenchError, BenchMetrics, BenchRpc, FeeStrategy,
    ReceiptInfo, SubmissionMode, TransferBuilder, TxResult, sync_send_method,
};

/// Submits through a method that returns only once the receipt exists.
///
/// Transactions are EIP-1559 priced. A failed call skips the iteration after a cooldown; the
/// nonce still moves on.
#[derive(Debug)]
pub struct BlockingStrategy<R> {
    builder: TransferBuilder<R>,
    method: &'static str,
    cooldown: Duration,
    cancel: CancellationToken,
    metrics: BenchMetrics,
}

impl<R: BenchRpc> BlockingStrategy<R> {
    /// Creates the strategy from a connected context and the run parameters.
    ///
    /// The submit method is picked from the context's chain id.
    pub fn new(ctx: BenchContext<R>, config: &BenchConfig, cancel: CancellationToken) -> Self {
        let method = sync_send_method(ctx.chain_id());
        let fees = FeeStrategy::Eip1559 { fee_cap_multiplier: config.fee_cap_multiplier };
        Self {
            builder: TransferBuilder::new(ctx, fees),
            method,
            cooldown: config.sync_cooldown,
            cancel,
            metrics: BenchMetrics::default(),
        }
    }

    /// Returns the submit-and-wait method in use.
    pub const fn method(&self) -> &'static str {
        self.method
    }

    async fn send_one(
        &self,
        index: usize,
        account: &mut AccountState,
    ) -> Result<Option<TxResult>, BenchError> {
        if self.cancel.is_cancelled() {
            return Err(BenchError::Cancelled);
        }

        let transfer = self.builder.build(account).await?;
        let nonce = account.advance();
        let rpc = self.builder.context().rpc();

        let start = Instant::now();
        let response = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(BenchError::Cancelled),
            response = rpc.send_raw_transaction_sync(self.method, &transfer.raw) => response,
        };
        let send = start.elapsed();

        let value = match response {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    index,
                    nonce,
                    method = self.method,
                    error = %err,
                    cooldown = ?self.cooldown,
                    "Submit-and-wait failed, skipping transaction"
                );
                self.metrics.skipped_submissions.increment(1);
                sleep_or_cancel(self.cooldown, &self.cancel).await?;
                return Ok(None);
            }
        };

        let tx_hash = match serde_json::from_value::<ReceiptInfo>(value) {
            Ok(receipt) => {
                if receipt.succeeded() == Some(false) {
                    warn!(index, tx_hash = %receipt.transaction_hash, "Transaction reverted");
                }
                debug!(
                    index,
                    tx_hash = %receipt.transaction_hash,
                    block = ?receipt.block_number,
                    "Receipt returned"
                );
                receipt.transaction_hash
            }
            Err(err) => {
                warn!(index, tx_hash = %transfer.tx_hash, error = %err, "Failed to decode receipt");
                transfer.tx_hash
            }
        };

        let record = TxResult::blocking(index, tx_hash, send);
        self.metrics.send_duration.record(record.send().as_secs_f64());
        self.metrics.total_duration.record(record.total().as_secs_f64());
        self.metrics.confirmed.increment(1);

        info!(index, %tx_hash, total = ?record.total(), "Transaction confirmed");
        Ok(Some(record))
    }
}

#[async_trait]
impl<R: BenchRpc + 'static> SubmissionStrategy for BlockingStrategy<R> {
    fn mode(&self) -> SubmissionMode {
        SubmissionMode::Sync
    }

    async fn run(
        &self,
        account: &mut AccountState,
        tx_count: usize,
    ) -> Result<Vec<TxResult>, BenchError> {
        info!(tx_count, start_nonce = account.nonce(), method = self.method, "Starting sync run");

        let mut results = Vec::with_capacity(tx_count);
        for index in 1..=tx_count {
            if let Some(record) = self.send_one(index, account).await? {
                results.push(record);
            }
        }

        let skipped = tx_count - results.len();
        if skipped > 0 {
            warn!(skipped, tx_count, "Some transactions were not confirmed");
        }
        Ok(results)
    }
}
