//! Fire-and-poll submission.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{SubmissionStrategy, sleep_or_cancel};
use crate::{
    AccountState, BenchConfig, BenchContext, BenchError, BenchMetrics, BenchRpc, FeeStrategy,
    ReceiptPoller, SubmissionMode, TransferBuilder, TxResult,
};

/// Submits with `eth_sendRawTransaction` and polls for the receipt.
///
/// Transactions are legacy-priced. A submission failure or an aborted poll ends the run.
#[derive(Debug)]
pub struct PollingStrategy<R> {
    builder: TransferBuilder<R>,
    poller: ReceiptPoller<R>,
    throttle: Duration,
    cancel: CancellationToken,
    metrics: BenchMetrics,
}

impl<R: BenchRpc> PollingStrategy<R> {
    /// Creates the strategy from a connected context and the run parameters.
    pub fn new(ctx: BenchContext<R>, config: &BenchConfig, cancel: CancellationToken) -> Self {
        let poller = ReceiptPoller::new(Arc::clone(ctx.rpc()), config.poll.clone(), cancel.clone());
        Self {
            builder: TransferBuilder::new(ctx, FeeStrategy::Legacy),
            poller,
            throttle: config.throttle,
            cancel,
            metrics: BenchMetrics::default(),
        }
    }

    async fn send_one(
        &self,
        index: usize,
        account: &mut AccountState,
    ) -> Result<TxResult, BenchError> {
        sleep_or_cancel(self.throttle, &self.cancel).await?;

        let transfer = self.builder.build(account).await?;
        let rpc = self.builder.context().rpc();

        let start = Instant::now();
        let sent = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(BenchError::Cancelled),
            sent = rpc.send_raw_transaction(&transfer.raw) => sent,
        };
        let send = start.elapsed();
        let tx_hash = sent.map_err(|source| BenchError::Submit { index, source })?;
        debug!(index, %tx_hash, nonce = transfer.nonce, ?send, "Transaction submitted");
        account.advance();

        let outcome = self
            .poller
            .wait_for(tx_hash)
            .await
            .map_err(|source| BenchError::Poll { index, tx_hash, source })?;

        let record = TxResult::polled(index, tx_hash, send, outcome.elapsed, outcome.attempts);
        self.metrics.send_duration.record(record.send().as_secs_f64());
        self.metrics.confirm_duration.record(record.confirm().as_secs_f64());
        self.metrics.total_duration.record(record.total().as_secs_f64());
        self.metrics.confirmed.increment(1);

        info!(
            index,
            %tx_hash,
            send = ?record.send(),
            confirm = ?record.confirm(),
            total = ?record.total(),
            polls = record.poll_attempts(),
            "Transaction confirmed"
        );
        Ok(record)
    }
}

#[async_trait]
impl<R: BenchRpc + 'static> SubmissionStrategy for PollingStrategy<R> {
    fn mode(&self) -> SubmissionMode {
        SubmissionMode::Async
    }

    async fn run(
        &self,
        account: &mut AccountState,
        tx_count: usize,
    ) -> Result<Vec<TxResult>, BenchError> {
        info!(
            tx_count,
            start_nonce = account.nonce(),
            throttle = ?self.throttle,
            poll = ?self.poller.policy(),
            "Starting async run"
        );

        let mut results = Vec::with_capacity(tx_count);
        for index in 1..=tx_count {
            results.push(self.send_one(index, account).await?);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use alloy_consensus::{Transaction, TxEnvelope};
    use alloy_eips::eip2718::Decodable2718;

    use super::*;
    use crate::{
        PollError, PollPolicy,
        test_utils::{MockRpc, test_signer},
    };

    fn strategy(rpc: MockRpc, config: &BenchConfig) -> (Arc<MockRpc>, PollingStrategy<MockRpc>) {
        let rpc = Arc::new(rpc);
        let ctx = BenchContext::new(Arc::clone(&rpc), test_signer(), 1);
        (rpc, PollingStrategy::new(ctx, config, CancellationToken::new()))
    }

    fn fast_config() -> BenchConfig {
        BenchConfig::default().with_throttle(Duration::ZERO)
    }

    #[tokio::test]
    async fn records_every_transaction_in_order() {
        let (rpc, strategy) =
            strategy(MockRpc::new(1).with_nonce(9).with_receipt_on_poll(2), &fast_config());
        let mut account = AccountState::new(test_signer().address(), 9);

        let results = strategy.run(&mut account, 4).await.unwrap();
        assert_eq!(results.iter().map(TxResult::index).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert!(results.iter().all(|r| r.total() == r.send() + r.confirm()));
        assert!(results.iter().all(|r| r.poll_attempts() == 2));
        assert_eq!(account.nonce(), 13);
        assert_eq!(rpc.receipt_calls(), 8);
    }

    #[tokio::test]
    async fn nonces_are_consecutive() {
        let (rpc, strategy) = strategy(MockRpc::new(1), &fast_config());
        let mut account = AccountState::new(test_signer().address(), 100);

        strategy.run(&mut account, 3).await.unwrap();
        let nonces: Vec<u64> = rpc
            .sent_transactions()
            .iter()
            .map(|raw| TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap().nonce())
            .collect();
        assert_eq!(nonces, vec![100, 101, 102]);
    }

    #[tokio::test]
    async fn submission_failure_is_fatal() {
        let (_, strategy) = strategy(MockRpc::new(1).with_failing_send(), &fast_config());
        let mut account = AccountState::new(test_signer().address(), 0);

        let err = strategy.run(&mut account, 3).await.unwrap_err();
        assert!(matches!(err, BenchError::Submit { index: 1, .. }));
        assert_eq!(account.nonce(), 0);
    }

    #[tokio::test]
    async fn exhausted_poll_bound_is_fatal() {
        let config = fast_config().with_poll(PollPolicy::default().with_max_attempts(Some(3)));
        let (_, strategy) = strategy(MockRpc::new(1).never_confirm(), &config);
        let mut account = AccountState::new(test_signer().address(), 0);

        let err = strategy.run(&mut account, 2).await.unwrap_err();
        assert!(matches!(
            err,
            BenchError::Poll { index: 1, source: PollError::AttemptsExhausted { attempts: 3 }, .. }
        ));
    }

    #[tokio::test]
    async fn cancelled_before_start() {
        let rpc = Arc::new(MockRpc::new(1));
        let ctx = BenchContext::new(rpc, test_signer(), 1);
        let cancel = CancellationToken::new();
        let strategy = PollingStrategy::new(ctx, &BenchConfig::default(), cancel.clone());
        cancel.cancel();

        let mut account = AccountState::new(test_signer().address(), 0);
        assert!(matches!(strategy.run(&mut account, 1).await, Err(BenchError::Cancelled)));
    }

    #[tokio::test]
    async fn reports_async_mode() {
        let (_, strategy) = strategy(MockRpc::new(1), &fast_config());
        assert_eq!(strategy.mode(), SubmissionMode::Async);
    }
}
