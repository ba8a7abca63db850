//! End-to-end runs of both strategies against the in-memory node.

use std::{sync::Arc, time::Duration};

use alloy_consensus::{Transaction, TxEnvelope};
use alloy_eips::eip2718::Decodable2718;
use evmbench_cli_utils::init_test_tracing;
use evmbench_engine::{
    BenchConfig, BenchContext, BlockingStrategy, LatencyStats, PollPolicy, PollingStrategy,
    ResultsTable, SubmissionMode, SubmissionStrategy, TxResult,
    test_utils::{MockRpc, test_signer},
};
use eyre::Result;
use tokio_util::sync::CancellationToken;

fn nonces(rpc: &MockRpc) -> Vec<u64> {
    rpc.sent_transactions()
        .iter()
        .map(|raw| TxEnvelope::decode_2718(&mut raw.as_ref()).map(|tx| tx.nonce()))
        .collect::<Result<_, _>>()
        .expect("mock only receives valid transactions")
}

async fn connect(rpc: MockRpc) -> Result<(Arc<MockRpc>, BenchContext<MockRpc>)> {
    let rpc = Arc::new(rpc);
    let ctx = BenchContext::connect(Arc::clone(&rpc), test_signer()).await?;
    Ok((rpc, ctx))
}

#[tokio::test]
async fn async_run_confirms_on_second_poll() -> Result<()> {
    init_test_tracing();

    let (rpc, ctx) = connect(MockRpc::new(8453).with_nonce(7).with_receipt_on_poll(2)).await?;
    let mut account = ctx.account_state().await?;
    let config = BenchConfig::default()
        .with_tx_count(3)
        .with_poll(PollPolicy::default().with_interval(Duration::from_millis(1)));

    let strategy = PollingStrategy::new(ctx, &config, CancellationToken::new());
    let results = strategy.run(&mut account, config.tx_count).await?;

    assert_eq!(results.len(), 3);
    assert_eq!(results.iter().map(TxResult::index).collect::<Vec<_>>(), vec![1, 2, 3]);
    for record in &results {
        assert!(record.confirm() >= Duration::from_millis(1));
        assert_eq!(record.poll_attempts(), 2);
        assert_eq!(record.total(), record.send() + record.confirm());
    }
    assert_eq!(nonces(&rpc), vec![7, 8, 9]);
    assert_eq!(account.nonce(), 10);

    let stats = LatencyStats::from_results(&results).expect("three records");
    assert!(stats.confirm.min >= 1_000);

    let table = ResultsTable::new(SubmissionMode::Async, &results, Duration::from_secs(1));
    assert!(table.to_string().contains("LATENCY STATISTICS"));
    Ok(())
}

#[tokio::test]
async fn sync_run_skips_failed_iterations() -> Result<()> {
    init_test_tracing();

    let (rpc, ctx) = connect(MockRpc::new(6342).with_failing_sync_calls([1, 3])).await?;
    let mut account = ctx.account_state().await?;
    let config = BenchConfig::default()
        .with_tx_count(4)
        .with_mode(SubmissionMode::Sync)
        .with_sync_cooldown(Duration::from_millis(1));

    let strategy = BlockingStrategy::new(ctx, &config, CancellationToken::new());
    let results = strategy.run(&mut account, config.tx_count).await?;

    assert_eq!(results.iter().map(TxResult::index).collect::<Vec<_>>(), vec![2, 4]);
    assert!(results.iter().all(|r| r.confirm().is_zero() && r.total() == r.send()));
    assert_eq!(nonces(&rpc), vec![0, 1, 2, 3]);
    assert_eq!(account.nonce(), 4);
    assert_eq!(rpc.sync_methods(), vec!["realtime_sendRawTransaction"; 4]);
    Ok(())
}

#[tokio::test]
async fn strategies_are_interchangeable() -> Result<()> {
    let config = BenchConfig::default().with_tx_count(2).with_throttle(Duration::ZERO);

    for mode in [SubmissionMode::Async, SubmissionMode::Sync] {
        let (_, ctx) = connect(MockRpc::new(1)).await?;
        let mut account = ctx.account_state().await?;
        let strategy: Box<dyn SubmissionStrategy> = match mode {
            SubmissionMode::Async => {
                Box::new(PollingStrategy::new(ctx, &config, CancellationToken::new()))
            }
            SubmissionMode::Sync => {
                Box::new(BlockingStrategy::new(ctx, &config, CancellationToken::new()))
            }
        };

        assert_eq!(strategy.mode(), mode);
        assert_eq!(strategy.run(&mut account, config.tx_count).await?.len(), 2);
    }
    Ok(())
}

#[tokio::test]
async fn cancellation_interrupts_unbounded_polling() -> Result<()> {
    let (_, ctx) = connect(MockRpc::new(1).never_confirm()).await?;
    let mut account = ctx.account_state().await?;
    let cancel = CancellationToken::new();
    let strategy = PollingStrategy::new(ctx, &BenchConfig::default(), cancel.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let err = strategy.run(&mut account, 1).await.unwrap_err();
    assert!(err.to_string().contains("cancelled"));
    canceller.await?;
    Ok(())
}
