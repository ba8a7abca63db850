//! Command implementations.

use std::{
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};

use evmbench_engine::{
    AccountState, AlloyRpc, BenchConfig, BenchContext, BlockingStrategy, EnvConfig,
    PollingStrategy, SubmissionMode, SubmissionStrategy, TxResult,
};
use eyre::{Result, WrapErr};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::Commands;

mod bench;
mod compare;
mod receipt_count;
mod resp_time;

impl Commands {
    /// Runs the selected command until completion or cancellation.
    pub(crate) async fn run(self, cancel: CancellationToken) -> Result<()> {
        match self {
            Self::Bench(args) => bench::run(args, cancel).await,
            Self::Compare(args) => compare::run(args, cancel).await,
            Self::ReceiptCount(args) => receipt_count::run(args, cancel).await,
            Self::RespTime(args) => resp_time::run(args).await,
        }
    }
}

/// Loads the env file and opens the HTTP client. No request is made yet.
fn open_rpc(env_file: &Path) -> Result<(EnvConfig, Arc<AlloyRpc>)> {
    let env = EnvConfig::from_env_file(env_file)
        .wrap_err_with(|| format!("Failed to load configuration from {}", env_file.display()))?;
    info!(endpoint = %env.rpc_url, keys = env.signers.len(), "Loaded configuration");
    let rpc = Arc::new(AlloyRpc::new_http(env.rpc_url.clone()));
    Ok((env, rpc))
}

/// Validates `config`, connects to the node and fetches the starting nonce.
async fn connect(
    env_file: &Path,
    config: &BenchConfig,
) -> Result<(BenchContext<AlloyRpc>, AccountState)> {
    config.validate()?;
    let (env, rpc) = open_rpc(env_file)?;
    let ctx = BenchContext::connect(rpc, env.primary_signer().clone())
        .await
        .wrap_err("Failed to connect to RPC endpoint")?;
    let account = ctx.account_state().await?;
    info!(address = %account.address(), nonce = account.nonce(), "Starting nonce");
    Ok((ctx, account))
}

/// Picks the strategy implementing `config.mode`.
fn strategy(
    ctx: BenchContext<AlloyRpc>,
    config: &BenchConfig,
    cancel: CancellationToken,
) -> Box<dyn SubmissionStrategy> {
    match config.mode {
        SubmissionMode::Async => Box::new(PollingStrategy::new(ctx, config, cancel)),
        SubmissionMode::Sync => Box::new(BlockingStrategy::new(ctx, config, cancel)),
    }
}

/// Runs one strategy and returns its records with the wall-clock time it took.
async fn run_strategy(
    ctx: BenchContext<AlloyRpc>,
    account: &mut AccountState,
    config: &BenchConfig,
    cancel: CancellationToken,
) -> Result<(Vec<TxResult>, Duration)> {
    let strategy = strategy(ctx, config, cancel);
    let start = Instant::now();
    let results = strategy
        .run(account, config.tx_count)
        .await
        .wrap_err_with(|| format!("{} benchmark failed", strategy.mode()))?;
    let elapsed = start.elapsed();
    info!(mode = %strategy.mode(), confirmed = results.len(), ?elapsed, "Run finished");
    Ok((results, elapsed))
}
