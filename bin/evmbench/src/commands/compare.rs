//! `evmbench compare`.

use evmbench_engine::{ComparisonTable, ResultsTable, SubmissionMode};
use eyre::Result;
use tokio_util::sync::CancellationToken;

use super::{connect, run_strategy};
use crate::cli::RunArgs;

pub(super) async fn run(args: RunArgs, cancel: CancellationToken) -> Result<()> {
    let async_config = args.bench_config(SubmissionMode::Async);
    let sync_config = args.bench_config(SubmissionMode::Sync);
    let (ctx, mut account) = connect(&args.env_file, &async_config).await?;

    let (async_results, async_elapsed) =
        run_strategy(ctx.clone(), &mut account, &async_config, cancel.clone()).await?;
    // The sync run continues from the nonce the async run left off at.
    let (sync_results, sync_elapsed) =
        run_strategy(ctx, &mut account, &sync_config, cancel).await?;

    print!("{}", ResultsTable::new(SubmissionMode::Async, &async_results, async_elapsed));
    println!();
    print!("{}", ResultsTable::new(SubmissionMode::Sync, &sync_results, sync_elapsed));
    println!();
    print!("{}", ComparisonTable::new(&async_results, &sync_results));
    Ok(())
}
