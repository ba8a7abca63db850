//! `evmbench receipt-count`.

use evmbench_engine::{ReceiptCountTable, SubmissionMode};
use eyre::Result;
use tokio_util::sync::CancellationToken;

use super::{connect, run_strategy};
use crate::cli::RunArgs;

pub(super) async fn run(args: RunArgs, cancel: CancellationToken) -> Result<()> {
    let config = args.bench_config(SubmissionMode::Async);
    let (ctx, mut account) = connect(&args.env_file, &config).await?;

    let (results, _) = run_strategy(ctx, &mut account, &config, cancel).await?;
    print!("{}", ReceiptCountTable::new(&results));
    Ok(())
}
