//! `evmbench bench`.

use evmbench_engine::{ProbeTable, ResultsTable, RunReport, probe_block_number, write_csv};
use eyre::Result;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{connect, run_strategy};
use crate::cli::BenchArgs;

pub(super) async fn run(args: BenchArgs, cancel: CancellationToken) -> Result<()> {
    let config = args.run.bench_config(args.mode);
    let (ctx, mut account) = connect(&args.run.env_file, &config).await?;

    let probe = if args.probe_count > 0 {
        info!(count = args.probe_count, interval = %args.probe_interval, "Probing eth_blockNumber");
        let latencies =
            probe_block_number(&**ctx.rpc(), args.probe_count, args.probe_interval.into())
                .await;
        Some(latencies)
    } else {
        None
    };

    let (results, elapsed) = run_strategy(ctx, &mut account, &config, cancel).await?;

    if let Some(path) = &args.csv {
        if let Err(err) = write_csv(path, &results) {
            warn!(path = %path.display(), error = %err, "Failed to write CSV results");
        }
    }

    if args.json {
        let mut report = RunReport::new(config.mode, &results, elapsed);
        if let Some(latencies) = &probe {
            report = report.with_probe(latencies);
        }
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(latencies) = &probe {
        print!("{}", ProbeTable::new(latencies, args.probe_count));
        println!();
    }
    print!("{}", ResultsTable::new(config.mode, &results, elapsed));
    Ok(())
}
