//! `evmbench resp-time`.

use evmbench_engine::{ProbeTable, probe_block_number};
use eyre::Result;

use super::open_rpc;
use crate::cli::RespTimeArgs;

pub(super) async fn run(args: RespTimeArgs) -> Result<()> {
    let (_, rpc) = open_rpc(&args.env_file)?;
    let latencies = probe_block_number(&*rpc, args.count, args.interval()).await;
    print!("{}", ProbeTable::new(&latencies, args.count));
    Ok(())
}
