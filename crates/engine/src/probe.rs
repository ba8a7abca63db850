//! `eth_blockNumber` round-trip probe.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::BenchRpc;

/// Calls `eth_blockNumber` `count` times, `interval` apart, and returns the successful latencies.
///
/// There is no sleep after the last call. Failed calls are logged and left out of the result.
pub async fn probe_block_number<R: BenchRpc + ?Sized>(
    rpc: &R,
    count: usize,
    interval: Duration,
) -> Vec<Duration> {
    let mut latencies = Vec::with_capacity(count);
    for call in 1..=count {
        let start = Instant::now();
        match rpc.block_number().await {
            Ok(block) => {
                let latency = start.elapsed();
                debug!(call, block, ?latency, "Block number probe");
                latencies.push(latency);
            }
            Err(err) => warn!(call, error = %err, "Block number probe failed"),
        }

        if call < count {
            tokio::time::sleep(interval).await;
        }
    }
    latencies
}
