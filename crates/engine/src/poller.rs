//! Receipt polling for fire-and-poll submissions.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use alloy_primitives::B256;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{BenchMetrics, BenchRpc, PollError, ReceiptInfo, RpcError};

/// Default delay between receipt lookups.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Bounds and pacing of receipt polling.
///
/// With the defaults, polling only stops on a receipt or cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between consecutive lookups.
    pub interval: Duration,
    /// Maximum number of lookups per transaction.
    pub max_attempts: Option<u32>,
    /// Maximum time spent polling per transaction.
    pub max_duration: Option<Duration>,
    /// Consecutive connection-level failures after which polling aborts. `None` never aborts.
    pub max_transport_errors: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            max_duration: None,
            max_transport_errors: None,
        }
    }
}

impl PollPolicy {
    /// Sets the delay between lookups.
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Caps the number of lookups.
    pub const fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Caps the time spent polling.
    pub const fn with_max_duration(mut self, max_duration: Option<Duration>) -> Self {
        self.max_duration = max_duration;
        self
    }

    /// Sets the tolerated connection failure streak. `None` retries forever.
    pub const fn with_max_transport_errors(mut self, max: Option<u32>) -> Self {
        self.max_transport_errors = max;
        self
    }
}

/// A receipt and what it took to get it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// The decoded receipt.
    pub receipt: ReceiptInfo,
    /// Lookups issued, including the successful one.
    pub attempts: u32,
    /// Time from the first lookup to the receipt.
    pub elapsed: Duration,
}

/// Polls `eth_getTransactionReceipt` until a receipt appears.
#[derive(Debug)]
pub struct ReceiptPoller<R> {
    rpc: Arc<R>,
    policy: PollPolicy,
    cancel: CancellationToken,
    metrics: BenchMetrics,
}

impl<R: BenchRpc> ReceiptPoller<R> {
    /// Creates a poller.
    pub fn new(rpc: Arc<R>, policy: PollPolicy, cancel: CancellationToken) -> Self {
        Self { rpc, policy, cancel, metrics: BenchMetrics::default() }
    }

    /// Returns the active policy.
    pub const fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Polls until the receipt for `tx_hash` is available.
    ///
    /// Empty results, node errors and undecodable responses are retried. Connection-level
    /// failures are retried too, unless `max_transport_errors` of them occur in a row.
    pub async fn wait_for(&self, tx_hash: B256) -> Result<PollOutcome, PollError> {
        let start = Instant::now();
        let mut attempts = 0u32;
        let mut transport_streak = 0u32;

        loop {
            attempts += 1;
            self.metrics.receipt_polls.increment(1);

            let response = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(PollError::Cancelled),
                response = self.rpc.transaction_receipt(tx_hash) => response,
            };

            match response {
                Ok(Some(receipt)) => {
                    let elapsed = start.elapsed();
                    trace!(%tx_hash, attempts, ?elapsed, "Receipt found");
                    return Ok(PollOutcome { receipt, attempts, elapsed });
                }
                Ok(None) => transport_streak = 0,
                Err(err) if err.is_connection_level() => {
                    transport_streak += 1;
                    warn!(
                        %tx_hash,
                        attempts,
                        streak = transport_streak,
                        error = %err,
                        "Receipt lookup failed"
                    );
                    if let Some(limit) = self.policy.max_transport_errors {
                        if transport_streak >= limit {
                            return Err(PollError::ConnectionLost {
                                consecutive: transport_streak,
                                last: err,
                            });
                        }
                    }
                }
                Err(err) => {
                    transport_streak = 0;
                    log_retryable(tx_hash, attempts, &err);
                }
            }

            if let Some(max) = self.policy.max_attempts {
                if attempts >= max {
                    return Err(PollError::AttemptsExhausted { attempts });
                }
            }
            if let Some(max) = self.policy.max_duration {
                let elapsed = start.elapsed();
                if elapsed >= max {
                    return Err(PollError::DeadlineExceeded { elapsed });
                }
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(PollError::Cancelled),
                _ = tokio::time::sleep(self.policy.interval) => {}
            }
        }
    }
}

fn log_retryable(tx_hash: B256, attempts: u32, err: &RpcError) {
    debug!(%tx_hash, attempts, error = %err, "Receipt lookup returned an error, retrying");
}
