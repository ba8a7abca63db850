//! Submission strategies.
//!
//! A strategy owns the submit/confirm loop of a run and produces one [`TxResult`] per confirmed
//! transaction, in submission order.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{AccountState, BenchError, SubmissionMode, TxResult};

mod blocking;
pub use blocking::BlockingStrategy;

mod polling;
pub use polling::PollingStrategy;

/// A way of submitting transactions and waiting for their confirmation.
#[async_trait]
pub trait SubmissionStrategy: Send + Sync {
    /// The mode this strategy implements.
    fn mode(&self) -> SubmissionMode;

    /// Sends `tx_count` sequential self-transfers from `account`.
    ///
    /// The account nonce is advanced once per attempted iteration, whether or not it produced a
    /// record.
    async fn run(
        &self,
        account: &mut AccountState,
        tx_count: usize,
    ) -> Result<Vec<TxResult>, BenchError>;
}

/// Sleeps for `duration` unless `cancel` fires first.
async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> Result<(), BenchError> {
    if duration.is_zero() {
        return if cancel.is_cancelled() { Err(BenchError::Cancelled) } else { Ok(()) };
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(BenchError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
