//! Metrics for benchmark runs.

use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// Metrics for the `evmbench` engine.
/// Conventions:
/// - Durations are recorded in seconds (histograms).
/// - Counters are monotonic event counts.
#[derive(Metrics, Clone)]
#[metrics(scope = "evmbench")]
pub struct BenchMetrics {
    /// Time spent in the submission call.
    #[metric(describe = "Time spent in the submission call, in seconds")]
    pub send_duration: Histogram,

    /// Time from submission acknowledgement to receipt.
    #[metric(describe = "Time from submission acknowledgement to receipt, in seconds")]
    pub confirm_duration: Histogram,

    /// Time from the start of submission to receipt.
    #[metric(describe = "Time from the start of submission to receipt, in seconds")]
    pub total_duration: Histogram,

    /// Count of receipt lookups issued while polling.
    #[metric(describe = "Receipt lookups issued while polling")]
    pub receipt_polls: Counter,

    /// Count of confirmed transactions.
    #[metric(describe = "Transactions confirmed")]
    pub confirmed: Counter,

    /// Count of iterations skipped because the submit-and-wait call failed.
    #[metric(describe = "Iterations skipped because the submit-and-wait call failed")]
    pub skipped_submissions: Counter,
}
