//! Latency statistics over a run's records.

use std::time::Duration;

use serde::Serialize;

use crate::TxResult;

/// Min, max, mean and median of a series, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Smallest value.
    pub min: u64,
    /// Largest value.
    pub max: u64,
    /// Integer-truncated arithmetic mean.
    pub mean: u64,
    /// Median; for an even count, the truncated mean of the two central values.
    pub median: u64,
}

impl Summary {
    /// Summarises `values`. Returns `None` for an empty series.
    pub fn from_values(values: &[u64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_unstable();

        let len = sorted.len();
        let sum: u128 = sorted.iter().map(|v| u128::from(*v)).sum();
        let mean = (sum / len as u128) as u64;
        let median = if len % 2 == 0 {
            let (lo, hi) = (u128::from(sorted[len / 2 - 1]), u128::from(sorted[len / 2]));
            ((lo + hi) / 2) as u64
        } else {
            sorted[len / 2]
        };

        Some(Self { min: sorted[0], max: sorted[len - 1], mean, median })
    }

    /// Summarises durations at microsecond resolution.
    pub fn from_durations(durations: impl IntoIterator<Item = Duration>) -> Option<Self> {
        let values: Vec<u64> = durations.into_iter().map(micros).collect();
        Self::from_values(&values)
    }
}

/// Statistics for the send, confirm and total phases of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatencyStats {
    /// Submission call latency.
    pub send: Summary,
    /// Receipt wait latency.
    pub confirm: Summary,
    /// End-to-end latency.
    pub total: Summary,
}

impl LatencyStats {
    /// Computes statistics over `results`. Returns `None` when there are no results.
    pub fn from_results(results: &[TxResult]) -> Option<Self> {
        Some(Self {
            send: Summary::from_durations(results.iter().map(TxResult::send))?,
            confirm: Summary::from_durations(results.iter().map(TxResult::confirm))?,
            total: Summary::from_durations(results.iter().map(TxResult::total))?,
        })
    }
}

/// Whole microseconds in `duration`, saturating at `u64::MAX`.
pub fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::even(&[10, 20, 30, 40], 25)]
    #[case::odd(&[10, 20, 30], 20)]
    #[case::unsorted(&[40, 10, 30, 20], 25)]
    #[case::single(&[7], 7)]
    #[case::truncated(&[1, 2], 1)]
    fn median(#[case] values: &[u64], #[case] expected: u64) {
        assert_eq!(Summary::from_values(values).unwrap().median, expected);
    }

    #[rstest]
    #[case::truncated(&[1, 2, 3, 4], 2)]
    #[case::exact(&[10, 20, 30], 20)]
    #[case::large(&[u64::MAX, u64::MAX], u64::MAX)]
    fn mean(#[case] values: &[u64], #[case] expected: u64) {
        assert_eq!(Summary::from_values(values).unwrap().mean, expected);
    }

    #[test]
    fn min_and_max() {
        let summary = Summary::from_values(&[5, 3, 9, 1]).unwrap();
        assert_eq!((summary.min, summary.max), (1, 9));
    }

    #[test]
    fn empty_input_has_no_stats() {
        assert!(Summary::from_values(&[]).is_none());
        assert!(LatencyStats::from_results(&[]).is_none());
    }

    #[test]
    fn phases_are_summarised_independently() {
        let results = vec![
            TxResult::polled(1, B256::ZERO, Duration::from_micros(100), Duration::from_micros(900), 2),
            TxResult::polled(2, B256::ZERO, Duration::from_micros(300), Duration::from_micros(700), 3),
        ];
        let stats = LatencyStats::from_results(&results).unwrap();
        assert_eq!(stats.send.median, 200);
        assert_eq!(stats.confirm.median, 800);
        assert_eq!(stats.total.min, 1_000);
        assert_eq!(stats.total.max, 1_000);
    }

    #[test]
    fn sub_microsecond_durations_truncate() {
        assert_eq!(micros(Duration::from_nanos(1_999)), 1);
    }
}
