//! Per-transaction latency records.

use std::{fmt, time::Duration};

use alloy_primitives::B256;
use serde::{Serialize, ser::SerializeStruct};

use crate::stats::micros;

/// Timing of one confirmed transaction.
///
/// Fields are private so the duration relationships set up by the constructors always hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxResult {
    index: usize,
    tx_hash: B256,
    send: Duration,
    confirm: Duration,
    total: Duration,
    poll_attempts: u32,
}

impl TxResult {
    /// Record for a fire-and-poll transaction. `total` is `send + confirm`.
    pub fn polled(
        index: usize,
        tx_hash: B256,
        send: Duration,
        confirm: Duration,
        poll_attempts: u32,
    ) -> Self {
        Self { index, tx_hash, send, confirm, total: send + confirm, poll_attempts }
    }

    /// Record for a submit-and-wait transaction. The whole latency is in `send`.
    pub const fn blocking(index: usize, tx_hash: B256, send: Duration) -> Self {
        Self { index, tx_hash, send, confirm: Duration::ZERO, total: send, poll_attempts: 0 }
    }

    /// 1-based iteration index.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Transaction hash.
    pub const fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    /// Time spent in the submission call.
    pub const fn send(&self) -> Duration {
        self.send
    }

    /// Time from submission acknowledgement to receipt.
    pub const fn confirm(&self) -> Duration {
        self.confirm
    }

    /// End-to-end latency.
    pub const fn total(&self) -> Duration {
        self.total
    }

    /// Receipt lookups issued. Zero for blocking records.
    pub const fn poll_attempts(&self) -> u32 {
        self.poll_attempts
    }
}

impl fmt::Display for TxResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tx {} ({}) send: {:?}, confirm: {:?}, total: {:?}, polls: {}",
            self.index, self.tx_hash, self.send, self.confirm, self.total, self.poll_attempts
        )
    }
}

/// Durations are written as microseconds, which the csv writer can handle.
impl Serialize for TxResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        let mut state = serializer.serialize_struct("TxResult", 6)?;
        state.serialize_field("index", &self.index)?;
        state.serialize_field("tx_hash", &self.tx_hash)?;
        state.serialize_field("send_us", &micros(self.send))?;
        state.serialize_field("confirm_us", &micros(self.confirm))?;
        state.serialize_field("total_us", &micros(self.total))?;
        state.serialize_field("poll_attempts", &self.poll_attempts)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn polled_total_is_send_plus_confirm() {
        let record = TxResult::polled(
            1,
            B256::ZERO,
            Duration::from_micros(1_500),
            Duration::from_micros(2_250),
            4,
        );
        assert_eq!(record.total(), Duration::from_micros(3_750));
        assert_eq!(record.poll_attempts(), 4);
    }

    #[test]
    fn blocking_record_has_no_confirm_phase() {
        let record = TxResult::blocking(2, B256::ZERO, Duration::from_millis(120));
        assert_eq!(record.confirm(), Duration::ZERO);
        assert_eq!(record.total(), record.send());
        assert_eq!(record.poll_attempts(), 0);
    }

    #[test]
    fn serializes_micros() {
        let record =
            TxResult::polled(3, B256::ZERO, Duration::from_millis(2), Duration::from_millis(5), 6);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "index": 3,
                "tx_hash": B256::ZERO,
                "send_us": 2000,
                "confirm_us": 5000,
                "total_us": 7000,
                "poll_attempts": 6,
            })
        );
    }
}
