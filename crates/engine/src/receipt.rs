//! Minimal view of a transaction receipt.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// The receipt fields the benchmark reads.
///
/// Decoded directly from the JSON object returned by `eth_getTransactionReceipt` or a
/// submit-and-wait method; every other field is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptInfo {
    /// Hash of the confirmed transaction.
    pub transaction_hash: B256,
    /// Block that included the transaction, if the node reports one.
    #[serde(default, with = "alloy_serde::quantity::opt", skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Post-Byzantium status code (`1` success, `0` revert).
    #[serde(default, with = "alloy_serde::quantity::opt", skip_serializing_if = "Option::is_none")]
    pub status: Option<u64>,
}

impl ReceiptInfo {
    /// Returns whether execution succeeded, when the node reported a status.
    pub fn succeeded(&self) -> Option<bool> {
        self.status.map(|status| status == 1)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::b256;
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_node_receipt() {
        let value = json!({
            "transactionHash": "0x2be2e6f8b01b03b87ae9f0ebca8bbd420f174bef0fbcc18c7802c5378b78f548",
            "blockNumber": "0x1b4",
            "status": "0x1",
            "gasUsed": "0x5208",
            "logs": []
        });
        let receipt: ReceiptInfo = serde_json::from_value(value).unwrap();
        assert_eq!(
            receipt.transaction_hash,
            b256!("2be2e6f8b01b03b87ae9f0ebca8bbd420f174bef0fbcc18c7802c5378b78f548")
        );
        assert_eq!(receipt.block_number, Some(436));
        assert_eq!(receipt.succeeded(), Some(true));
    }

    #[test]
    fn pending_fields_may_be_missing() {
        let value = json!({
            "transactionHash": "0x2be2e6f8b01b03b87ae9f0ebca8bbd420f174bef0fbcc18c7802c5378b78f548"
        });
        let receipt: ReceiptInfo = serde_json::from_value(value).unwrap();
        assert_eq!(receipt.block_number, None);
        assert_eq!(receipt.succeeded(), None);
    }

    #[test]
    fn rejects_non_receipt_values() {
        assert!(serde_json::from_value::<ReceiptInfo>(json!("0xdeadbeef")).is_err());
    }
}
