//! In-memory [`BenchRpc`] for tests.

use std::collections::{HashMap, HashSet, VecDeque};

use alloy_primitives::{Address, B256, Bytes, keccak256};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use crate::{BenchRpc, ReceiptInfo, RpcError};

/// First anvil development key.
pub const TEST_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Returns a signer for [`TEST_PRIVATE_KEY`].
pub fn test_signer() -> PrivateKeySigner {
    TEST_PRIVATE_KEY.parse().expect("valid test key")
}

fn injected() -> RpcError {
    RpcError::Rpc { code: -32000, message: "injected failure".to_string() }
}

#[derive(Debug, Default)]
struct State {
    receipt_polls: HashMap<B256, u32>,
    receipt_errors: VecDeque<RpcError>,
    receipt_calls: usize,
    sent: Vec<Bytes>,
    sync_methods: Vec<&'static str>,
    sync_calls: usize,
    gas_price_calls: usize,
    block_number_calls: usize,
}

/// Scriptable node double.
///
/// Successful submissions return `keccak256(raw)`, which is the real transaction hash. Receipts
/// are keyed by that hash.
#[derive(Debug)]
pub struct MockRpc {
    chain_id: u64,
    nonce: u64,
    gas_price: u128,
    priority_fee: u128,
    block_number: u64,
    receipt_on_poll: Option<u32>,
    fail_chain_id: bool,
    fail_nonce: bool,
    fail_gas_price: bool,
    fail_priority_fee: bool,
    fail_send: bool,
    failing_sync_calls: HashSet<usize>,
    failing_block_number_calls: HashSet<usize>,
    undecodable_sync_result: bool,
    state: Mutex<State>,
}

impl MockRpc {
    /// A node on `chain_id` that confirms every transaction on the first poll.
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            nonce: 0,
            gas_price: 1_000_000_000,
            priority_fee: 1_000_000,
            block_number: 1,
            receipt_on_poll: Some(1),
            fail_chain_id: false,
            fail_nonce: false,
            fail_gas_price: false,
            fail_priority_fee: false,
            fail_send: false,
            failing_sync_calls: HashSet::new(),
            failing_block_number_calls: HashSet::new(),
            undecodable_sync_result: false,
            state: Mutex::new(State::default()),
        }
    }

    /// Returns the chain id this node reports.
    pub const fn configured_chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Sets the pending nonce.
    pub const fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Sets the suggested gas price.
    pub const fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Sets the suggested priority fee.
    pub const fn with_priority_fee(mut self, priority_fee: u128) -> Self {
        self.priority_fee = priority_fee;
        self
    }

    /// Returns the receipt on the `poll`-th lookup of each transaction (1-based).
    ///
    /// Lookups answered from the error queue are not counted.
    pub const fn with_receipt_on_poll(mut self, poll: u32) -> Self {
        self.receipt_on_poll = Some(poll);
        self
    }

    /// Never returns a receipt.
    pub const fn never_confirm(mut self) -> Self {
        self.receipt_on_poll = None;
        self
    }

    /// Answers the next receipt lookups with these errors, in order.
    pub fn with_receipt_errors(self, errors: Vec<RpcError>) -> Self {
        self.state.lock().receipt_errors = errors.into();
        self
    }

    /// Fails `eth_chainId`.
    pub const fn with_failing_chain_id(mut self) -> Self {
        self.fail_chain_id = true;
        self
    }

    /// Fails `eth_getTransactionCount`.
    pub const fn with_failing_nonce(mut self) -> Self {
        self.fail_nonce = true;
        self
    }

    /// Fails `eth_gasPrice`.
    pub const fn with_failing_gas_price(mut self) -> Self {
        self.fail_gas_price = true;
        self
    }

    /// Fails `eth_maxPriorityFeePerGas`.
    pub const fn with_failing_priority_fee(mut self) -> Self {
        self.fail_priority_fee = true;
        self
    }

    /// Fails `eth_sendRawTransaction`.
    pub const fn with_failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    /// Fails the given submit-and-wait calls (1-based call numbers).
    pub fn with_failing_sync_calls(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.failing_sync_calls = calls.into_iter().collect();
        self
    }

    /// Fails the given `eth_blockNumber` calls (1-based call numbers).
    pub fn with_failing_block_number_calls(
        mut self,
        calls: impl IntoIterator<Item = usize>,
    ) -> Self {
        self.failing_block_number_calls = calls.into_iter().collect();
        self
    }

    /// Makes submit-and-wait calls return a result that is not a receipt.
    pub const fn with_undecodable_sync_result(mut self) -> Self {
        self.undecodable_sync_result = true;
        self
    }

    /// Raw transactions received by either submit method, in order.
    pub fn sent_transactions(&self) -> Vec<Bytes> {
        self.state.lock().sent.clone()
    }

    /// Methods used for submit-and-wait calls, in order.
    pub fn sync_methods(&self) -> Vec<&'static str> {
        self.state.lock().sync_methods.clone()
    }

    /// Number of `eth_gasPrice` calls.
    pub fn gas_price_calls(&self) -> usize {
        self.state.lock().gas_price_calls
    }

    /// Number of receipt lookups.
    pub fn receipt_calls(&self) -> usize {
        self.state.lock().receipt_calls
    }

    /// Number of `eth_blockNumber` calls.
    pub fn block_number_calls(&self) -> usize {
        self.state.lock().block_number_calls
    }
}

#[async_trait]
impl BenchRpc for MockRpc {
    async fn chain_id(&self) -> Result<u64, RpcError> {
        if self.fail_chain_id {
            return Err(RpcError::Transport("connection refused".to_string()));
        }
        Ok(self.chain_id)
    }

    async fn pending_nonce(&self, _address: Address) -> Result<u64, RpcError> {
        if self.fail_nonce {
            return Err(injected());
        }
        Ok(self.nonce)
    }

    async fn gas_price(&self) -> Result<u128, RpcError> {
        self.state.lock().gas_price_calls += 1;
        if self.fail_gas_price {
            return Err(injected());
        }
        Ok(self.gas_price)
    }

    async fn max_priority_fee(&self) -> Result<u128, RpcError> {
        if self.fail_priority_fee {
            return Err(injected());
        }
        Ok(self.priority_fee)
    }

    async fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, RpcError> {
        self.state.lock().sent.push(raw.clone());
        if self.fail_send {
            return Err(RpcError::Rpc { code: -32000, message: "nonce too low".to_string() });
        }
        Ok(keccak256(raw))
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<ReceiptInfo>, RpcError> {
        let mut state = self.state.lock();
        state.receipt_calls += 1;
        if let Some(err) = state.receipt_errors.pop_front() {
            return Err(err);
        }

        let polls = state.receipt_polls.entry(tx_hash).or_default();
        *polls += 1;
        match self.receipt_on_poll {
            Some(target) if *polls >= target => Ok(Some(ReceiptInfo {
                transaction_hash: tx_hash,
                block_number: Some(self.block_number),
                status: Some(1),
            })),
            _ => Ok(None),
        }
    }

    async fn send_raw_transaction_sync(
        &self,
        method: &'static str,
        raw: &Bytes,
    ) -> Result<serde_json::Value, RpcError> {
        let mut state = self.state.lock();
        state.sent.push(raw.clone());
        state.sync_methods.push(method);
        state.sync_calls += 1;

        if self.failing_sync_calls.contains(&state.sync_calls) {
            return Err(RpcError::Rpc { code: -32002, message: "request timed out".to_string() });
        }
        if self.undecodable_sync_result {
            return Ok(json!("0xdeadbeef"));
        }
        Ok(json!({
            "transactionHash": keccak256(raw),
            "blockNumber": format!("{:#x}", self.block_number),
            "status": "0x1",
        }))
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        let mut state = self.state.lock();
        state.block_number_calls += 1;
        if self.failing_block_number_calls.contains(&state.block_number_calls) {
            return Err(RpcError::Transport("connection reset".to_string()));
        }
        Ok(self.block_number)
    }
}
