//! Sending account state.

use alloy_primitives::Address;

/// The sending account and the nonce its next transaction will use.
///
/// Owned by a single benchmark run; the nonce only moves forward, one step per attempted
/// iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountState {
    address: Address,
    nonce: u64,
}

impl AccountState {
    /// Creates the state for `address` starting at `nonce`.
    pub const fn new(address: Address, nonce: u64) -> Self {
        Self { address, nonce }
    }

    /// Returns the account address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Returns the nonce for the next transaction.
    pub const fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Moves to the next nonce, returning the one that was consumed.
    pub const fn advance(&mut self) -> u64 {
        let used = self.nonce;
        self.nonce += 1;
        used
    }
}
