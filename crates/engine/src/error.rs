//! Error types for the benchmark engine.

use std::{path::PathBuf, time::Duration};

use alloy_primitives::B256;
use alloy_transport::TransportError;
use thiserror::Error;

/// Errors raised while loading or validating benchmark configuration.
///
/// All of these are reported before any network activity takes place.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The env file could not be read or parsed.
    #[error("failed to load env file {path}: {source}")]
    EnvFile {
        /// Path of the env file.
        path: PathBuf,
        /// Underlying dotenv error.
        #[source]
        source: dotenvy::Error,
    },
    /// A required variable is missing or empty.
    #[error("{0} not set in env file")]
    MissingVar(&'static str),
    /// `PRIVATE_KEYS` contained no usable key.
    #[error("no private keys found in PRIVATE_KEYS")]
    NoKeys,
    /// A private key could not be parsed.
    #[error("invalid private key at position {index}: {reason}")]
    InvalidKey {
        /// Zero-based position in `PRIVATE_KEYS`.
        index: usize,
        /// Parser error message.
        reason: String,
    },
    /// The RPC endpoint is not a valid URL.
    #[error("invalid RPC endpoint {url}: {reason}")]
    InvalidEndpoint {
        /// The rejected endpoint.
        url: String,
        /// Parser error message.
        reason: String,
    },
    /// The submission mode selector is unknown.
    #[error("invalid mode: {0}, must be 'async' or 'sync'")]
    InvalidMode(String),
    /// The transaction count was zero.
    #[error("transaction count must be at least 1")]
    ZeroTxCount,
}

/// A failed call against the node.
///
/// The variants separate connection-level failures from errors the node itself reported, which
/// the receipt poller treats differently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The request never got a response (connection refused, reset, HTTP failure).
    #[error("transport error: {0}")]
    Transport(String),
    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },
    /// The response could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
    /// Any other client-side failure.
    #[error("{0}")]
    Other(String),
}

impl RpcError {
    /// Returns `true` for failures below the JSON-RPC layer.
    pub const fn is_connection_level(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<TransportError> for RpcError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::ErrorResp(payload) => {
                Self::Rpc { code: payload.code, message: payload.message.to_string() }
            }
            TransportError::NullResp => Self::Decode("null response".to_string()),
            TransportError::DeserError { err, .. } => Self::Decode(err.to_string()),
            TransportError::Transport(kind) => Self::Transport(kind.to_string()),
            other => Self::Other(other.to_string()),
        }
    }
}

/// Reasons the receipt poller gave up on a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// The configured attempt limit was reached.
    #[error("no receipt after {attempts} polls")]
    AttemptsExhausted {
        /// Receipt lookups issued.
        attempts: u32,
    },
    /// The configured polling deadline passed.
    #[error("no receipt after {elapsed:?}")]
    DeadlineExceeded {
        /// Time spent polling.
        elapsed: Duration,
    },
    /// Too many consecutive connection-level failures.
    #[error("{consecutive} consecutive connection errors, last: {last}")]
    ConnectionLost {
        /// Length of the failure streak.
        consecutive: u32,
        /// The last error observed.
        last: RpcError,
    },
    /// The cancellation token fired.
    #[error("cancelled")]
    Cancelled,
}

/// Run-aborting errors of a benchmark run.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Chain id lookup failed.
    #[error("failed to get chain id: {0}")]
    ChainId(#[source] RpcError),
    /// Pending nonce lookup failed.
    #[error("failed to get nonce: {0}")]
    Nonce(#[source] RpcError),
    /// Gas price estimation failed.
    #[error("failed to get gas price: {0}")]
    GasPrice(#[source] RpcError),
    /// Priority fee estimation failed.
    #[error("failed to get gas tip cap: {0}")]
    TipCap(#[source] RpcError),
    /// The transaction request was missing a required field.
    #[error("failed to build transaction: {0}")]
    Build(String),
    /// Signing failed.
    #[error("failed to sign transaction: {0}")]
    Signing(#[from] alloy_signer::Error),
    /// `eth_sendRawTransaction` failed.
    #[error("failed to send transaction {index}: {source}")]
    Submit {
        /// 1-based iteration index.
        index: usize,
        /// The RPC failure.
        #[source]
        source: RpcError,
    },
    /// Receipt polling was aborted.
    #[error("receipt polling for tx {index} ({tx_hash}) aborted: {source}")]
    Poll {
        /// 1-based iteration index.
        index: usize,
        /// Hash of the transaction being polled.
        tx_hash: B256,
        /// Why polling stopped.
        #[source]
        source: PollError,
    },
    /// The run was cancelled.
    #[error("benchmark cancelled")]
    Cancelled,
}

/// Failures while writing report files.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The CSV writer failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// Flushing the output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use alloy_transport::TransportErrorKind;

    use super::*;

    #[test]
    fn only_transport_errors_are_connection_level() {
        assert!(RpcError::Transport("connection refused".into()).is_connection_level());
        assert!(!RpcError::Rpc { code: -32000, message: "nonce too low".into() }.is_connection_level());
        assert!(!RpcError::Decode("eof".into()).is_connection_level());
        assert!(!RpcError::Other("boom".into()).is_connection_level());
    }

    #[test]
    fn transport_failures_map_to_transport() {
        let err = TransportErrorKind::custom_str("connection reset by peer");
        let mapped = RpcError::from(err);
        assert!(mapped.is_connection_level());
        assert!(mapped.to_string().contains("connection reset by peer"));
    }

    #[test]
    fn null_response_maps_to_decode() {
        assert!(matches!(RpcError::from(TransportError::NullResp), RpcError::Decode(_)));
    }
}
