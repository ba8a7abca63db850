#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod account;
pub use account::AccountState;

mod builder;
pub use builder::{
    FeeParams, FeeStrategy, SignedTransfer, TRANSFER_GAS_LIMIT, TRANSFER_VALUE_WEI,
    TransferBuilder,
};

mod config;
pub use config::{
    BenchConfig, DEFAULT_FEE_CAP_MULTIPLIER, DEFAULT_SYNC_COOLDOWN, DEFAULT_THROTTLE, EnvConfig,
    PRIVATE_KEYS_VAR, RPC_ENDPOINT_VAR, SubmissionMode, parse_private_keys,
};

mod context;
pub use context::BenchContext;

mod error;
pub use error::{BenchError, ConfigError, PollError, ReportError, RpcError};

mod metrics;
pub use metrics::BenchMetrics;

mod poller;
pub use poller::{DEFAULT_POLL_INTERVAL, PollOutcome, PollPolicy, ReceiptPoller};

mod probe;
pub use probe::probe_block_number;

mod receipt;
pub use receipt::ReceiptInfo;

mod record;
pub use record::TxResult;

mod report;
pub use report::{
    ComparisonTable, NO_RESULTS, ProbeTable, ReceiptCountTable, ResultsTable, RunReport,
    short_hash, write_csv,
};

mod rpc;
pub use rpc::{
    AlloyRpc, BenchRpc, REALTIME_CHAIN_ID, REALTIME_SEND_METHOD, SYNC_SEND_METHOD,
    sync_send_method,
};

mod stats;
pub use stats::{LatencyStats, Summary, micros};

mod strategy;
pub use strategy::{BlockingStrategy, PollingStrategy, SubmissionStrategy};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
