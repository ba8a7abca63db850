//! Benchmark configuration.
//!
//! Credentials and the endpoint come from a `.env` file ([`EnvConfig`]); run parameters
//! ([`BenchConfig`]) come from the command line. Both are plain values handed to the strategy
//! constructors.

use std::{collections::HashMap, fmt, fs, path::Path, str::FromStr, time::Duration};

use alloy_signer_local::PrivateKeySigner;
use serde::Serialize;
use url::Url;

use crate::{ConfigError, PollPolicy};

/// Env variable holding the node's HTTP JSON-RPC endpoint.
pub const RPC_ENDPOINT_VAR: &str = "RPC_ENDPOINT";

/// Env variable holding comma-separated hex private keys.
pub const PRIVATE_KEYS_VAR: &str = "PRIVATE_KEYS";

/// Delay before building each transaction in async mode.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(10);

/// Pause after a failed submit-and-wait call in sync mode.
pub const DEFAULT_SYNC_COOLDOWN: Duration = Duration::from_secs(2);

/// Factor applied to the suggested gas price to form the sync-mode fee cap.
pub const DEFAULT_FEE_CAP_MULTIPLIER: u128 = 2;

/// How transactions are submitted and confirmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionMode {
    /// Submit with `eth_sendRawTransaction`, then poll for the receipt.
    #[default]
    Async,
    /// Submit with a method that blocks until the receipt is available.
    Sync,
}

impl SubmissionMode {
    /// Returns the lowercase selector for this mode.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Async => "async",
            Self::Sync => "sync",
        }
    }
}

impl fmt::Display for SubmissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "async" => Ok(Self::Async),
            "sync" => Ok(Self::Sync),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

/// Endpoint and signing keys loaded from the environment.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// HTTP JSON-RPC endpoint of the node.
    pub rpc_url: Url,
    /// Signers parsed from `PRIVATE_KEYS`, in file order. Never empty.
    pub signers: Vec<PrivateKeySigner>,
}

impl EnvConfig {
    /// Loads the configuration from an env file.
    ///
    /// Variables already present in the process environment take precedence over the file, so
    /// `RPC_ENDPOINT=... evmbench bench` overrides the file value. The `PRIVATE_KEYS` line is
    /// read verbatim, so an unquoted list with spaces after the commas is accepted.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let env_file_err =
            |source: dotenvy::Error| ConfigError::EnvFile { path: path.to_path_buf(), source };
        let contents =
            fs::read_to_string(path).map_err(|err| env_file_err(dotenvy::Error::Io(err)))?;

        let mut file_vars = HashMap::new();
        let mut remaining = String::with_capacity(contents.len());
        for line in contents.lines() {
            match private_keys_line(line) {
                Some(keys) => {
                    file_vars.insert(PRIVATE_KEYS_VAR.to_string(), keys.to_string());
                }
                None => {
                    remaining.push_str(line);
                    remaining.push('\n');
                }
            }
        }

        for item in dotenvy::from_read_iter(remaining.as_bytes()) {
            let (key, value) = item.map_err(env_file_err)?;
            file_vars.insert(key, value);
        }

        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file_vars.get(key).cloned()))
    }

    /// Builds the configuration from a variable lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let endpoint = lookup(RPC_ENDPOINT_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingVar(RPC_ENDPOINT_VAR))?;
        let rpc_url = endpoint.parse::<Url>().map_err(|err| ConfigError::InvalidEndpoint {
            url: endpoint.clone(),
            reason: err.to_string(),
        })?;

        let keys = lookup(PRIVATE_KEYS_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingVar(PRIVATE_KEYS_VAR))?;
        let signers = parse_private_keys(&keys)?;

        Ok(Self { rpc_url, signers })
    }

    /// Returns the signer used by the benchmark (the first configured key).
    pub fn primary_signer(&self) -> &PrivateKeySigner {
        &self.signers[0]
    }
}

/// Returns the value of a `PRIVATE_KEYS=` line with surrounding quotes removed.
fn private_keys_line(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let line = line.strip_prefix("export ").map_or(line, str::trim_start);
    let value = line.strip_prefix(PRIVATE_KEYS_VAR)?.trim_start().strip_prefix('=')?.trim();
    let unquoted = ['"', '\'']
        .into_iter()
        .find_map(|quote| value.strip_prefix(quote).and_then(|v| v.strip_suffix(quote)));
    Some(unquoted.unwrap_or(value))
}

/// Parses a comma-separated list of hex private keys, with or without `0x` prefixes.
///
/// Whitespace around entries is trimmed and empty entries are skipped.
pub fn parse_private_keys(keys: &str) -> Result<Vec<PrivateKeySigner>, ConfigError> {
    let signers = keys
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .enumerate()
        .map(|(index, key)| {
            key.parse::<PrivateKeySigner>()
                .map_err(|err| ConfigError::InvalidKey { index, reason: err.to_string() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if signers.is_empty() {
        return Err(ConfigError::NoKeys);
    }
    Ok(signers)
}

/// Run parameters of a single benchmark.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Number of transactions to send sequentially.
    pub tx_count: usize,
    /// Submission discipline.
    pub mode: SubmissionMode,
    /// Receipt polling behaviour (async mode only).
    pub poll: PollPolicy,
    /// Delay before each async-mode build.
    pub throttle: Duration,
    /// Pause after a failed sync-mode submission.
    pub sync_cooldown: Duration,
    /// Multiplier applied to the gas price for the sync-mode fee cap.
    pub fee_cap_multiplier: u128,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            tx_count: 10,
            mode: SubmissionMode::Async,
            poll: PollPolicy::default(),
            throttle: DEFAULT_THROTTLE,
            sync_cooldown: DEFAULT_SYNC_COOLDOWN,
            fee_cap_multiplier: DEFAULT_FEE_CAP_MULTIPLIER,
        }
    }
}

impl BenchConfig {
    /// Sets the number of transactions.
    pub const fn with_tx_count(mut self, tx_count: usize) -> Self {
        self.tx_count = tx_count;
        self
    }

    /// Sets the submission mode.
    pub const fn with_mode(mut self, mode: SubmissionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the receipt polling policy.
    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Sets the async-mode inter-submission delay.
    pub const fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Sets the sync-mode failure cooldown.
    pub const fn with_sync_cooldown(mut self, cooldown: Duration) -> Self {
        self.sync_cooldown = cooldown;
        self
    }

    /// Sets the sync-mode fee cap multiplier.
    pub const fn with_fee_cap_multiplier(mut self, multiplier: u128) -> Self {
        self.fee_cap_multiplier = multiplier;
        self
    }

    /// Checks the parameters that can be rejected before touching the network.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tx_count == 0 {
            return Err(ConfigError::ZeroTxCount);
        }
        Ok(())
    }
}
