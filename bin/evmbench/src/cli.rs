//! Command line definition.

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use evmbench_cli_utils::{CliStyles, LogArgs, MetricsArgs};
use evmbench_engine::{BenchConfig, DEFAULT_FEE_CAP_MULTIPLIER, PollPolicy, SubmissionMode};

/// Benchmark EVM transaction submission and receipt latency.
#[derive(Debug, Parser)]
#[command(name = "evmbench", version, about, styles = CliStyles::init())]
pub(crate) struct Cli {
    /// Logging configuration.
    #[command(flatten)]
    pub logging: LogArgs,

    /// Prometheus exporter configuration.
    #[command(flatten)]
    pub metrics: MetricsArgs,

    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Send transactions with one submission mode and report their latency.
    Bench(BenchArgs),
    /// Run the async and the sync mode back to back and compare total latency.
    Compare(RunArgs),
    /// Run the async mode and list how many receipt lookups each transaction needed.
    ReceiptCount(RunArgs),
    /// Measure `eth_blockNumber` round-trip time.
    RespTime(RespTimeArgs),
}

/// Parameters shared by every command that sends transactions.
#[derive(Debug, Clone, Args)]
pub(crate) struct RunArgs {
    /// Number of transactions to send.
    #[arg(
        short = 'n',
        long = "txcount",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub tx_count: u64,

    /// Delay between receipt lookups.
    #[arg(long, default_value = "1ms", env = "POLL_INTERVAL")]
    pub poll_interval: humantime::Duration,

    /// Give up on a receipt after this many lookups.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_poll_attempts: Option<u32>,

    /// Give up on a receipt after this long.
    #[arg(long)]
    pub max_poll_duration: Option<humantime::Duration>,

    /// Abort after this many consecutive connection errors while polling. 0 retries forever.
    #[arg(long, default_value_t = 0)]
    pub max_transport_errors: u32,

    /// Sync-mode fee cap as a multiple of the suggested gas price.
    #[arg(
        long,
        default_value_t = DEFAULT_FEE_CAP_MULTIPLIER as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub fee_cap_multiplier: u64,

    /// Env file holding `RPC_ENDPOINT` and `PRIVATE_KEYS`.
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,
}

impl RunArgs {
    /// Builds the engine configuration for `mode`.
    pub(crate) fn bench_config(&self, mode: SubmissionMode) -> BenchConfig {
        let max_transport_errors =
            (self.max_transport_errors > 0).then_some(self.max_transport_errors);
        let poll = PollPolicy::default()
            .with_interval(self.poll_interval.into())
            .with_max_attempts(self.max_poll_attempts)
            .with_max_duration(self.max_poll_duration.map(Into::into))
            .with_max_transport_errors(max_transport_errors);

        BenchConfig::default()
            .with_tx_count(self.tx_count as usize)
            .with_mode(mode)
            .with_poll(poll)
            .with_fee_cap_multiplier(u128::from(self.fee_cap_multiplier))
    }
}

/// Arguments of `bench`.
#[derive(Debug, Clone, Args)]
pub(crate) struct BenchArgs {
    /// Shared run parameters.
    #[command(flatten)]
    pub run: RunArgs,

    /// Submission mode: `async` polls for receipts, `sync` waits inside the submit call.
    #[arg(long, default_value = "async", value_parser = parse_mode)]
    pub mode: SubmissionMode,

    /// `eth_blockNumber` calls made before the run. 0 skips the probe.
    #[arg(long, default_value_t = 50)]
    pub probe_count: usize,

    /// Delay between probe calls.
    #[arg(long, default_value = "500ms")]
    pub probe_interval: humantime::Duration,

    /// Also write per-transaction results to this CSV file.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Print the run as JSON instead of tables.
    #[arg(long)]
    pub json: bool,
}

/// Arguments of `resp-time`.
#[derive(Debug, Clone, Args)]
pub(crate) struct RespTimeArgs {
    /// Number of calls.
    #[arg(long, default_value_t = 10)]
    pub count: usize,

    /// Delay between calls.
    #[arg(long, default_value = "500ms")]
    pub interval: humantime::Duration,

    /// Env file holding `RPC_ENDPOINT` and `PRIVATE_KEYS`.
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,
}

impl RespTimeArgs {
    /// Returns the probe interval.
    pub(crate) fn interval(&self) -> Duration {
        self.interval.into()
    }
}

fn parse_mode(value: &str) -> Result<SubmissionMode, String> {
    value.parse().map_err(|err: evmbench_engine::ConfigError| err.to_string())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use rstest::rstest;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("evmbench").chain(args.iter().copied()))
    }

    fn bench(args: &[&str]) -> BenchArgs {
        let mut full = vec!["bench"];
        full.extend_from_slice(args);
        match parse(&full).unwrap().command {
            Commands::Bench(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bench_defaults() {
        let args = bench(&[]);
        assert_eq!(args.run.tx_count, 10);
        assert_eq!(args.mode, SubmissionMode::Async);
        assert_eq!(args.run.env_file, PathBuf::from(".env"));
        assert_eq!(args.probe_count, 50);
        assert_eq!(Duration::from(args.probe_interval), Duration::from_millis(500));
        assert!(args.csv.is_none());
        assert!(!args.json);

        let config = args.run.bench_config(args.mode);
        assert_eq!(config.tx_count, 10);
        assert_eq!(config.poll.max_transport_errors, None);
        assert_eq!(config.fee_cap_multiplier, DEFAULT_FEE_CAP_MULTIPLIER);
        assert!(config.poll.max_attempts.is_none());
        assert!(config.poll.max_duration.is_none());
    }

    #[rstest]
    #[case::short(&["-n", "25"], 25)]
    #[case::long(&["--txcount", "3"], 3)]
    fn tx_count_flag(#[case] args: &[&str], #[case] expected: u64) {
        assert_eq!(bench(args).run.tx_count, expected);
    }

    #[test]
    fn zero_tx_count_is_rejected() {
        assert!(parse(&["bench", "-n", "0"]).is_err());
    }

    #[rstest]
    #[case::sync("sync", SubmissionMode::Sync)]
    #[case::async_mode("async", SubmissionMode::Async)]
    fn mode_flag(#[case] mode: &str, #[case] expected: SubmissionMode) {
        assert_eq!(bench(&["--mode", mode]).mode, expected);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = parse(&["bench", "--mode", "batch"]).unwrap_err();
        assert!(err.to_string().contains("must be 'async' or 'sync'"));
    }

    #[test]
    fn poll_flags_build_policy() {
        let args = bench(&[
            "--poll-interval",
            "5ms",
            "--max-poll-attempts",
            "100",
            "--max-poll-duration",
            "2s",
            "--max-transport-errors",
            "0",
        ]);
        let config = args.run.bench_config(SubmissionMode::Async);
        assert_eq!(config.poll.interval, Duration::from_millis(5));
        assert_eq!(config.poll.max_attempts, Some(100));
        assert_eq!(config.poll.max_duration, Some(Duration::from_secs(2)));
        assert_eq!(config.poll.max_transport_errors, None);
    }

    #[test]
    fn transport_error_limit_is_opt_in() {
        let args = bench(&["--max-transport-errors", "30"]);
        let config = args.run.bench_config(SubmissionMode::Async);
        assert_eq!(config.poll.max_transport_errors, Some(30));
    }

    #[rstest]
    #[case::zero_attempts(&["--max-poll-attempts", "0"])]
    #[case::zero_multiplier(&["--fee-cap-multiplier", "0"])]
    fn zero_bounds_are_rejected(#[case] flags: &[&str]) {
        let mut args = vec!["bench"];
        args.extend_from_slice(flags);
        assert!(parse(&args).is_err());
    }

    #[test]
    fn fee_cap_multiplier_flag() {
        let config = bench(&["--fee-cap-multiplier", "3"]).run.bench_config(SubmissionMode::Sync);
        assert_eq!(config.fee_cap_multiplier, 3);
    }

    #[test]
    fn resp_time_defaults() {
        match parse(&["resp-time"]).unwrap().command {
            Commands::RespTime(args) => {
                assert_eq!(args.count, 10);
                assert_eq!(args.interval(), Duration::from_millis(500));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[rstest]
    #[case::compare("compare")]
    #[case::receipt_count("receipt-count")]
    fn run_commands_accept_shared_flags(#[case] command: &str) {
        let cli = parse(&[command, "-n", "4", "--env-file", "bench.env"]).unwrap();
        let run = match cli.command {
            Commands::Compare(run) | Commands::ReceiptCount(run) => run,
            other => panic!("unexpected command {other:?}"),
        };
        assert_eq!(run.tx_count, 4);
        assert_eq!(run.env_file, PathBuf::from("bench.env"));
    }

    #[test]
    fn global_log_flags_after_subcommand() {
        let cli = parse(&["bench", "-q", "--log-format", "json"]).unwrap();
        assert!(cli.logging.stdout_quiet);
    }
}
