//! Global CLI arguments.

use std::{net::IpAddr, path::PathBuf};

use clap::{ArgAction, Parser};

use crate::{
    FileLogConfig, LogConfig, LogFormat, LogRotation, StdoutLogConfig, verbosity_to_level_filter,
};

/// Log-related CLI arguments.
///
/// Verbosity levels: 1=ERROR, 2=WARN, 3=INFO (default), 4=DEBUG, 5=TRACE.
/// Use `-q` to suppress stdout logging entirely.
#[derive(Debug, Clone, Parser)]
pub struct LogArgs {
    /// Increase logging verbosity (1=ERROR, 2=WARN, 3=INFO, 4=DEBUG, 5=TRACE).
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        default_value = "3",
        env = "EVMBENCH_LOG_LEVEL",
        global = true
    )]
    pub level: u8,

    /// Suppress stdout logging.
    #[arg(long = "quiet", short = 'q', global = true)]
    pub stdout_quiet: bool,

    /// Stdout log format.
    #[arg(long = "log-format", default_value = "full", env = "EVMBENCH_LOG_FORMAT", global = true)]
    pub stdout_format: LogFormat,

    /// Directory for file logging (enables file logging when set).
    #[arg(long = "log-dir", env = "EVMBENCH_LOG_DIR", global = true)]
    pub file_directory: Option<PathBuf>,

    /// File log format.
    #[arg(long = "log-file-format", default_value = "json", global = true)]
    pub file_format: LogFormat,

    /// File log rotation strategy.
    #[arg(long = "log-rotation", default_value = "never", global = true)]
    pub file_rotation: LogRotation,
}

impl Default for LogArgs {
    fn default() -> Self {
        Self {
            level: 3,
            stdout_quiet: false,
            stdout_format: LogFormat::Full,
            file_directory: None,
            file_format: LogFormat::Json,
            file_rotation: LogRotation::Never,
        }
    }
}

impl From<LogArgs> for LogConfig {
    fn from(args: LogArgs) -> Self {
        let stdout_logs = if args.stdout_quiet {
            None
        } else {
            Some(StdoutLogConfig { format: args.stdout_format })
        };

        let file_logs = args.file_directory.map(|dir| FileLogConfig {
            directory_path: dir,
            format: args.file_format,
            rotation: args.file_rotation,
        });

        Self { global_level: verbosity_to_level_filter(args.level), stdout_logs, file_logs }
    }
}

/// Prometheus exporter arguments.
#[derive(Debug, Clone, Parser)]
#[command(next_help_heading = "Metrics")]
pub struct MetricsArgs {
    /// Serve Prometheus metrics on this port. Disabled when unset.
    #[arg(long = "metrics-port", env = "EVMBENCH_METRICS_PORT", global = true)]
    pub port: Option<u16>,

    /// Metrics server bind address.
    #[arg(
        long = "metrics-addr",
        env = "EVMBENCH_METRICS_ADDR",
        default_value = "127.0.0.1",
        global = true
    )]
    pub addr: IpAddr,
}

impl Default for MetricsArgs {
    fn default() -> Self {
        Self { port: None, addr: IpAddr::from([127, 0, 0, 1]) }
    }
}
