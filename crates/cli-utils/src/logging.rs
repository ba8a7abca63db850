//! Logging configuration types.

use std::path::PathBuf;

use clap::ValueEnum;
use tracing::level_filters::LevelFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Timestamp, level, target and spans.
    #[default]
    Full,
    /// Level and message only.
    Compact,
    /// One JSON object per event.
    Json,
    /// Multi-line, human oriented.
    Pretty,
}

/// Rotation of file logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogRotation {
    /// Rotate every minute.
    Minutely,
    /// Rotate every hour.
    Hourly,
    /// Rotate every day.
    Daily,
    /// Single file.
    #[default]
    Never,
}

/// Configuration for file logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLogConfig {
    /// Directory the log files are written to.
    pub directory_path: PathBuf,
    /// Format of file logs.
    pub format: LogFormat,
    /// Rotation of the log files.
    pub rotation: LogRotation,
}

/// Configuration for stdout logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdoutLogConfig {
    /// Format of stdout logs.
    pub format: LogFormat,
}

/// Global logging configuration.
///
/// Default is INFO to stdout in full format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Global verbosity level.
    pub global_level: LevelFilter,
    /// Stdout logging, `None` when quiet.
    pub stdout_logs: Option<StdoutLogConfig>,
    /// File logging, `None` when disabled.
    pub file_logs: Option<FileLogConfig>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global_level: LevelFilter::INFO,
            stdout_logs: Some(StdoutLogConfig { format: LogFormat::Full }),
            file_logs: None,
        }
    }
}

/// Maps a `-v` count to a level filter: 1=ERROR, 2=WARN, 3=INFO, 4=DEBUG, 5+=TRACE.
///
/// Zero disables logging.
pub const fn verbosity_to_level_filter(level: u8) -> LevelFilter {
    match level {
        0 => LevelFilter::OFF,
        1 => LevelFilter::ERROR,
        2 => LevelFilter::WARN,
        3 => LevelFilter::INFO,
        4 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, LevelFilter::OFF)]
    #[case(1, LevelFilter::ERROR)]
    #[case(2, LevelFilter::WARN)]
    #[case(3, LevelFilter::INFO)]
    #[case(4, LevelFilter::DEBUG)]
    #[case(5, LevelFilter::TRACE)]
    #[case(9, LevelFilter::TRACE)]
    fn verbosity_mapping(#[case] level: u8, #[case] expected: LevelFilter) {
        assert_eq!(verbosity_to_level_filter(level), expected);
    }

    #[test]
    fn default_config_logs_to_stdout() {
        let config = LogConfig::default();
        assert_eq!(config.global_level, LevelFilter::INFO);
        assert_eq!(config.stdout_logs, Some(StdoutLogConfig { format: LogFormat::Full }));
        assert!(config.file_logs.is_none());
    }
}
