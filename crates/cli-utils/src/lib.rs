#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod args;
pub use args::{LogArgs, MetricsArgs};

mod logging;
pub use logging::{
    FileLogConfig, LogConfig, LogFormat, LogRotation, StdoutLogConfig, verbosity_to_level_filter,
};

mod prometheus;
pub use prometheus::PrometheusServer;

mod runtime;
pub use runtime::cancel_on_ctrl_c;

mod styles;
pub use styles::CliStyles;

mod tracing;
pub use tracing::{LOG_FILE_NAME, init_test_tracing};
