#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod cli;
mod commands;

use clap::Parser;
use evmbench_cli_utils::{LogConfig, PrometheusServer, cancel_on_ctrl_c};
use eyre::{Result, WrapErr};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    LogConfig::from(cli.logging).init_tracing_subscriber()?;

    if let Some(port) = cli.metrics.port {
        PrometheusServer::init(cli.metrics.addr, port, None)
            .wrap_err("Failed to start Prometheus server")?;
    }

    cli.command.run(cancel_on_ctrl_c()).await
}
