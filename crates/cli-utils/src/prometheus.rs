//! Prometheus metrics exporter.

use std::{
    net::{IpAddr, SocketAddr},
    thread::{self, sleep},
    time::Duration,
};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use metrics_process::Collector;
use tracing::info;

/// Default interval between process metric collections.
const DEFAULT_COLLECT_INTERVAL: Duration = Duration::from_secs(5);

/// Installs the Prometheus recorder and its HTTP listener.
#[derive(Debug, Clone, Copy)]
pub struct PrometheusServer;

impl PrometheusServer {
    /// Serves metrics on `addr:port` and starts collecting process metrics every `interval`
    /// (5 seconds when `None`).
    pub fn init(addr: IpAddr, port: u16, interval: Option<Duration>) -> Result<(), BuildError> {
        let prometheus_addr = SocketAddr::from((addr, port));
        PrometheusBuilder::new().with_http_listener(prometheus_addr).install()?;

        let collector = Collector::default();
        collector.describe();

        let interval = interval.unwrap_or(DEFAULT_COLLECT_INTERVAL);
        thread::spawn(move || {
            loop {
                collector.collect();
                sleep(interval);
            }
        });

        info!(target: "prometheus", "Serving metrics at: http://{prometheus_addr}");
        Ok(())
    }
}
