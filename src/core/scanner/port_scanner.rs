// src/core/scanner/port_scanner.rs

use tracing::{debug, info};

use crate::config::ScanConfig;
use crate::core::engine::{Probe, RunOutcome, ScanContext, TaskRunner};
use crate::core::error::Result;
use crate::core::knowledge_base::service_name;
use crate::core::models::{ModuleKind, OpenPort, ScanEvent, StatusLevel};
use crate::core::scanner::common::extract_host;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time;

const MODULE: ModuleKind = ModuleKind::PortScan;

/// Plain TCP connect check with a per-attempt timeout.
pub struct PortProbe {
    host: String,
    timeout: Duration,
}

impl PortProbe {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        Self { host: host.into(), timeout }
    }
}

impl Probe for PortProbe {
    type Candidate = u16;
    type Output = OpenPort;

    async fn probe(&self, port: u16) -> Option<OpenPort> {
        match time::timeout(self.timeout, TcpStream::connect((self.host.as_str(), port))).await {
            Ok(Ok(_stream)) => Some(OpenPort { port, service: service_name(port).to_string() }),
            Ok(Err(e)) => {
                debug!(host = %self.host, port, error = %e, "Port closed.");
                None
            }
            Err(_) => {
                debug!(host = %self.host, port, "Connect timed out.");
                None
            }
        }
    }
}

pub async fn scan_ports(host: &str, ports: Vec<u16>, timeout: Duration, runner: &TaskRunner) -> RunOutcome<OpenPort> {
    let probe = Arc::new(PortProbe::new(host, timeout));
    runner.run(probe, ports).await
}

/// Runs the port module. Results come back sorted by port for display.
pub async fn run_port_scan(config: &ScanConfig, ctx: &ScanContext) -> Result<Vec<OpenPort>> {
    let host = extract_host(&config.target)?;
    info!(host = %host, ports = config.ports.len(), "Starting port scan.");
    ctx.events.status(MODULE, StatusLevel::Info, format!("Scanning ports for {}", host));

    let runner = TaskRunner::new(MODULE, config.port_threads, ctx)?;
    ctx.events.emit(ScanEvent::ModuleStarted { module: MODULE, total: Some(config.ports.len()) });
    ctx.events.status(
        MODULE,
        StatusLevel::Info,
        format!("Scanning {} ports with {} max tasks", config.ports.len(), runner.concurrency()),
    );

    let mut outcome = scan_ports(&host, config.ports.clone(), config.connect_timeout, &runner).await;
    outcome.results.sort_by_key(|open| open.port);
    ctx.events.emit(ScanEvent::ModuleFinished { module: MODULE, found: outcome.results.len() });
    info!(open = outcome.results.len(), "Port scan finished.");
    Ok(outcome.results)
}
