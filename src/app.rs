// src/app.rs

use crate::config::ScanConfig;
use crate::core::engine::{EventSink, ScanContext};
use crate::core::models::{ScanReport, Severity};
use crate::core::scanner::run_full_scan;
use crate::ui::{self, ConsoleTarget};
use std::fmt;
use std::io;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Idle,
    Scanning,
    Finished,
}

/// Verdict shown at the bottom of the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverallStatus {
    Critical,
    Warning,
    #[default]
    Secure,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallStatus::Critical => write!(f, "CRITICAL"),
            OverallStatus::Warning => write!(f, "WARNING"),
            OverallStatus::Secure => write!(f, "SECURE"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanSummary {
    pub critical_issues: usize,
    pub warning_issues: usize,
    /// Discovered assets: directories, subdomains and open ports.
    pub info_issues: usize,
    pub status: OverallStatus,
}

impl ScanSummary {
    pub fn from_report(report: &ScanReport) -> Self {
        let modules = &report.modules;
        let mut criticals = 0;
        let mut warnings = 0;

        if let Some(Some(tls)) = &modules.ssl_analyzer {
            for vulnerability in &tls.vulnerabilities {
                match vulnerability.severity() {
                    Severity::Critical => criticals += 1,
                    Severity::Warning => warnings += 1,
                    Severity::Info => {}
                }
            }
        }
        if let Some(Some(headers)) = &modules.header_analyzer {
            if headers.missing().next().is_some() {
                warnings += 1;
            }
        }
        if let Some(matches) = &modules.crawler {
            criticals += matches.len();
        }

        let infos = modules.directory_bruteforce.as_ref().map_or(0, Vec::len)
            + modules.subdomain_enumeration.as_ref().map_or(0, Vec::len)
            + modules.port_scan.as_ref().map_or(0, Vec::len);

        let status = if criticals > 0 {
            OverallStatus::Critical
        } else if warnings > 0 {
            OverallStatus::Warning
        } else {
            OverallStatus::Secure
        };

        Self { critical_issues: criticals, warning_issues: warnings, info_issues: infos, status }
    }
}

/// Drives one scan: wires the event channel to the console, installs the
/// Ctrl+C handler and keeps the finished report.
pub struct App {
    pub config: ScanConfig,
    pub state: AppState,
    pub scan_report: Option<ScanReport>,
    pub summary: ScanSummary,
    pub console: ConsoleTarget,
    cancel: CancellationToken,
}

impl App {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            state: AppState::Idle,
            scan_report: None,
            summary: ScanSummary::default(),
            console: ConsoleTarget::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the full scan with live console output. Ctrl+C stops new work;
    /// whatever finished before that is still reported.
    pub async fn run(&mut self) -> &ScanReport {
        self.state = AppState::Scanning;
        let (tx, rx) = mpsc::unbounded_channel();
        let console = tokio::spawn(ui::consume_events(rx, self.console));

        let cancel = self.cancel.clone();
        let interrupt = tokio::spawn(async move {
            if watch_interrupts(tokio::signal::ctrl_c, cancel).await {
                warn!("Second interrupt received, exiting immediately.");
                std::process::exit(130);
            }
        });

        let ctx = ScanContext::new(EventSink::new(tx), self.cancel.clone());
        let report = run_full_scan(&self.config, &ctx).await;
        drop(ctx);
        interrupt.abort();
        if let Err(e) = console.await {
            warn!(error = %e, "Console task ended abnormally.");
        }

        info!(target = %report.target, cancelled = report.cancelled, "Scan complete.");
        self.finish(report)
    }

    fn finish(&mut self, report: ScanReport) -> &ScanReport {
        self.summary = ScanSummary::from_report(&report);
        self.state = AppState::Finished;
        self.scan_report.insert(report)
    }
}

/// Cancels the scan on the first interrupt and resolves `true` on the
/// second, so the caller can force an exit while in-flight work drains.
async fn watch_interrupts<S, F>(mut interrupt: S, cancel: CancellationToken) -> bool
where
    S: FnMut() -> F,
    F: Future<Output = io::Result<()>>,
{
    if interrupt().await.is_err() {
        return false;
    }
    warn!("Interrupt received, cancelling scan. Press Ctrl+C again to exit.");
    cancel.cancel();
    interrupt().await.is_ok()
}
