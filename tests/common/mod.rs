//! Shared helpers for the integration tests.
#![allow(dead_code)]

use insight_rs::config::ScanConfig;
use insight_rs::core::engine::{EventSink, ScanContext};
use insight_rs::core::models::ScanEvent;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A config aimed at a local mock server, with short timeouts and no crawl delay.
pub fn test_config(target: &str) -> ScanConfig {
    ScanConfig {
        threads: 4,
        subdomain_threads: 4,
        port_threads: 8,
        http_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_millis(500),
        politeness_delay: Duration::ZERO,
        ..ScanConfig::for_target(target)
    }
}

/// Writes `lines` to a temporary wordlist. Keep the handle alive for the test.
pub fn wordlist(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create wordlist");
    for line in lines {
        writeln!(file, "{}", line).expect("failed to write wordlist");
    }
    file
}

/// A context whose events can be inspected after the run.
pub fn event_context() -> (ScanContext, mpsc::UnboundedReceiver<ScanEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ScanContext::new(EventSink::new(tx), CancellationToken::new()), rx)
}

/// Everything already sent on the channel.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<ScanEvent>) -> Vec<ScanEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
