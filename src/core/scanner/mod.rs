// src/core/scanner/mod.rs

// Public interface of the `scanner` module: one sub-module per probe kind plus
// the orchestration that runs them in sequence.
pub mod common;
pub mod crawler;
pub mod directory_scanner;
pub mod headers_scanner;
pub mod port_scanner;
pub mod ssl_scanner;
pub mod subdomain_scanner;

use crate::config::ScanConfig;
use crate::core::engine::ScanContext;
use crate::core::error::Result;
use crate::core::models::{ModuleKind, ModuleResults, ScanEvent, ScanReport, StatusLevel};
use self::crawler::run_crawler;
use self::directory_scanner::run_directory_scan;
use self::headers_scanner::run_headers_scan;
use self::port_scanner::run_port_scan;
use self::ssl_scanner::run_ssl_scan;
use self::subdomain_scanner::run_subdomain_scan;
use std::time::Instant;
use tracing::{error, info, warn};

/// Runs every enabled module one after another and aggregates the results.
///
/// Modules run in a fixed order: directories, subdomains, ports, TLS, headers,
/// crawler. The wordlist-driven modules only run when their wordlist is set.
/// Once the context is cancelled no further module is started; the module in
/// progress drains its in-flight work and its partial results are kept.
pub async fn run_full_scan(config: &ScanConfig, ctx: &ScanContext) -> ScanReport {
    let started = Instant::now();
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    info!(target = %config.target, modules = ?config.modules, "Starting full scan.");

    let mut modules = ModuleResults::default();

    if should_run(config, ctx, ModuleKind::DirectoryBruteforce) && config.dir_wordlist.is_some() {
        modules.directory_bruteforce = Some(recover(ctx, ModuleKind::DirectoryBruteforce, run_directory_scan(config, ctx).await));
    }
    if should_run(config, ctx, ModuleKind::SubdomainEnumeration) && config.sub_wordlist.is_some() {
        modules.subdomain_enumeration =
            Some(recover(ctx, ModuleKind::SubdomainEnumeration, run_subdomain_scan(config, ctx).await));
    }
    if should_run(config, ctx, ModuleKind::PortScan) {
        modules.port_scan = Some(recover(ctx, ModuleKind::PortScan, run_port_scan(config, ctx).await));
    }
    if should_run(config, ctx, ModuleKind::SslAnalyzer) {
        modules.ssl_analyzer = Some(run_ssl_scan(config, ctx).await);
    }
    if should_run(config, ctx, ModuleKind::HeaderAnalyzer) {
        modules.header_analyzer = Some(run_headers_scan(config, ctx).await);
    }
    if should_run(config, ctx, ModuleKind::Crawler) {
        modules.crawler = Some(recover(ctx, ModuleKind::Crawler, run_crawler(config, ctx).await));
    }

    let cancelled = ctx.is_cancelled();
    if cancelled {
        warn!(target = %config.target, "Scan interrupted, report is partial.");
    }
    let duration_secs = started.elapsed().as_secs_f64();
    info!(duration_secs, "Full scan finished.");

    ScanReport { target: config.target.clone(), timestamp, modules, duration_secs, cancelled }
}

fn should_run(config: &ScanConfig, ctx: &ScanContext, module: ModuleKind) -> bool {
    config.is_enabled(module) && !ctx.is_cancelled()
}

// A module-level error (bad target, zero concurrency) is reported and the
// module contributes an empty result set instead of failing the scan.
fn recover<T>(ctx: &ScanContext, module: ModuleKind, result: Result<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        error!(module = %module, error = %e, "Module failed.");
        ctx.events.status(module, StatusLevel::Error, format!("{} failed: {}", module.title(), e));
        ctx.events.emit(ScanEvent::ModuleFinished { module, found: 0 });
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn cancelled_scan_starts_no_module() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let ctx = ScanContext::new(Default::default(), cancel);
        let config = ScanConfig::for_target("127.0.0.1");

        let report = run_full_scan(&config, &ctx).await;
        assert!(report.cancelled);
        assert_eq!(report.modules, ModuleResults::default());
        assert_eq!(report.target, "http://127.0.0.1");
    }

    #[tokio::test]
    async fn disabled_and_wordlistless_modules_are_absent() {
        let mut config = ScanConfig::for_target("127.0.0.1");
        config.modules = vec![ModuleKind::DirectoryBruteforce, ModuleKind::PortScan];
        config.ports = vec![];

        let report = run_full_scan(&config, &ScanContext::detached()).await;
        assert!(report.modules.directory_bruteforce.is_none());
        assert_eq!(report.modules.port_scan, Some(vec![]));
        assert!(report.modules.ssl_analyzer.is_none());
        assert!(report.modules.crawler.is_none());
        assert!(!report.cancelled);
        assert_eq!(report.timestamp.len(), "2024-01-01 00:00:00".len());
    }

    #[tokio::test]
    async fn module_errors_become_empty_results() {
        let mut config = ScanConfig::for_target("127.0.0.1");
        config.modules = vec![ModuleKind::PortScan];
        config.port_threads = 0;

        let report = run_full_scan(&config, &ScanContext::detached()).await;
        assert_eq!(report.modules.port_scan, Some(vec![]));
    }
}
