// src/core/scanner/headers_scanner.rs

use tracing::{debug, error, info, warn};

use crate::config::ScanConfig;
use crate::core::engine::ScanContext;
use crate::core::knowledge_base::{SECURITY_HEADERS, max_header_score, random_user_agent};
use crate::core::models::{
    HeaderCheck, HeaderReport, HeaderStatus, ModuleKind, ScanEvent, SecurityRating, StatusLevel,
};
use crate::core::scanner::common::build_http_client;
use reqwest::header::{HeaderMap, USER_AGENT};

const MODULE: ModuleKind = ModuleKind::HeaderAnalyzer;

/// Checks for the presence of a specific HTTP header in a `HeaderMap`.
///
/// Lookup is case-insensitive. Non-UTF-8 values still count as present.
fn check_header(headers: &HeaderMap, name: &str) -> HeaderCheck {
    match headers.get(name) {
        Some(value) => {
            let value = value.to_str().map(str::to_string).unwrap_or_else(|_| {
                warn!(header_name = name, "Header found but contained invalid UTF-8.");
                "[Invalid UTF-8]".to_string()
            });
            debug!(header_name = name, value = %value, "Header found.");
            HeaderCheck { header: name.to_string(), status: HeaderStatus::Present, value }
        }
        None => {
            debug!(header_name = name, "Header not found.");
            HeaderCheck { header: name.to_string(), status: HeaderStatus::Missing, value: String::new() }
        }
    }
}

/// Scores a response's headers against the weighted security-header table.
///
/// `grade` is the percentage of the maximum achievable score.
pub fn score_headers(headers: &HeaderMap) -> HeaderReport {
    let mut checks = Vec::with_capacity(SECURITY_HEADERS.len());
    let mut score = 0;
    for (name, weight) in SECURITY_HEADERS {
        let check = check_header(headers, name);
        if check.status == HeaderStatus::Present {
            score += weight;
        }
        checks.push(check);
    }

    let max_score = max_header_score();
    let grade = f64::from(score) / f64::from(max_score) * 100.0;
    HeaderReport { checks, score, max_score, grade, rating: SecurityRating::from_grade(grade) }
}

/// Runs the header module: one GET to the target, then scoring.
///
/// A failed request is reported and yields `None`.
pub async fn run_headers_scan(config: &ScanConfig, ctx: &ScanContext) -> Option<HeaderReport> {
    info!(target = %config.target, "Starting headers scan.");
    ctx.events.emit(ScanEvent::ModuleStarted { module: MODULE, total: None });
    ctx.events.status(MODULE, StatusLevel::Info, "Analyzing HTTP security headers");

    let client = match build_http_client(config.http_timeout, true) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client for headers scan.");
            ctx.events.status(MODULE, StatusLevel::Error, format!("Header analysis failed: {}", e));
            ctx.events.emit(ScanEvent::ModuleFinished { module: MODULE, found: 0 });
            return None;
        }
    };

    let report = match client.get(&config.target).header(USER_AGENT, random_user_agent()).send().await {
        Ok(response) => {
            info!(status = %response.status(), "Received HTTP response for headers scan.");
            let report = score_headers(response.headers());
            let level = if report.grade >= 70.0 { StatusLevel::Success } else { StatusLevel::Warning };
            ctx.events.status(
                MODULE,
                level,
                format!("Security Header Score: {:.1}% - {}", report.grade, report.rating),
            );
            Some(report)
        }
        Err(e) => {
            error!(url = %config.target, error = %e, "HTTP request failed for headers scan.");
            ctx.events.status(MODULE, StatusLevel::Error, format!("Header analysis failed: {}", e));
            None
        }
    };
    ctx.events.emit(ScanEvent::ModuleFinished { module: MODULE, found: usize::from(report.is_some()) });
    report
}
