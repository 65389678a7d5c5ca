//! Integration tests for the security header analyzer.

mod common;

use insight_rs::core::engine::ScanContext;
use insight_rs::core::models::{HeaderStatus, ScanEvent, SecurityRating, StatusLevel};
use insight_rs::core::scanner::headers_scanner::run_headers_scan;
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_csp_only_site_scores_f() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).insert_header("Content-Security-Policy", "default-src 'self'"))
        .mount(&server)
        .await;
    let config = common::test_config(&server.uri());

    let report = run_headers_scan(&config, &ScanContext::detached()).await.expect("header report");

    assert_eq!(report.score, 3);
    assert_eq!(format!("{:.1}", report.grade), "21.4");
    assert_eq!(report.rating, SecurityRating::F);
    let csp = &report.checks[0];
    assert_eq!(csp.header, "Content-Security-Policy");
    assert_eq!(csp.status, HeaderStatus::Present);
    assert_eq!(csp.value, "default-src 'self'");
}

#[tokio::test]
async fn test_hardened_site_scores_a_plus() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Security-Policy", "default-src 'self'")
                .insert_header("X-Content-Type-Options", "nosniff")
                .insert_header("Strict-Transport-Security", "max-age=63072000")
                .insert_header("X-Frame-Options", "DENY")
                .insert_header("Referrer-Policy", "no-referrer")
                .insert_header("Feature-Policy", "camera 'none'")
                .insert_header("Permissions-Policy", "camera=()")
                .insert_header("X-XSS-Protection", "1; mode=block"),
        )
        .mount(&server)
        .await;
    let config = common::test_config(&server.uri());

    let report = run_headers_scan(&config, &ScanContext::detached()).await.expect("header report");

    assert_eq!(report.score, 14);
    assert_eq!(report.rating, SecurityRating::APlus);
    assert_eq!(report.missing().count(), 0);
}

#[tokio::test]
async fn test_failed_request_is_reported_not_raised() {
    let mut config = common::test_config("http://127.0.0.1:1");
    config.http_timeout = Duration::from_millis(500);
    let (ctx, mut rx) = common::event_context();

    assert!(run_headers_scan(&config, &ctx).await.is_none());
    let events = common::drain(&mut rx);
    assert!(events.iter().any(|e| matches!(e, ScanEvent::Status { level: StatusLevel::Error, .. })));
}
