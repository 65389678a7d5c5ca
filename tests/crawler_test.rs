//! Integration tests for the breadth-first crawler.

mod common;

use insight_rs::core::engine::ScanContext;
use insight_rs::core::models::{MatchLocation, PatternMatch, VulnCategory};
use insight_rs::core::scanner::common::build_http_client;
use insight_rs::core::scanner::crawler::{CrawlLimits, Crawler, run_crawler};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OUTSIDE: &str = "http://outside.invalid/landing";

async fn site() -> MockServer {
    let server = MockServer::start().await;
    let home = format!(
        r#"<html><script>alert(1)</script><a href="/about">about</a><a href="{}">elsewhere</a></html>"#,
        OUTSIDE
    );
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(home))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"<p>About us</p><a href="/deep">deeper</a>"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/deep"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>deep page</p>"))
        .mount(&server)
        .await;
    server
}

fn crawler(max_depth: usize, max_pages: Option<usize>) -> Crawler {
    let client = build_http_client(Duration::from_secs(5), true).unwrap();
    Crawler::new(client, CrawlLimits { max_depth, max_pages, politeness_delay: Duration::ZERO })
}

#[tokio::test]
async fn test_script_on_seed_is_reported_as_content_xss() {
    let server = site().await;
    let seed = format!("{}/", server.uri());

    let outcome = crawler(2, None).crawl(&server.uri(), &ScanContext::detached()).await;

    assert_eq!(
        outcome.findings,
        vec![PatternMatch { location: MatchLocation::Content, url: seed, category: VulnCategory::Xss }]
    );
    assert_eq!(outcome.pages_crawled, 3);
}

#[tokio::test]
async fn test_links_outside_the_seed_are_never_visited() {
    let server = site().await;

    let outcome = crawler(2, None).crawl(&server.uri(), &ScanContext::detached()).await;

    assert!(!outcome.visited.contains(OUTSIDE));
    assert!(outcome.visited.contains(&format!("{}/about", server.uri())));
}

#[tokio::test]
async fn test_depth_limits_link_following() {
    let server = site().await;

    let shallow = crawler(0, None).crawl(&server.uri(), &ScanContext::detached()).await;
    assert_eq!(shallow.pages_crawled, 1);

    let one_hop = crawler(1, None).crawl(&server.uri(), &ScanContext::detached()).await;
    assert_eq!(one_hop.pages_crawled, 2);
    assert!(!one_hop.visited.contains(&format!("{}/deep", server.uri())));
}

#[tokio::test]
async fn test_page_ceiling_stops_the_crawl() {
    let server = site().await;

    let outcome = crawler(5, Some(1)).crawl(&server.uri(), &ScanContext::detached()).await;

    assert_eq!(outcome.pages_crawled, 1);
}

#[tokio::test]
async fn test_unreachable_seed_yields_no_findings() {
    let mut config = common::test_config("http://127.0.0.1:1");
    config.http_timeout = Duration::from_millis(500);

    let findings = run_crawler(&config, &ScanContext::detached()).await.unwrap();

    assert!(findings.is_empty());
}
