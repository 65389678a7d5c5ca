//! Integration tests for subdomain enumeration with an in-memory resolver.

mod common;

use insight_rs::core::engine::{ScanContext, TaskRunner};
use insight_rs::core::models::{ModuleKind, ResolvedSubdomain, ScanEvent, StatusLevel};
use insight_rs::core::scanner::subdomain_scanner::{HostResolver, enumerate_subdomains};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

struct MockResolver {
    records: HashMap<String, IpAddr>,
    wildcard: Option<IpAddr>,
}

impl MockResolver {
    fn new(records: &[(&str, &str)]) -> Self {
        let records = records
            .iter()
            .map(|(host, ip)| (host.to_string(), ip.parse().unwrap()))
            .collect();
        Self { records, wildcard: None }
    }
}

impl HostResolver for MockResolver {
    async fn resolve(&self, host: &str) -> Option<IpAddr> {
        self.records.get(host).copied().or(self.wildcard)
    }
}

fn runner(ctx: &ScanContext) -> TaskRunner {
    TaskRunner::new(ModuleKind::SubdomainEnumeration, 4, ctx).unwrap()
}

#[tokio::test]
async fn test_only_resolving_names_are_found() {
    let resolver = Arc::new(MockResolver::new(&[("www.example.com", "1.2.3.4")]));
    let ctx = ScanContext::detached();
    let labels = vec!["www".to_string(), "mail".to_string()];

    let outcome = enumerate_subdomains(resolver, "example.com", labels, &runner(&ctx), &ctx).await;

    assert_eq!(
        outcome.results,
        vec![ResolvedSubdomain { fqdn: "www.example.com".into(), ip: "1.2.3.4".into() }]
    );
    assert_eq!(outcome.processed, 2);
}

#[tokio::test]
async fn test_wildcard_zone_warns_but_does_not_filter() {
    let mut resolver = MockResolver::new(&[("www.example.com", "1.2.3.4")]);
    resolver.wildcard = Some("9.9.9.9".parse().unwrap());
    let (ctx, mut rx) = common::event_context();
    let labels = vec!["www".to_string(), "mail".to_string()];

    let outcome = enumerate_subdomains(Arc::new(resolver), "example.com", labels, &runner(&ctx), &ctx).await;
    let events = common::drain(&mut rx);

    assert_eq!(outcome.results.len(), 2);
    assert!(events.iter().any(|e| matches!(
        e,
        ScanEvent::Status { level: StatusLevel::Warning, message, .. } if message.contains("Wildcard DNS")
    )));
}

#[tokio::test]
async fn test_found_events_use_the_arrow_format() {
    let resolver = Arc::new(MockResolver::new(&[("api.example.com", "10.0.0.7")]));
    let (ctx, mut rx) = common::event_context();

    enumerate_subdomains(resolver, "example.com", vec!["api".into()], &runner(&ctx), &ctx).await;
    let events = common::drain(&mut rx);

    assert!(events.contains(&ScanEvent::Found {
        module: ModuleKind::SubdomainEnumeration,
        message: "Found: api.example.com => 10.0.0.7".into(),
    }));
}
