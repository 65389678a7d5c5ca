// src/core/scanner/subdomain_scanner.rs

use tracing::{debug, error, info, warn};

use crate::config::ScanConfig;
use crate::core::engine::{Probe, RunOutcome, ScanContext, TaskRunner};
use crate::core::error::Result;
use crate::core::models::{ModuleKind, ResolvedSubdomain, ScanEvent, StatusLevel};
use crate::core::scanner::common::{extract_host, load_wordlist};
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use rand::Rng;
use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;

const MODULE: ModuleKind = ModuleKind::SubdomainEnumeration;

/// Forward lookup seam. Any failure (NXDOMAIN, SERVFAIL, timeout) is `None`.
pub trait HostResolver: Send + Sync + 'static {
    fn resolve(&self, host: &str) -> impl Future<Output = Option<IpAddr>> + Send;
}

/// Resolver backed by the system DNS configuration through hickory.
pub struct DnsResolver {
    inner: TokioAsyncResolver,
}

impl DnsResolver {
    pub fn from_system() -> Self {
        // Fall back to hickory's defaults when /etc/resolv.conf is unusable.
        let inner = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            warn!(error = %e, "System resolver config unavailable, using defaults.");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });
        Self { inner }
    }
}

impl HostResolver for DnsResolver {
    async fn resolve(&self, host: &str) -> Option<IpAddr> {
        match self.inner.lookup_ip(host).await {
            Ok(lookup) => {
                let addrs: Vec<IpAddr> = lookup.iter().collect();
                addrs.iter().find(|ip| ip.is_ipv4()).or(addrs.first()).copied()
            }
            Err(e) => {
                debug!(host, error = %e, "Lookup failed.");
                None
            }
        }
    }
}

/// Resolves `{label}.{domain}` for each candidate label.
pub struct SubdomainProbe<R> {
    resolver: Arc<R>,
    domain: String,
}

impl<R: HostResolver> SubdomainProbe<R> {
    pub fn new(resolver: Arc<R>, domain: &str) -> Self {
        Self { resolver, domain: domain.trim_end_matches('.').to_string() }
    }
}

impl<R: HostResolver> Probe for SubdomainProbe<R> {
    type Candidate = String;
    type Output = ResolvedSubdomain;

    async fn probe(&self, label: String) -> Option<ResolvedSubdomain> {
        let fqdn = format!("{}.{}", label, self.domain);
        let ip = self.resolver.resolve(&fqdn).await?;
        Some(ResolvedSubdomain { fqdn, ip: ip.to_string() })
    }
}

/// Resolves a random six-digit label under `domain`. A hit means wildcard DNS
/// is on and any "found" subdomain may be a false positive.
pub async fn detect_wildcard<R: HostResolver>(resolver: &R, domain: &str) -> bool {
    let label: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    let probe_name = format!("{}.{}", label, domain);
    let hit = resolver.resolve(&probe_name).await.is_some();
    debug!(probe_name = %probe_name, wildcard = hit, "Wildcard DNS check.");
    hit
}

/// Checks for wildcard DNS (advisory only) and then resolves every label.
pub async fn enumerate_subdomains<R: HostResolver>(
    resolver: Arc<R>,
    domain: &str,
    labels: Vec<String>,
    runner: &TaskRunner,
    ctx: &ScanContext,
) -> RunOutcome<ResolvedSubdomain> {
    if detect_wildcard(resolver.as_ref(), domain).await {
        warn!(domain, "Wildcard DNS detected.");
        ctx.events.status(
            MODULE,
            StatusLevel::Warning,
            "Wildcard DNS detected! Results may contain false positives",
        );
    }
    let probe = Arc::new(SubdomainProbe::new(resolver, domain));
    runner.run(probe, labels).await
}

/// Runs the subdomain module against the target's host.
pub async fn run_subdomain_scan(config: &ScanConfig, ctx: &ScanContext) -> Result<Vec<ResolvedSubdomain>> {
    let Some(wordlist) = config.sub_wordlist.as_deref() else {
        return Ok(Vec::new());
    };
    let domain = extract_host(&config.target)?;
    info!(domain = %domain, wordlist = %wordlist.display(), "Starting subdomain enumeration.");
    ctx.events.status(MODULE, StatusLevel::Info, format!("Enumerating subdomains for {}", domain));

    let labels = match load_wordlist(wordlist).await {
        Ok(labels) => labels,
        Err(e) => {
            error!(error = %e, "Subdomain enumeration aborted.");
            ctx.events.status(MODULE, StatusLevel::Error, e.to_string());
            return Ok(Vec::new());
        }
    };

    let runner = TaskRunner::new(MODULE, config.subdomain_threads, ctx)?;
    ctx.events.emit(ScanEvent::ModuleStarted { module: MODULE, total: Some(labels.len()) });
    ctx.events.status(
        MODULE,
        StatusLevel::Info,
        format!("Scanning {} subdomains with {} max tasks", labels.len(), runner.concurrency()),
    );

    let resolver = Arc::new(DnsResolver::from_system());
    let outcome = enumerate_subdomains(resolver, &domain, labels, &runner, ctx).await;
    ctx.events.emit(ScanEvent::ModuleFinished { module: MODULE, found: outcome.results.len() });
    info!(found = outcome.results.len(), "Subdomain enumeration finished.");
    Ok(outcome.results)
}
