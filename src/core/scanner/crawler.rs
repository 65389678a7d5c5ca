// src/core/scanner/crawler.rs

use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::core::engine::ScanContext;
use crate::core::error::Result;
use crate::core::knowledge_base::{matching_categories, random_user_agent};
use crate::core::models::{MatchLocation, ModuleKind, PatternMatch, ScanEvent, StatusLevel};
use crate::core::scanner::common::build_http_client;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use url::Url;

const MODULE: ModuleKind = ModuleKind::Crawler;

static HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r#"href="(.*?)""#).unwrap());

/// Limits for one breadth-first crawl.
#[derive(Debug, Clone)]
pub struct CrawlLimits {
    pub max_depth: usize,
    /// `None` means no page ceiling.
    pub max_pages: Option<usize>,
    pub politeness_delay: Duration,
}

impl CrawlLimits {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            max_depth: config.crawl_depth,
            max_pages: config.max_pages,
            politeness_delay: config.politeness_delay,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlOutcome {
    pub findings: Vec<PatternMatch>,
    /// Pages fetched successfully.
    pub pages_crawled: usize,
    pub visited: HashSet<String>,
    pub cancelled: bool,
}

/// Runs the detectors over a fetched page. The URL pass only happens when the
/// URL carries a query string, and its matches are recorded separately.
pub fn analyze_page(url: &str, body: &str) -> Vec<PatternMatch> {
    let mut found: Vec<PatternMatch> = matching_categories(body)
        .into_iter()
        .map(|category| PatternMatch { location: MatchLocation::Content, url: url.to_string(), category })
        .collect();
    if url.contains('?') {
        found.extend(
            matching_categories(url)
                .into_iter()
                .map(|category| PatternMatch { location: MatchLocation::Url, url: url.to_string(), category }),
        );
    }
    found
}

/// Absolute `href="..."` targets found in `body`, resolved against `page`.
/// Fragments are dropped so `/a#top` and `/a` are the same page.
pub fn extract_links(page: &Url, body: &str) -> Vec<String> {
    HREF.captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .filter_map(|raw| page.join(raw.as_str()).ok())
        .map(|mut link| {
            link.set_fragment(None);
            link.to_string()
        })
        .collect()
}

/// Breadth-first crawler confined to URLs under the seed.
pub struct Crawler {
    client: Client,
    limits: CrawlLimits,
}

impl Crawler {
    pub fn new(client: Client, limits: CrawlLimits) -> Self {
        Self { client, limits }
    }

    /// Crawls from `seed`. The seed is normalized the same way discovered links
    /// are, so `http://host` and `http://host/` count as one page.
    pub async fn crawl(&self, seed: &str, ctx: &ScanContext) -> CrawlOutcome {
        let seed = Url::parse(seed).map(|url| url.to_string()).unwrap_or_else(|_| seed.to_string());
        let seed = seed.as_str();
        let mut outcome = CrawlOutcome::default();
        let mut frontier: VecDeque<(String, usize)> = VecDeque::from([(seed.to_string(), 0)]);

        while let Some((url, depth)) = frontier.pop_front() {
            if ctx.is_cancelled() {
                outcome.cancelled = true;
                break;
            }
            if self.limits.max_pages.is_some_and(|max| outcome.pages_crawled >= max) {
                info!(pages = outcome.pages_crawled, "Page ceiling reached, stopping crawl.");
                ctx.events.status(
                    MODULE,
                    StatusLevel::Warning,
                    format!("Page limit of {} reached", outcome.pages_crawled),
                );
                break;
            }
            if depth > self.limits.max_depth || !outcome.visited.insert(url.clone()) {
                continue;
            }

            ctx.events.status(MODULE, StatusLevel::Info, format!("Scanning page: {}", url));
            let body = match self.fetch(&url).await {
                Ok(body) => body,
                Err(e) => {
                    debug!(url = %url, error = %e, "Fetch failed, skipping page.");
                    continue;
                }
            };
            outcome.pages_crawled += 1;

            for finding in analyze_page(&url, &body) {
                warn!(url = %finding.url, category = %finding.category, location = %finding.location, "Pattern matched.");
                ctx.events.found(MODULE, finding.to_string());
                outcome.findings.push(finding);
            }

            if depth < self.limits.max_depth {
                if let Ok(page) = Url::parse(&url) {
                    for link in extract_links(&page, &body) {
                        if link.starts_with(seed) && !outcome.visited.contains(&link) {
                            frontier.push_back((link, depth + 1));
                        }
                    }
                }
            }

            ctx.events.emit(ScanEvent::Progress {
                module: MODULE,
                processed: outcome.pages_crawled,
                total: outcome.pages_crawled + frontier.len(),
            });

            tokio::select! {
                _ = ctx.cancel.cancelled() => {
                    outcome.cancelled = true;
                    break;
                }
                _ = tokio::time::sleep(self.limits.politeness_delay) => {}
            }
        }

        outcome
    }

    async fn fetch(&self, url: &str) -> reqwest::Result<String> {
        self.client
            .get(url)
            .header(USER_AGENT, random_user_agent())
            .send()
            .await?
            .text()
            .await
    }
}

/// Runs the crawler module from the configured target.
pub async fn run_crawler(config: &ScanConfig, ctx: &ScanContext) -> Result<Vec<PatternMatch>> {
    let limits = CrawlLimits::from_config(config);
    info!(target = %config.target, depth = limits.max_depth, max_pages = ?limits.max_pages, "Starting crawl.");
    ctx.events.emit(ScanEvent::ModuleStarted { module: MODULE, total: None });
    ctx.events.status(
        MODULE,
        StatusLevel::Info,
        format!("Crawling {} (depth={})", config.target, limits.max_depth),
    );

    let client = build_http_client(config.http_timeout, true)?;
    let outcome = Crawler::new(client, limits).crawl(&config.target, ctx).await;

    if outcome.findings.is_empty() {
        ctx.events.status(
            MODULE,
            StatusLevel::Success,
            format!("No obvious vulnerabilities detected in {} crawled pages", outcome.pages_crawled),
        );
    }
    ctx.events.emit(ScanEvent::ModuleFinished { module: MODULE, found: outcome.findings.len() });
    info!(pages = outcome.pages_crawled, findings = outcome.findings.len(), "Crawl finished.");
    Ok(outcome.findings)
}
