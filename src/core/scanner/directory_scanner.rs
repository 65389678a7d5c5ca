// src/core/scanner/directory_scanner.rs

use tracing::{debug, error, info};

use crate::config::ScanConfig;
use crate::core::engine::{Probe, RunOutcome, ScanContext, TaskRunner};
use crate::core::error::Result;
use crate::core::knowledge_base::random_user_agent;
use crate::core::models::{DirectoryHit, ModuleKind, ScanEvent, StatusLevel};
use crate::core::scanner::common::{build_http_client, load_wordlist};
use reqwest::Client;
use reqwest::header::USER_AGENT;
use std::sync::Arc;

const MODULE: ModuleKind = ModuleKind::DirectoryBruteforce;

/// Checks whether `{base}/{path}` exists. Anything below 400 counts, since
/// redirects are not followed and a 3xx still reveals the path.
pub struct DirectoryProbe {
    client: Client,
    base: String,
}

impl DirectoryProbe {
    pub fn new(client: Client, target: &str) -> Self {
        Self { client, base: target.trim_end_matches('/').to_string() }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }
}

impl Probe for DirectoryProbe {
    type Candidate = String;
    type Output = DirectoryHit;

    async fn probe(&self, path: String) -> Option<DirectoryHit> {
        let url = self.url_for(&path);
        let response = match self.client.get(&url).header(USER_AGENT, random_user_agent()).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %url, error = %e, "Request failed.");
                return None;
            }
        };

        let status = response.status().as_u16();
        if status >= 400 {
            return None;
        }
        let size = response.bytes().await.ok()?.len();
        Some(DirectoryHit { url, status, size })
    }
}

/// Word × extension, word outer and extension inner.
pub fn generate_paths(words: &[String], extensions: &[String]) -> Vec<String> {
    words
        .iter()
        .flat_map(|word| extensions.iter().map(move |ext| format!("{word}{ext}")))
        .collect()
}

/// Probes every generated path under `target` with a bounded runner.
pub async fn bruteforce_paths(
    client: Client,
    target: &str,
    words: &[String],
    extensions: &[String],
    runner: &TaskRunner,
) -> RunOutcome<DirectoryHit> {
    let candidates = generate_paths(words, extensions);
    debug!(target, candidates = candidates.len(), "Generated directory candidates.");
    let probe = Arc::new(DirectoryProbe::new(client, target));
    runner.run(probe, candidates).await
}

/// Runs the directory brute-force module. A missing wordlist is reported on
/// the event channel and yields an empty result without probing anything.
pub async fn run_directory_scan(config: &ScanConfig, ctx: &ScanContext) -> Result<Vec<DirectoryHit>> {
    let Some(wordlist) = config.dir_wordlist.as_deref() else {
        return Ok(Vec::new());
    };
    info!(target = %config.target, wordlist = %wordlist.display(), "Starting directory brute-force.");
    ctx.events.status(MODULE, StatusLevel::Info, format!("Starting directory brute-force on {}", config.target));

    let words = match load_wordlist(wordlist).await {
        Ok(words) => words,
        Err(e) => {
            error!(error = %e, "Directory brute-force aborted.");
            ctx.events.status(MODULE, StatusLevel::Error, e.to_string());
            return Ok(Vec::new());
        }
    };

    let runner = TaskRunner::new(MODULE, config.threads, ctx)?;
    let client = build_http_client(config.http_timeout, false)?;
    let total = words.len() * config.extensions.len();
    ctx.events.emit(ScanEvent::ModuleStarted { module: MODULE, total: Some(total) });
    ctx.events.status(
        MODULE,
        StatusLevel::Info,
        format!("Scanning {} paths with {} max tasks", total, runner.concurrency()),
    );

    let outcome = bruteforce_paths(client, &config.target, &words, &config.extensions, &runner).await;
    ctx.events.emit(ScanEvent::ModuleFinished { module: MODULE, found: outcome.results.len() });
    info!(found = outcome.results.len(), processed = outcome.processed, "Directory brute-force finished.");
    Ok(outcome.results)
}
