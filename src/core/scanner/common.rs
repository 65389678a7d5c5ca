// src/core/scanner/common.rs

use crate::core::error::{Result, ScanError};
use reqwest::{Client, redirect};
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use url::{Host, Url};

/// Reads a newline-delimited wordlist.
///
/// Entries are trimmed; blank lines and `#` comment lines are skipped. Invalid
/// UTF-8 is replaced rather than rejected, since public wordlists often carry
/// stray bytes.
pub async fn load_wordlist(path: &Path) -> Result<Vec<String>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Wordlist not found.");
            return Err(ScanError::WordlistNotFound { path: path.to_path_buf() });
        }
        Err(source) => return Err(ScanError::WordlistRead { path: path.to_path_buf(), source }),
    };

    let words: Vec<String> = String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect();
    debug!(path = %path.display(), entries = words.len(), "Wordlist loaded.");
    Ok(words)
}

/// HTTP client used by the web probes. Each probe run gets its own client.
pub fn build_http_client(timeout: Duration, follow_redirects: bool) -> Result<Client> {
    let policy = if follow_redirects {
        redirect::Policy::limited(10)
    } else {
        redirect::Policy::none()
    };
    Ok(Client::builder().timeout(timeout).redirect(policy).build()?)
}

/// Host part of a target URL, without scheme or port. Bare hosts are accepted.
pub fn extract_host(target: &str) -> Result<String> {
    let candidate = if target.contains("://") {
        target.to_string()
    } else {
        format!("http://{}", target)
    };
    let url = Url::parse(&candidate).map_err(|e| ScanError::InvalidTarget(format!("{target}: {e}")))?;
    match url.host() {
        Some(Host::Domain(domain)) => Ok(domain.to_string()),
        Some(Host::Ipv4(ip)) => Ok(ip.to_string()),
        Some(Host::Ipv6(ip)) => Ok(ip.to_string()),
        None => Err(ScanError::InvalidTarget(target.to_string())),
    }
}
