//! Error types for the scan engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can surface from the scan engine.
///
/// Expected network outcomes (refused connections, NXDOMAIN, timeouts) never
/// become a `ScanError`; probes fold those into "not interesting".
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Wordlist not found: {}", path.display())]
    WordlistNotFound { path: PathBuf },

    #[error("Failed to read wordlist {}: {source}", path.display())]
    WordlistRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Concurrency limit must be at least 1 (got {0})")]
    InvalidConcurrency(usize),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, ScanError>;
