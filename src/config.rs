//! Scan configuration shared by the CLI and the library.

use crate::core::knowledge_base::{default_extensions, default_ports};
use crate::core::models::ModuleKind;
use std::path::PathBuf;
use std::time::Duration;
use strum::IntoEnumIterator;

/// Default page ceiling for the crawler. A large site can otherwise keep the
/// frontier busy for a very long time even with a small depth.
pub const DEFAULT_MAX_PAGES: usize = 500;

/// Everything a full scan needs. Built from the command line in `main`, or
/// directly by library users and tests.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Target URL, already normalized to carry a scheme.
    pub target: String,
    pub dir_wordlist: Option<PathBuf>,
    pub sub_wordlist: Option<PathBuf>,
    pub extensions: Vec<String>,
    pub ports: Vec<u16>,
    pub threads: usize,
    pub subdomain_threads: usize,
    pub port_threads: usize,
    pub http_timeout: Duration,
    pub connect_timeout: Duration,
    pub tls_port: u16,
    pub crawl_depth: usize,
    /// `None` lets the crawl run until the frontier empties.
    pub max_pages: Option<usize>,
    pub politeness_delay: Duration,
    pub modules: Vec<ModuleKind>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            dir_wordlist: None,
            sub_wordlist: None,
            extensions: default_extensions(),
            ports: default_ports(),
            threads: 30,
            subdomain_threads: 50,
            port_threads: 100,
            http_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(1),
            tls_port: 443,
            crawl_depth: 2,
            max_pages: Some(DEFAULT_MAX_PAGES),
            politeness_delay: Duration::from_millis(100),
            modules: ModuleKind::iter().collect(),
        }
    }
}

impl ScanConfig {
    pub fn for_target(target: &str) -> Self {
        Self { target: normalize_target(target), ..Self::default() }
    }

    pub fn is_enabled(&self, module: ModuleKind) -> bool {
        self.modules.contains(&module)
    }
}

/// Prepends `http://` when the target has no scheme.
pub fn normalize_target(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_hosts_get_http_scheme() {
        assert_eq!(normalize_target("example.com"), "http://example.com");
        assert_eq!(normalize_target(" https://example.com/app "), "https://example.com/app");
    }

    #[test]
    fn defaults_enable_every_module() {
        let config = ScanConfig::for_target("example.com");
        assert_eq!(config.target, "http://example.com");
        assert_eq!(config.modules.len(), 6);
        assert_eq!(config.ports.len(), 23);
        assert_eq!(config.extensions.len(), 7);
        assert_eq!(config.max_pages, Some(DEFAULT_MAX_PAGES));
    }
}
