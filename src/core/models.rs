// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{AsRefStr, Display, EnumIter, EnumString};

// --- Moduli e Eventi ---
// Modules and Events

/// The six scan modules. The snake_case names double as the keys of the
/// aggregate report and as the values accepted by `--modules`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModuleKind {
    DirectoryBruteforce,
    SubdomainEnumeration,
    PortScan,
    SslAnalyzer,
    HeaderAnalyzer,
    Crawler,
}

impl ModuleKind {
    /// Human-facing title used in console headings.
    pub fn title(&self) -> &'static str {
        match self {
            ModuleKind::DirectoryBruteforce => "Directory Brute-force",
            ModuleKind::SubdomainEnumeration => "Subdomain Enumeration",
            ModuleKind::PortScan => "Port Scan",
            ModuleKind::SslAnalyzer => "SSL/TLS Analysis",
            ModuleKind::HeaderAnalyzer => "Security Header Analysis",
            ModuleKind::Crawler => "Vulnerability Scan Results",
        }
    }
}

// Level attached to a status line on the live channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Live notifications emitted while a scan runs. Consumers render them;
/// nothing in the engine depends on them being received.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    ModuleStarted { module: ModuleKind, total: Option<usize> },
    Progress { module: ModuleKind, processed: usize, total: usize },
    Found { module: ModuleKind, message: String },
    Status { module: ModuleKind, level: StatusLevel, message: String },
    ModuleFinished { module: ModuleKind, found: usize },
}

// Severity used by the summary counters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

// --- Risultati delle Sonde ---
// Probe Results

/// A path that answered with a status below 400.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DirectoryHit {
    pub url: String,
    pub status: u16,
    pub size: usize,
}

impl fmt::Display for DirectoryHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Found: {} [{}] ({} bytes)", self.url, self.status, self.size)
    }
}

/// A subdomain whose A lookup succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ResolvedSubdomain {
    pub fqdn: String,
    pub ip: String,
}

impl fmt::Display for ResolvedSubdomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Found: {} => {}", self.fqdn, self.ip)
    }
}

/// A TCP port that accepted a connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct OpenPort {
    pub port: u16,
    pub service: String,
}

impl fmt::Display for OpenPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Port {}/tcp open ({})", self.port, self.service)
    }
}

// --- Modelli SSL/TLS ---
// SSL/TLS Models

/// Heuristic findings raised by the TLS inspector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TlsVulnerability {
    LegacyProtocol(String),
    WeakCipher(String),
    ExpiringSoon(i64),
}

impl TlsVulnerability {
    pub fn severity(&self) -> Severity {
        match self {
            TlsVulnerability::LegacyProtocol(_) => Severity::Critical,
            TlsVulnerability::WeakCipher(_) | TlsVulnerability::ExpiringSoon(_) => Severity::Warning,
        }
    }
}

impl fmt::Display for TlsVulnerability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlsVulnerability::LegacyProtocol(_) => write!(f, "TLSv1 (POODLE vulnerable)"),
            TlsVulnerability::WeakCipher(_) => write!(f, "RC4 cipher (weak)"),
            TlsVulnerability::ExpiringSoon(days) => write!(f, "Expiring in {} days", days),
        }
    }
}

/// Everything the inspector learned from one handshake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TlsReport {
    pub host: String,
    pub issuer: String,
    pub subject: String,
    pub not_after: DateTime<Utc>,
    pub days_until_expiry: i64,
    pub protocol: String,
    pub cipher: String,
    pub cipher_bits: u16,
    pub vulnerabilities: Vec<TlsVulnerability>,
}

impl fmt::Display for TlsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} via {} ({})", self.host, self.protocol, self.cipher)
    }
}

// --- Modelli Header HTTP ---
// HTTP Header Models

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HeaderStatus {
    Present,
    Missing,
}

impl fmt::Display for HeaderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderStatus::Present => write!(f, "PRESENT"),
            HeaderStatus::Missing => write!(f, "MISSING"),
        }
    }
}

/// One row of the header table: name, presence and the raw value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeaderCheck {
    pub header: String,
    pub status: HeaderStatus,
    pub value: String,
}

/// Letter grade derived from the weighted header score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SecurityRating {
    APlus,
    A,
    B,
    C,
    F,
}

impl SecurityRating {
    pub fn from_grade(grade: f64) -> Self {
        if grade >= 90.0 {
            SecurityRating::APlus
        } else if grade >= 80.0 {
            SecurityRating::A
        } else if grade >= 70.0 {
            SecurityRating::B
        } else if grade >= 60.0 {
            SecurityRating::C
        } else {
            SecurityRating::F
        }
    }
}

impl fmt::Display for SecurityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SecurityRating::APlus => "A+ (Excellent)",
            SecurityRating::A => "A (Good)",
            SecurityRating::B => "B (Fair)",
            SecurityRating::C => "C (Poor)",
            SecurityRating::F => "F (Critical)",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeaderReport {
    pub checks: Vec<HeaderCheck>,
    pub score: u32,
    pub max_score: u32,
    pub grade: f64,
    pub rating: SecurityRating,
}

impl HeaderReport {
    pub fn missing(&self) -> impl Iterator<Item = &HeaderCheck> {
        self.checks.iter().filter(|c| c.status == HeaderStatus::Missing)
    }
}

// --- Modelli Crawler ---
// Crawler Models

/// Where a detector fired: in the page body or in the page's own URL.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchLocation {
    Content,
    Url,
}

impl fmt::Display for MatchLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchLocation::Content => write!(f, "CONTENT"),
            MatchLocation::Url => write!(f, "URL"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VulnCategory {
    SqlInjection,
    Xss,
    PathTraversal,
    CommandInjection,
    SensitiveDataExposure,
}

impl VulnCategory {
    /// Detection order; results for one page follow it.
    pub const ALL: [VulnCategory; 5] = [
        VulnCategory::SqlInjection,
        VulnCategory::Xss,
        VulnCategory::PathTraversal,
        VulnCategory::CommandInjection,
        VulnCategory::SensitiveDataExposure,
    ];
}

impl fmt::Display for VulnCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VulnCategory::SqlInjection => "SQL Injection",
            VulnCategory::Xss => "XSS Vulnerability",
            VulnCategory::PathTraversal => "Path Traversal",
            VulnCategory::CommandInjection => "Command Injection",
            VulnCategory::SensitiveDataExposure => "Sensitive Data Exposure",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PatternMatch {
    pub location: MatchLocation,
    pub url: String,
    pub category: VulnCategory,
}

impl fmt::Display for PatternMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            MatchLocation::Content => write!(f, "Potential {} detected in: {}", self.category, self.url),
            MatchLocation::Url => write!(f, "Potential {} in URL: {}", self.category, self.url),
        }
    }
}

// --- Report Principale ---
// Main Report

/// Per-module result collections. A module that did not run is `None` and is
/// left out of the serialized document.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ModuleResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory_bruteforce: Option<Vec<DirectoryHit>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain_enumeration: Option<Vec<ResolvedSubdomain>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_scan: Option<Vec<OpenPort>>,
    // Outer `None`: skipped (key absent). Inner `None`: ran but failed (`null`).
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub ssl_analyzer: Option<Option<TlsReport>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub header_analyzer: Option<Option<HeaderReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawler: Option<Vec<PatternMatch>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanReport {
    pub target: String,
    pub timestamp: String,
    pub modules: ModuleResults,
    pub duration_secs: f64,
    #[serde(default)]
    pub cancelled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_and_skipped_modules_survive_json() {
        let modules = ModuleResults { ssl_analyzer: Some(None), ..Default::default() };
        let json = serde_json::to_value(&modules).unwrap();
        assert_eq!(json, serde_json::json!({ "ssl_analyzer": null }));

        let back: ModuleResults = serde_json::from_value(json).unwrap();
        assert_eq!(back.ssl_analyzer, Some(None));
        assert_eq!(back.header_analyzer, None);
    }
}
