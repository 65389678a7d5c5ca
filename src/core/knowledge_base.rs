//! Static, read-only reference data the probes draw on: the port/service
//! table, default candidate lists, the rotating User-Agent pool, header
//! weights and the crawler's detector patterns.

use crate::core::models::VulnCategory;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use regex::Regex;

/// Well-known TCP ports and the service usually found behind them.
/// Doubles as the default port list, in this order.
pub static SERVICE_NAMES: &[(u16, &str)] = &[
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (80, "HTTP"),
    (110, "POP3"),
    (143, "IMAP"),
    (443, "HTTPS"),
    (445, "SMB"),
    (993, "IMAPS"),
    (995, "POP3S"),
    (1433, "MSSQL"),
    (3306, "MySQL"),
    (3389, "RDP"),
    (5432, "PostgreSQL"),
    (5900, "VNC"),
    (6379, "Redis"),
    (8000, "HTTP Alt"),
    (8080, "HTTP Proxy"),
    (8443, "HTTPS Alt"),
    (9000, "PHP-FPM"),
    (27017, "MongoDB"),
];

/// Name for `port`, or "Unknown" when it is not in the table.
pub fn service_name(port: u16) -> &'static str {
    SERVICE_NAMES
        .iter()
        .find(|(p, _)| *p == port)
        .map(|(_, name)| *name)
        .unwrap_or("Unknown")
}

pub fn default_ports() -> Vec<u16> {
    SERVICE_NAMES.iter().map(|(port, _)| *port).collect()
}

/// Extensions appended to every wordlist entry. The empty string probes the bare word.
pub const DEFAULT_EXTENSIONS: &[&str] = &["", ".php", ".html", ".txt", ".bak", ".old", ".zip"];

pub fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

static USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Windows NT 10.0; rv:78.0) Gecko/20100101 Firefox/78.0",
];

/// Picks one browser User-Agent at random for the next request.
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Security headers and the weight each contributes to the header score.
pub static SECURITY_HEADERS: &[(&str, u32)] = &[
    ("Content-Security-Policy", 3),
    ("X-Content-Type-Options", 2),
    ("Strict-Transport-Security", 3),
    ("X-Frame-Options", 2),
    ("Referrer-Policy", 1),
    ("Feature-Policy", 1),
    ("Permissions-Policy", 1),
    ("X-XSS-Protection", 1),
];

pub fn max_header_score() -> u32 {
    SECURITY_HEADERS.iter().map(|(_, weight)| weight).sum()
}

// Detector patterns, all case-insensitive. These are indicators, not proof.
static RE_SQLI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)select.*from|insert into|union all|' or '1'='1").unwrap());
static RE_XSS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<script>|alert\(|onerror=|javascript:").unwrap());
static RE_PATH_TRAVERSAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.\./|\.\.\\|etc/passwd").unwrap());
static RE_COMMAND_INJECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i);\s*\b(?:rm|ls|cat|echo|whoami|id|pwd)\b").unwrap());
static RE_SENSITIVE_DATA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)password|secret|api[_-]?key|token").unwrap());

/// The detector for a category.
pub fn detector(category: VulnCategory) -> &'static Regex {
    match category {
        VulnCategory::SqlInjection => &RE_SQLI,
        VulnCategory::Xss => &RE_XSS,
        VulnCategory::PathTraversal => &RE_PATH_TRAVERSAL,
        VulnCategory::CommandInjection => &RE_COMMAND_INJECTION,
        VulnCategory::SensitiveDataExposure => &RE_SENSITIVE_DATA,
    }
}

/// Categories whose detector fires on `text`, in detection order.
pub fn matching_categories(text: &str) -> Vec<VulnCategory> {
    VulnCategory::ALL
        .into_iter()
        .filter(|category| detector(*category).is_match(text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ports_cover_ftp_through_mongodb() {
        let ports = default_ports();
        assert_eq!(ports.len(), 23);
        assert_eq!(ports.first(), Some(&21));
        assert_eq!(ports.last(), Some(&27017));
    }

    #[test]
    fn unknown_ports_map_to_unknown() {
        assert_eq!(service_name(22), "SSH");
        assert_eq!(service_name(6379), "Redis");
        assert_eq!(service_name(31337), "Unknown");
    }

    #[test]
    fn header_weights_sum_to_fourteen() {
        assert_eq!(max_header_score(), 14);
    }

    #[test]
    fn user_agent_comes_from_the_pool() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
    }

    #[test]
    fn detectors_are_case_insensitive() {
        assert_eq!(matching_categories("<SCRIPT>alert(1)</SCRIPT>"), vec![VulnCategory::Xss]);
        assert_eq!(matching_categories("SELECT name FROM users"), vec![VulnCategory::SqlInjection]);
        assert_eq!(matching_categories("Your API-KEY is"), vec![VulnCategory::SensitiveDataExposure]);
    }

    #[test]
    fn detectors_cover_traversal_and_command_injection() {
        assert_eq!(matching_categories("file=../../etc/passwd"), vec![VulnCategory::PathTraversal]);
        assert_eq!(matching_categories("host=x; whoami"), vec![VulnCategory::CommandInjection]);
        assert!(matching_categories("plain brochure text").is_empty());
    }

    #[test]
    fn several_categories_can_fire_on_one_text() {
        let found = matching_categories("<script>var token = 'x'</script>");
        assert_eq!(found, vec![VulnCategory::Xss, VulnCategory::SensitiveDataExposure]);
    }
}
