// src/main.rs

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use insight_rs::app::App;
use insight_rs::config::{DEFAULT_MAX_PAGES, ScanConfig, normalize_target};
use insight_rs::core::knowledge_base::{default_extensions, default_ports};
use insight_rs::core::models::ModuleKind;
use insight_rs::logging::initialize_logging;
use insight_rs::ui::{self, ConsoleTarget};
use std::io::{Write, stderr, stdout};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// insight-rs: web reconnaissance from the terminal.
#[derive(Debug, Clone, Parser)]
#[command(name = "insight-rs", version, about, long_about = None)]
struct Cli {
    /// Target URL or host (http:// is assumed when no scheme is given)
    #[arg(short, long)]
    url: String,

    /// Wordlist for directory brute-forcing
    #[arg(short = 'd', long)]
    dir_wordlist: Option<PathBuf>,

    /// Wordlist for subdomain enumeration
    #[arg(short = 's', long)]
    sub_wordlist: Option<PathBuf>,

    /// Ports to scan (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    ports: Option<Vec<u16>>,

    /// Concurrency for the directory and subdomain probes
    #[arg(short, long)]
    threads: Option<usize>,

    /// Concurrency for the port scan
    #[arg(long, default_value_t = 100)]
    port_threads: usize,

    /// File extensions to try with each word (comma-separated, may include "")
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    extensions: Option<Vec<String>>,

    /// Maximum crawl depth
    #[arg(short = 'c', long, default_value_t = 2)]
    crawl_depth: usize,

    /// Maximum pages to crawl (0 = no limit)
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: usize,

    /// Port used by the SSL/TLS analyzer
    #[arg(long, default_value_t = 443)]
    tls_port: u16,

    /// Modules to run (comma-separated, default: all)
    #[arg(long, value_delimiter = ',')]
    modules: Option<Vec<String>>,

    /// Print the final report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Debug-level logging in the log file
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<ScanConfig> {
        let mut config = ScanConfig {
            target: normalize_target(&self.url),
            dir_wordlist: self.dir_wordlist,
            sub_wordlist: self.sub_wordlist,
            extensions: self.extensions.unwrap_or_else(default_extensions),
            ports: self.ports.unwrap_or_else(default_ports),
            port_threads: self.port_threads,
            crawl_depth: self.crawl_depth,
            max_pages: (self.max_pages > 0).then_some(self.max_pages),
            tls_port: self.tls_port,
            ..ScanConfig::default()
        };
        if let Some(threads) = self.threads {
            config.threads = threads;
            config.subdomain_threads = threads;
        }
        if let Some(names) = self.modules {
            config.modules = parse_modules(&names)?;
        }
        Ok(config)
    }
}

fn parse_modules(names: &[String]) -> Result<Vec<ModuleKind>> {
    names
        .iter()
        .map(|name| {
            ModuleKind::from_str(name.trim()).map_err(|_| eyre!("unknown module '{}'", name.trim()))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let json = cli.json;
    let log_path = initialize_logging(cli.verbose).wrap_err("failed to initialize logging")?;
    let config = cli.into_config()?;
    info!(target = %config.target, log = %log_path.display(), "insight-rs starting.");

    let mut app = App::new(config);
    if json {
        app.console = ConsoleTarget::Stderr;
    }

    // With --json, stdout carries only the document; everything else goes to stderr.
    let report = if json {
        ui::render_banner(&mut stderr())?;
        let report = app.run().await.clone();
        let mut out = stdout();
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
        ui::render_report(&mut stderr(), &report, &app.summary)?;
        report
    } else {
        ui::render_banner(&mut stdout())?;
        let report = app.run().await.clone();
        ui::render_report(&mut stdout(), &report, &app.summary)?;
        report
    };
    info!(cancelled = report.cancelled, duration_secs = report.duration_secs, "insight-rs finished.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_names_are_trimmed_and_validated() {
        let parsed = parse_modules(&["port_scan".into(), " crawler".into()]).unwrap();
        assert_eq!(parsed, vec![ModuleKind::PortScan, ModuleKind::Crawler]);
        assert!(parse_modules(&["dns".into()]).is_err());
    }

    #[test]
    fn cli_lowers_into_config() {
        let cli = Cli::parse_from(["insight-rs", "-u", "example.com", "-t", "8", "--max-pages", "0", "-p", "22,80"]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.target, "http://example.com");
        assert_eq!(config.threads, 8);
        assert_eq!(config.subdomain_threads, 8);
        assert_eq!(config.max_pages, None);
        assert_eq!(config.ports, vec![22, 80]);
        assert_eq!(config.port_threads, 100);
    }

    #[test]
    fn defaults_match_the_library() {
        let config = Cli::parse_from(["insight-rs", "--url", "https://example.com"]).into_config().unwrap();
        let defaults = ScanConfig::for_target("https://example.com");
        assert_eq!(config.threads, defaults.threads);
        assert_eq!(config.subdomain_threads, defaults.subdomain_threads);
        assert_eq!(config.extensions, defaults.extensions);
        assert_eq!(config.max_pages, defaults.max_pages);
        assert_eq!(config.modules, defaults.modules);
    }
}
