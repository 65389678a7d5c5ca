// src/ui/widgets/results.rs

use crate::core::models::{
    HeaderReport, HeaderStatus, ModuleKind, ModuleResults, ScanReport, TlsReport,
};
use crossterm::style::Stylize;
use std::io::{self, Write};
use tabled::Table;
use tabled::builder::Builder;
use tabled::settings::Style;

/// A finished module's rows, ready to print under its title.
pub struct ModuleTable {
    pub module: ModuleKind,
    pub table: Table,
}

impl ModuleTable {
    fn new<const N: usize>(module: ModuleKind, headers: [&str; N], rows: impl IntoIterator<Item = [String; N]>) -> Self {
        let mut builder = Builder::default();
        builder.push_record(headers);
        for row in rows {
            builder.push_record(row);
        }
        let mut table = builder.build();
        table.with(Style::rounded());
        Self { module, table }
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "\n{}", format!(" {} ", self.module.title()).bold().on_blue())?;
        writeln!(out, "{}", self.table)
    }
}

/// Renders one table per module that ran and produced rows.
pub fn render_results(out: &mut impl Write, report: &ScanReport) -> io::Result<()> {
    for table in build_tables(&report.modules) {
        table.render(out)?;
    }
    if let Some(Some(headers)) = &report.modules.header_analyzer {
        render_header_score(out, headers)?;
    }
    Ok(())
}

pub fn build_tables(modules: &ModuleResults) -> Vec<ModuleTable> {
    let mut tables = Vec::new();

    if let Some(hits) = modules.directory_bruteforce.as_ref().filter(|h| !h.is_empty()) {
        tables.push(ModuleTable::new(
            ModuleKind::DirectoryBruteforce,
            ["URL", "Status", "Size"],
            hits.iter().map(|hit| [hit.url.clone(), hit.status.to_string(), format!("{} bytes", hit.size)]),
        ));
    }

    if let Some(subs) = modules.subdomain_enumeration.as_ref().filter(|s| !s.is_empty()) {
        tables.push(ModuleTable::new(
            ModuleKind::SubdomainEnumeration,
            ["Subdomain", "IP"],
            subs.iter().map(|sub| [sub.fqdn.clone(), sub.ip.clone()]),
        ));
    }

    if let Some(ports) = modules.port_scan.as_ref().filter(|p| !p.is_empty()) {
        tables.push(ModuleTable::new(
            ModuleKind::PortScan,
            ["Port", "Service"],
            ports.iter().map(|open| [format!("{}/tcp", open.port), open.service.clone()]),
        ));
    }

    if let Some(Some(tls)) = &modules.ssl_analyzer {
        tables.push(tls_table(tls));
    }

    if let Some(Some(headers)) = &modules.header_analyzer {
        tables.push(ModuleTable::new(
            ModuleKind::HeaderAnalyzer,
            ["Header", "Status", "Value"],
            headers.checks.iter().map(|c| [c.header.clone(), c.status.to_string(), c.value.clone()]),
        ));
    }

    if let Some(matches) = modules.crawler.as_ref().filter(|m| !m.is_empty()) {
        tables.push(ModuleTable::new(
            ModuleKind::Crawler,
            ["Type", "URL", "Vulnerability"],
            matches.iter().map(|m| [m.location.to_string(), m.url.clone(), m.category.to_string()]),
        ));
    }

    tables
}

fn tls_table(tls: &TlsReport) -> ModuleTable {
    let vulnerabilities = if tls.vulnerabilities.is_empty() {
        "None found".to_string()
    } else {
        tls.vulnerabilities.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    };

    let rows = [
        ("Host", tls.host.clone()),
        ("Issuer", tls.issuer.clone()),
        ("Subject", tls.subject.clone()),
        (
            "Expiration",
            format!("{} ({} days)", tls.not_after.format("%Y-%m-%d %H:%M:%S"), tls.days_until_expiry),
        ),
        ("TLS Version", tls.protocol.clone()),
        ("Cipher", format!("{} {} bits", tls.cipher, tls.cipher_bits)),
        ("Vulnerabilities", vulnerabilities),
    ];
    ModuleTable::new(
        ModuleKind::SslAnalyzer,
        ["Setting", "Value"],
        rows.into_iter().map(|(setting, value)| [setting.to_string(), value]),
    )
}

fn render_header_score(out: &mut impl Write, headers: &HeaderReport) -> io::Result<()> {
    let score = format!("{:.1}%", headers.grade);
    let score = match headers.grade {
        g if g >= 80.0 => score.green(),
        g if g >= 60.0 => score.yellow(),
        _ => score.red(),
    };
    writeln!(out, "\n{} {} - {}", "Security Header Score:".bold(), score, headers.rating)?;

    let missing: Vec<&str> = headers
        .checks
        .iter()
        .filter(|c| c.status == HeaderStatus::Missing)
        .map(|c| c.header.as_str())
        .collect();
    if !missing.is_empty() {
        writeln!(out, "  {} {}", "Missing:".yellow(), missing.join(", "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{OpenPort, TlsVulnerability};
    use chrono::{TimeZone, Utc};

    #[test]
    fn empty_result_sets_produce_no_table() {
        let modules = ModuleResults {
            directory_bruteforce: Some(vec![]),
            port_scan: Some(vec![OpenPort { port: 22, service: "SSH".into() }]),
            ..Default::default()
        };
        let tables = build_tables(&modules);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].module, ModuleKind::PortScan);
        assert_eq!(tables[0].table.count_rows(), 2);
        assert!(tables[0].table.to_string().contains("22/tcp"));
    }

    #[test]
    fn tls_table_lists_vulnerabilities() {
        let tls = TlsReport {
            host: "example.com".into(),
            issuer: "Example CA".into(),
            subject: "example.com".into(),
            not_after: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            days_until_expiry: 10,
            protocol: "TLSv1.2".into(),
            cipher: "RC4-SHA".into(),
            cipher_bits: 128,
            vulnerabilities: vec![
                TlsVulnerability::WeakCipher("RC4-SHA".into()),
                TlsVulnerability::ExpiringSoon(10),
            ],
        };
        let table = tls_table(&tls);
        assert_eq!(table.table.count_rows(), 8);
        let text = table.table.to_string();
        assert!(text.contains("RC4 cipher (weak), Expiring in 10 days"));
        assert!(text.contains("RC4-SHA 128 bits"));

        let mut out = Vec::new();
        table.render(&mut out).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains("SSL/TLS"));
        assert!(rendered.contains("╭"));
    }
}
