// src/ui/widgets/summary.rs

use crate::app::{OverallStatus, ScanSummary};
use crate::core::models::ScanReport;
use crossterm::style::Stylize;
use std::io::{self, Write};

/// Renders the closing summary block: target, date, counters and the verdict.
pub fn render_summary(out: &mut impl Write, report: &ScanReport, summary: &ScanSummary) -> io::Result<()> {
    writeln!(out, "\n{}", "Scan Summary:".bold().underlined())?;

    let rows = [
        ("Target", report.target.clone().stylize()),
        ("Scan Date", report.timestamp.clone().stylize()),
        ("Critical Findings", summary.critical_issues.to_string().red()),
        ("Warnings", summary.warning_issues.to_string().yellow()),
        ("Informational", summary.info_issues.to_string().blue()),
        ("Duration", format!("{:.2}s", report.duration_secs).stylize()),
    ];
    for (label, value) in rows {
        writeln!(out, "  {} {}", format!("{}:", label).bold(), value)?;
    }

    let verdict = format!(" {} ", summary.status);
    let verdict = match summary.status {
        OverallStatus::Critical => verdict.on_red(),
        OverallStatus::Warning => verdict.on_yellow(),
        OverallStatus::Secure => verdict.on_green(),
    };
    writeln!(out, "\n  Overall Status: {}", verdict)?;

    if report.cancelled {
        writeln!(out, "  {}", "Scan was interrupted; results are partial.".yellow())?;
    }
    Ok(())
}
