// src/ui/mod.rs

use crate::app::ScanSummary;
use crate::core::models::{ModuleKind, ScanEvent, ScanReport, StatusLevel};
use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressDrawTarget};
use std::io::{self, Write};
use tokio::sync::mpsc;
use tracing::warn;

pub mod widgets;

use widgets::{progress, results, status, summary};

/// Where the live console writes. JSON output owns stdout, so in that mode
/// the live view moves to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

pub fn render_banner(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", "  insight-rs".blue().bold())?;
    writeln!(out, "{}", "  Web reconnaissance toolkit".cyan().bold())?;
    writeln!(out, "  {}\n", format!("Version {}", env!("CARGO_PKG_VERSION")).green())
}

/// Live event renderer. Lines go to `out`; the current module's progress
/// bar is drawn by indicatif and hidden while a line is printed.
pub struct Console<W: Write> {
    out: W,
    draw_target: fn() -> ProgressDrawTarget,
    bar: Option<ProgressBar>,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, draw_target: fn() -> ProgressDrawTarget) -> Self {
        Self { out, draw_target, bar: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// `(position, length)` of the live bar, if one is showing.
    pub fn progress(&self) -> Option<(u64, u64)> {
        self.bar.as_ref().map(|bar| (bar.position(), bar.length().unwrap_or(0)))
    }

    pub fn handle(&mut self, event: &ScanEvent) -> io::Result<()> {
        match event {
            ScanEvent::ModuleStarted { module, .. } => {
                self.clear_bar();
                self.line(&format!("\n{}", format!("[{}]", module.title()).bold()))?;
            }
            ScanEvent::Progress { processed, total, .. } => {
                let draw_target = self.draw_target;
                let bar = self.bar.get_or_insert_with(|| progress::module_bar(*total, draw_target()));
                bar.set_length(*total as u64);
                bar.set_position(*processed as u64);
            }
            ScanEvent::Found { message, .. } => {
                self.line(&format!("  {}", format!("✓ {}", message).green()))?;
            }
            ScanEvent::Status { level, message, .. } => {
                self.line(&status::status_line(*level, message))?;
            }
            ScanEvent::ModuleFinished { module, found } => {
                self.clear_bar();
                let message = finished_message(*module, *found);
                self.line(&status::status_line(StatusLevel::Success, &message))?;
            }
        }
        self.out.flush()
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        let out = &mut self.out;
        match &self.bar {
            Some(bar) => bar.suspend(|| writeln!(out, "{}", text)),
            None => writeln!(out, "{}", text),
        }
    }

    fn clear_bar(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

fn finished_message(module: ModuleKind, found: usize) -> String {
    match module {
        ModuleKind::SslAnalyzer | ModuleKind::HeaderAnalyzer => format!("{} complete", module.title()),
        _ => format!("{} complete: {} found", module.title(), found),
    }
}

/// Drains the event channel until every sender is dropped.
pub async fn consume_events(mut rx: mpsc::UnboundedReceiver<ScanEvent>, target: ConsoleTarget) {
    async fn drain<W: Write>(
        rx: &mut mpsc::UnboundedReceiver<ScanEvent>,
        out: W,
        draw_target: fn() -> ProgressDrawTarget,
    ) {
        let mut console = Console::new(out, draw_target);
        while let Some(event) = rx.recv().await {
            if let Err(e) = console.handle(&event) {
                warn!(error = %e, "Failed to render scan event.");
            }
        }
    }
    match target {
        ConsoleTarget::Stdout => drain(&mut rx, io::stdout(), ProgressDrawTarget::stdout).await,
        ConsoleTarget::Stderr => drain(&mut rx, io::stderr(), ProgressDrawTarget::stderr).await,
    }
}

/// Renders the per-module tables and the summary for a finished scan.
pub fn render_report(out: &mut impl Write, report: &ScanReport, scan_summary: &ScanSummary) -> io::Result<()> {
    results::render_results(out, report)?;
    summary::render_summary(out, report, scan_summary)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console() -> Console<Vec<u8>> {
        Console::new(Vec::new(), ProgressDrawTarget::hidden)
    }

    fn text(console: Console<Vec<u8>>) -> String {
        String::from_utf8(console.into_inner()).unwrap()
    }

    #[test]
    fn found_and_status_lines_are_printed() {
        let mut console = console();
        for event in [
            ScanEvent::ModuleStarted { module: ModuleKind::PortScan, total: Some(2) },
            ScanEvent::Found { module: ModuleKind::PortScan, message: "Port 22/tcp open (SSH)".into() },
            ScanEvent::Progress { module: ModuleKind::PortScan, processed: 2, total: 2 },
            ScanEvent::ModuleFinished { module: ModuleKind::PortScan, found: 1 },
        ] {
            console.handle(&event).unwrap();
        }
        let text = text(console);
        assert!(text.contains("[Port Scan]"));
        assert!(text.contains("Port 22/tcp open (SSH)"));
        assert!(text.contains("Port Scan complete: 1 found"));
    }

    #[test]
    fn progress_events_drive_the_bar_until_the_module_ends() {
        let mut console = console();
        console.handle(&ScanEvent::ModuleStarted { module: ModuleKind::DirectoryBruteforce, total: Some(4) }).unwrap();
        assert_eq!(console.progress(), None);

        console.handle(&ScanEvent::Progress { module: ModuleKind::DirectoryBruteforce, processed: 1, total: 4 }).unwrap();
        console.handle(&ScanEvent::Progress { module: ModuleKind::DirectoryBruteforce, processed: 3, total: 4 }).unwrap();
        assert_eq!(console.progress(), Some((3, 4)));

        console.handle(&ScanEvent::Status {
            module: ModuleKind::DirectoryBruteforce,
            level: StatusLevel::Warning,
            message: "slow target".into(),
        })
        .unwrap();
        assert_eq!(console.progress(), Some((3, 4)));

        console.handle(&ScanEvent::ModuleFinished { module: ModuleKind::DirectoryBruteforce, found: 0 }).unwrap();
        assert_eq!(console.progress(), None);
        assert!(text(console).contains("slow target"));
    }

    #[test]
    fn report_rendering_includes_the_verdict() {
        let report = ScanReport {
            target: "http://example.com".into(),
            timestamp: "2024-01-01 00:00:00".into(),
            modules: Default::default(),
            duration_secs: 1.5,
            cancelled: true,
        };
        let mut out = Vec::new();
        render_report(&mut out, &report, &ScanSummary::from_report(&report)).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("SECURE"));
        assert!(text.contains("1.50s"));
        assert!(text.contains("partial"));
    }
}
