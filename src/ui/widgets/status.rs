// src/ui/widgets/status.rs

use crate::core::models::StatusLevel;
use crossterm::style::{StyledContent, Stylize};

pub fn symbol(level: StatusLevel) -> StyledContent<&'static str> {
    match level {
        StatusLevel::Info => "🛈".blue(),
        StatusLevel::Success => "✓".green(),
        StatusLevel::Warning => "⚠".yellow(),
        StatusLevel::Error => "✗".red(),
    }
}

pub fn status_line(level: StatusLevel, message: &str) -> String {
    format!("{} {}", symbol(level), message)
}
