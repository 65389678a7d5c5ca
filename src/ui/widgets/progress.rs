// src/ui/widgets/progress.rs

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub const TEMPLATE: &str = "  {spinner:.cyan} [{bar:40.cyan/blue}] {percent}% ({pos}/{len}) {msg}";

pub fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░")
}

/// A bar for one module, drawn to `target`.
pub fn module_bar(total: usize, target: ProgressDrawTarget) -> ProgressBar {
    let bar = ProgressBar::with_draw_target(Some(total as u64), target);
    bar.set_style(bar_style());
    bar
}
