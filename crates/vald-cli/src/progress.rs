use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};
use vald_core::RunObserver;

fn terminal_columns() -> Option<usize> {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
}

fn bar_template() -> &'static str {
    match terminal_columns() {
        Some(cols) if cols >= 110 => "{bar:40.cyan/blue} {pos}/{len} {msg}",
        Some(cols) if cols >= 80 => "{wide_bar:.cyan/blue} {pos}/{len} {msg}",
        _ => "{wide_bar:.cyan/blue} {percent}% {msg}",
    }
}

/// Step bar for an extraction run. Log lines print above the bar.
///
/// Without a terminal (or with `--quiet`) there is no bar; log lines go to
/// stderr unless quiet.
pub struct StepProgress {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl StepProgress {
    #[must_use]
    pub fn new(total: usize, quiet: bool) -> Self {
        if quiet || !std::io::stderr().is_terminal() {
            return Self { bar: None, quiet };
        }

        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(bar_template())
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self {
            bar: Some(bar),
            quiet,
        }
    }

    pub fn finish_ok(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message(message.to_string());
        }
    }

    pub fn finish_err(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.abandon_with_message(message.to_string());
        }
    }
}

impl RunObserver for StepProgress {
    fn log(&self, message: &str) {
        match &self.bar {
            Some(bar) => bar.println(message),
            None if !self.quiet => eprintln!("{message}"),
            None => {}
        }
    }

    fn progress(&self, current: usize, total: usize, label: &str) {
        if let Some(bar) = &self.bar {
            bar.set_length(total as u64);
            bar.set_position(current.saturating_sub(1) as u64);
            bar.set_message(format!("[{current}/{total}] {label}"));
        } else if !self.quiet {
            eprintln!("[{current}/{total}] {label}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_progress_has_no_bar_and_ignores_callbacks() {
        let progress = StepProgress::new(8, true);
        assert!(progress.bar.is_none());
        progress.progress(1, 8, "Authenticating");
        progress.log("Authenticated");
        progress.finish_ok("done");
    }
}
