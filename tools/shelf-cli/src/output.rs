//! Output formatting for the CLI.

use std::fmt::Display;
use std::time::Duration;

use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};

/// Where a line goes.
#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Human-readable CLI output. Suppressed in `--json` mode, except errors and
/// the JSON documents themselves.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    fn line(&self, stream: Stream, text: impl Display) {
        if self.json {
            return;
        }
        match stream {
            Stream::Stdout => println!("{text}"),
            Stream::Stderr => eprintln!("{text}"),
        }
    }

    fn marked(&self, stream: Stream, mark: StyledObject<&str>, msg: &str) {
        self.line(stream, format_args!("{mark} {msg}"));
    }

    pub fn info(&self, msg: &str) {
        self.marked(Stream::Stdout, style("ℹ").blue(), msg);
    }

    pub fn success(&self, msg: &str) {
        self.marked(Stream::Stdout, style("✓").green(), msg);
    }

    pub fn warn(&self, msg: &str) {
        self.marked(Stream::Stderr, style("⚠").yellow(), msg);
    }

    /// Errors are reported in both modes; JSON mode wraps them in an object.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        } else {
            eprintln!("{} {}", style("✗").red(), style(msg).red());
        }
    }

    /// Only shown with `--verbose`.
    pub fn debug(&self, msg: &str) {
        if self.verbose {
            self.line(Stream::Stderr, style(format!("→ {msg}")).dim());
        }
    }

    pub fn header(&self, title: &str) {
        self.line(Stream::Stdout, format_args!("\n{}", style(title).bold().underlined()));
    }

    pub fn kv(&self, key: &str, value: &str) {
        self.line(Stream::Stdout, format_args!("  {}: {value}", style(key).dim()));
    }

    pub fn list_item(&self, item: &str) {
        self.line(Stream::Stdout, format_args!("  {} {item}", style("•").dim()));
    }

    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        self.line(Stream::Stdout, format_args!("  {}", format_row(cols, widths)));
    }

    /// Pretty-printed JSON document on stdout.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(text) = serde_json::to_string_pretty(value) {
            println!("{text}");
        }
    }

    /// Spinner shown while a long step runs; hidden in JSON mode.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner().with_message(msg.to_string());
        if let Ok(template) = ProgressStyle::with_template("{spinner:.green} {msg}") {
            spinner.set_style(template);
        }
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

/// Columns padded to `widths`; a width of 0 leaves the column unpadded.
fn format_row(cols: &[&str], widths: &[usize]) -> String {
    cols.iter()
        .zip(widths)
        .map(|(col, &width)| format!("{col:width$}"))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Status badge for worker and generation states.
pub fn status_badge(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "activated" | "current" | "cache" => style(status).green().to_string(),
        "installing" | "installed" | "activating" | "network" => style(status).yellow().to_string(),
        "redundant" | "failed" => style(status).red().to_string(),
        "stale" => style(status).dim().to_string(),
        _ => status.to_string(),
    }
}

/// Format bytes as human-readable size.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_format_row_pads_columns() {
        assert_eq!(
            format_row(&["static-v1", "current", "38"], &[12, 8, 0]),
            "static-v1     current   38"
        );
        assert_eq!(format_row(&["a", "b"], &[0, 0]), "a  b");
    }

    #[test]
    fn test_status_badge_keeps_text() {
        console::set_colors_enabled(false);
        assert_eq!(status_badge("stale"), "stale");
        assert_eq!(status_badge("unknown"), "unknown");
    }
}
