//! Console output helpers
//!
//! All user-facing styling goes through here so commands stay plain
//! `println!` flows. Styles degrade to plain text when stdout is not a
//! terminal (console handles the detection).

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use similar::{ChangeTag, TextDiff};
use std::time::Duration;

pub fn info(message: &str) {
    println!("{} {message}", Style::new().cyan().bold().apply_to("INFO"));
}

pub fn warn(message: &str) {
    println!("{} {message}", Style::new().yellow().bold().apply_to("WARN"));
}

pub fn error(message: &str) {
    eprintln!("{} {message}", Style::new().red().bold().apply_to("ERROR"));
}

pub fn success(message: &str) {
    println!("{} {message}", Style::new().green().bold().apply_to("OK"));
}

pub fn header(message: &str) -> String {
    Style::new().bold().underlined().apply_to(message).to_string()
}

pub fn bold(message: &str) -> String {
    Style::new().bold().apply_to(message).to_string()
}

pub fn file_path(path: &str) -> String {
    Style::new().cyan().apply_to(path).to_string()
}

pub fn dim(message: &str) -> String {
    Style::new().dim().apply_to(message).to_string()
}

pub fn added_line(line: &str) -> String {
    Style::new().green().apply_to(format!("    + {line}")).to_string()
}

pub fn removed_line(line: &str) -> String {
    Style::new().red().apply_to(format!("    - {line}")).to_string()
}

/// Line-based before/after rendering for scalar content updates
///
/// Removed lines render with `-`, inserted lines with `+`, in diff order.
/// Unchanged lines are skipped so only the edit shows.
pub fn content_diff_lines(old_value: &str, new_value: &str) -> Vec<String> {
    let diff = TextDiff::from_lines(old_value, new_value);

    let mut lines = Vec::new();
    for change in diff.iter_all_changes() {
        let line = change.value().trim_end_matches('\n');
        match change.tag() {
            ChangeTag::Delete => lines.push(removed_line(line)),
            ChangeTag::Insert => lines.push(added_line(line)),
            ChangeTag::Equal => {}
        }
    }
    lines
}

/// Spinner shown while a network fetch is in flight
pub fn fetch_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
