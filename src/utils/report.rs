// src/utils/report.rs

//! Console report formatting for the CLI.
//!
//! Provides consistent, timestamped output for headers, items and
//! summaries. Diagnostics go through the `log` facade instead.

use chrono::Local;

use crate::models::{CompareResult, Snapshot};

/// Prefix a line with the local time.
fn format_line(message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] {}", timestamp, message)
}

/// Print a header.
pub fn header(title: &str) {
    let border = "═".repeat(60);
    println!("{}", format_line(&border));
    println!("{}", format_line(&format!("  {}", title)));
    println!("{}", format_line(&border));
}

/// Print a sub-item (indented).
pub fn sub_item(message: &str) {
    println!("{}", format_line(&format!("    {}", message)));
}

/// Print a summary section.
pub fn summary(title: &str, items: &[(&str, String)]) {
    println!("{}", format_line(&format!("[SUMMARY] {}", title)));
    for (key, value) in items {
        println!("{}", format_line(&format!("    {}: {}", key, value)));
    }
}

/// One-line description of a snapshot in a history listing.
pub fn snapshot_line(index: usize, snapshot: &Snapshot) -> String {
    format!(
        "#{:<3} {}  {}",
        index,
        snapshot.timestamp().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
        snapshot.short_hash()
    )
}

/// Summary rows for a comparison.
pub fn compare_rows(result: &CompareResult) -> Vec<(&'static str, String)> {
    vec![
        ("changed", result.has_changes.to_string()),
        ("added", result.summary.added.to_string()),
        ("modified", result.summary.modified.to_string()),
        ("removed", result.summary.removed.to_string()),
    ]
}

/// Print every change of a comparison followed by its summary.
pub fn changes(title: &str, result: &CompareResult) {
    for change in &result.changes {
        sub_item(&change.to_string());
    }
    summary(title, &compare_rows(result));
}
