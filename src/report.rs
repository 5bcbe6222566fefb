// src/report.rs
// =============================================================================
// Turns results into something people (or other programs) can read:
// - a pretty-printed JSON file
// - JSON on stdout
// - a short summary in the terminal, optionally with one line per link
// =============================================================================

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::checker::LinkResult;
use crate::session::{CheckSession, Summary};

/// Serializes results as a JSON array, two-space indented.
///
/// serde_json writes non-ASCII characters as-is, so international URLs
/// and error messages stay readable.
pub fn to_json(results: &[LinkResult]) -> Result<String> {
    serde_json::to_string_pretty(results).context("failed to serialize results")
}

/// Writes the JSON report to `path`, replacing any existing file.
pub fn write_json(path: &Path, results: &[LinkResult]) -> Result<()> {
    let json = to_json(results)?;
    fs::write(path, json).with_context(|| format!("failed to write results to {}", path.display()))?;
    tracing::debug!(path = %path.display(), "results saved");
    Ok(())
}

// Builds the terminal report
//
// Example (verbose):
//   ==================================================
//   Report for: https://example.com
//   Links found: 2
//   Total checked: 2
//   Working: 1
//   Broken: 1
//
//   Details:
//   ✗ https://example.com/gone [404]
//   ✓ https://example.com/ [200]
pub fn render_summary(session: &CheckSession, verbose: bool) -> String {
    let results = &session.results;
    let summary = Summary::of(results);
    let mut out = String::new();

    // Writing into a String can't fail, so the fmt::Results are ignored
    let _ = writeln!(out, "\n{}", "=".repeat(50));
    let _ = writeln!(out, "Report for: {}", session.seed);
    let _ = writeln!(out, "Links found: {}", session.discovered.len());
    let _ = writeln!(out, "Total checked: {}", summary.total);
    let _ = writeln!(out, "Working: {}", summary.working);
    let _ = writeln!(out, "Broken: {}", summary.broken);

    if verbose && !results.is_empty() {
        let _ = writeln!(out, "\nDetails:");
        for result in results {
            let _ = writeln!(out, "{}", format_line(result));
        }
    }

    out
}

pub fn print_summary(session: &CheckSession, verbose: bool) {
    print!("{}", render_summary(session, verbose));
}

fn format_line(result: &LinkResult) -> String {
    let marker = if result.ok { '✓' } else { '✗' };
    let status = match result.status {
        Some(code) => code.to_string(),
        None => "ERROR".to_string(),
    };
    format!("{} {} [{}]", marker, result.url, status)
}
