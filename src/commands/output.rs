//! Rendering of command results and errors.
//!
//! Human mode writes results to stdout and errors to stderr. JSON mode writes
//! exactly one object to stdout either way.

use super::collect::CollectReport;
use super::submit::SubmitReport;
use crate::config::TimeoutSource;
use crate::deps::{INSTALL_HINTS, REQUIRED_TOOLS};
use crate::error::HermodError;
use serde::Serialize;
use serde_json::{Value, json};
use std::io::{self, Write};

/// Shown in place of the repository URL when it could not be looked up.
pub const FALLBACK_LOCATION: &str = "the Actions tab of the ingestion repository";

#[derive(Serialize)]
struct CollectJson<'a> {
    developer: &'a str,
    days: u32,
    output_file: String,
    timeout_seconds: u64,
    timeout_source: TimeoutSource,
    claude_code: &'a Value,
    codex: &'a Value,
}

#[derive(Serialize)]
struct SubmitJson<'a> {
    submitted: bool,
    file: String,
    developer: &'a str,
    workflow: &'a str,
    repository_url: Option<&'a str>,
}

pub fn collect_human(report: &CollectReport, out: &mut dyn Write) -> io::Result<()> {
    let range = report.date_range();
    writeln!(
        out,
        "Successfully collected usage data for {} (from {})",
        report.developer,
        report.source.describe()
    )?;
    writeln!(out, "Date range: {} to {}", range.start, range.end)?;
    writeln!(out, "Output file: {}", report.output_file.display())?;
    writeln!(
        out,
        "Command timeout: {}s ({})",
        report.timeout.seconds, report.timeout.source
    )?;

    let claude = report.record.claude_code_cost();
    let codex = report.record.codex_cost();
    let total = claude.unwrap_or(0.0) + codex.unwrap_or(0.0);

    writeln!(out)?;
    writeln!(out, "Usage Summary")?;
    writeln!(out, "  {:<12} {:>10}", "Tool", "Total Cost")?;
    writeln!(out, "  {:<12} {:>10}", "Claude Code", format_cost(claude))?;
    writeln!(out, "  {:<12} {:>10}", "Codex", format_cost(codex))?;
    writeln!(out, "  {:<12} {:>10}", "Total", format_cost(Some(total)))?;
    Ok(())
}

pub fn collect_json(report: &CollectReport, out: &mut dyn Write) -> io::Result<()> {
    let body = CollectJson {
        developer: &report.developer,
        days: report.days,
        output_file: report.output_file.display().to_string(),
        timeout_seconds: report.timeout.seconds,
        timeout_source: report.timeout.source,
        claude_code: &report.record.claude_code,
        codex: &report.record.codex,
    };
    write_json(out, &body)
}

pub fn submit_human(report: &SubmitReport, out: &mut dyn Write) -> io::Result<()> {
    writeln!(
        out,
        "Submitted! {} (developer {}) was dispatched to workflow {}.",
        file_name(report),
        report.developer,
        report.workflow
    )?;
    match report.repository_url.as_deref() {
        Some(url) => writeln!(out, "Track the run at {}/actions", url),
        None => writeln!(out, "Track the run in {}.", FALLBACK_LOCATION),
    }
}

pub fn submit_json(report: &SubmitReport, out: &mut dyn Write) -> io::Result<()> {
    let body = SubmitJson {
        submitted: true,
        file: report.file.display().to_string(),
        developer: &report.developer,
        workflow: &report.workflow,
        repository_url: report.repository_url.as_deref(),
    };
    write_json(out, &body)
}

/// `Error: <msg>` on stderr, plus install hints for missing tools.
pub fn error_human(err: &HermodError, stderr: &mut dyn Write) -> io::Result<()> {
    writeln!(stderr, "Error: {}", err)?;

    if let HermodError::DependencyMissing(missing) = err {
        writeln!(stderr)?;
        writeln!(stderr, "Installation instructions:")?;
        for (tool, hint) in REQUIRED_TOOLS.iter().zip(INSTALL_HINTS) {
            if missing.iter().any(|m| m == tool) {
                writeln!(stderr, "  {}", hint)?;
            }
        }
    }
    Ok(())
}

/// `{"error": "<msg>"}` on a single line.
pub fn error_json(err: &HermodError, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", json!({ "error": err.to_string() }))
}

fn write_json<T: Serialize>(out: &mut dyn Write, body: &T) -> io::Result<()> {
    let text = serde_json::to_string_pretty(body).map_err(io::Error::other)?;
    writeln!(out, "{}", text)
}

fn format_cost(cost: Option<f64>) -> String {
    match cost {
        Some(cost) => format!("${:.2}", cost),
        None => "N/A".to_string(),
    }
}

fn file_name(report: &SubmitReport) -> String {
    report
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| report.file.display().to_string())
}
