//! Output formatting for CLI display
//!
//! Every renderer writes to a caller-supplied [`Write`] so commands can send
//! results to stdout and tests can capture them. Table output is colored;
//! CSV, JSON and plain output never are.

use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use crate::GhxError;
use crate::api::types::{IssueState, Label, Milestone};
use crate::bulk::{BulkEditOutcome, BulkEditReport, FieldChange, IssuePreview, ReportStatus};
use crate::config::OutputFormat;

type Result<T> = std::result::Result<T, GhxError>;

/// One-line progress message for an issue that was just processed
#[must_use]
pub fn outcome_line(outcome: &BulkEditOutcome) -> String {
    match outcome {
        BulkEditOutcome::Succeeded { issue, changed } => {
            format!("  {} {issue} {}", "✓".green(), join_changes(changed, " "))
        }
        BulkEditOutcome::Failed {
            issue,
            cause,
            message,
            changed,
        } => {
            let line = format!("  {} {issue} [{cause}] {message}", "✗".red());
            if changed.is_empty() {
                line
            } else {
                format!("{line} (applied: {})", join_changes(changed, " "))
            }
        }
    }
}

fn join_changes(changed: &[FieldChange], sep: &str) -> String {
    changed.iter().map(ToString::to_string).collect::<Vec<_>>().join(sep)
}

/// Render a bulk edit report
///
/// # Errors
/// Propagates write and serialization errors.
pub fn write_report<W: Write>(out: &mut W, report: &BulkEditReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => report_table(out, report),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(out);
            for outcome in report.outcomes() {
                wtr.serialize(OutcomeRow::from(outcome))?;
            }
            wtr.flush()?;
            Ok(())
        }
        OutputFormat::Json => write_json(out, report),
        OutputFormat::Plain => {
            for outcome in report.outcomes() {
                match outcome {
                    BulkEditOutcome::Succeeded { issue, .. } => {
                        writeln!(out, "{}\tsucceeded", issue.get())?;
                    }
                    BulkEditOutcome::Failed {
                        issue,
                        cause,
                        message,
                        ..
                    } => writeln!(out, "{}\tfailed\t{cause}\t{message}", issue.get())?,
                }
            }
            Ok(())
        }
    }
}

fn report_table<W: Write>(out: &mut W, report: &BulkEditReport) -> Result<()> {
    writeln!(out, "\n{}", "=== Bulk Edit Summary ===".bold())?;
    writeln!(out, "  {}: {}", report.scope(), report.plan_summary())?;
    writeln!(out, "  {} {}", "✓ Success:".green(), report.success_count())?;
    if report.failure_count() > 0 {
        writeln!(out, "  {} {}", "✗ Errors:".red(), report.failure_count())?;
        writeln!(out, "\n{}", "Error details:".red().bold())?;
        for failure in report.failures() {
            if let BulkEditOutcome::Failed {
                issue,
                cause,
                message,
                changed,
            } = failure
            {
                writeln!(out, "  - {issue} [{cause}] {message}")?;
                if !changed.is_empty() {
                    writeln!(out, "    applied before failing: {}", join_changes(changed, " "))?;
                }
            }
        }
    }
    if let Some(retry) = report.failed_range_spec() {
        writeln!(out, "\nRetry failed issues with range: {}", retry.yellow())?;
    }
    let status = match report.status() {
        ReportStatus::Success => "success".green(),
        ReportStatus::PartialFailure => "partial failure".yellow(),
        ReportStatus::Failure => "failure".red(),
    };
    writeln!(out, "Status: {status}")?;
    Ok(())
}

#[derive(Serialize)]
struct OutcomeRow<'a> {
    issue: u64,
    status: &'static str,
    cause: &'static str,
    message: &'a str,
    changes: String,
}

impl<'a> From<&'a BulkEditOutcome> for OutcomeRow<'a> {
    fn from(outcome: &'a BulkEditOutcome) -> Self {
        let changes = join_changes(outcome.changed(), "; ");
        match outcome {
            BulkEditOutcome::Succeeded { issue, .. } => Self {
                issue: issue.get(),
                status: "succeeded",
                cause: "",
                message: "",
                changes,
            },
            BulkEditOutcome::Failed {
                issue,
                cause,
                message,
                ..
            } => Self {
                issue: issue.get(),
                status: "failed",
                cause: cause.as_str(),
                message,
                changes,
            },
        }
    }
}

/// Render the per-issue dry-run comparison
///
/// # Errors
/// Propagates write and serialization errors.
pub fn write_preview<W: Write>(out: &mut W, previews: &[IssuePreview], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => preview_table(out, previews),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(out);
            for preview in previews {
                wtr.serialize(PreviewRow::from(preview))?;
            }
            wtr.flush()?;
            Ok(())
        }
        OutputFormat::Json => write_json(out, previews),
        OutputFormat::Plain => {
            for preview in previews {
                let row = PreviewRow::from(preview);
                writeln!(out, "{}\t{}\t{}", row.issue, row.labels_before, row.labels_after)?;
            }
            Ok(())
        }
    }
}

fn preview_table<W: Write>(out: &mut W, previews: &[IssuePreview]) -> Result<()> {
    let rows: Vec<PreviewRow<'_>> = previews.iter().map(PreviewRow::from).collect();
    let width = rows
        .iter()
        .map(|r| shown(&r.labels_before).chars().count())
        .chain(std::iter::once("Current Labels".len()))
        .max()
        .unwrap_or(0);
    writeln!(out, "{}", "Preview: Label Changes".bold())?;
    writeln!(out, "  {:>6}  {:<width$}  After Labels", "#", "Current Labels")?;
    for (preview, row) in previews.iter().zip(&rows) {
        let issue = format!("{:>6}", format!("#{}", row.issue)).cyan();
        match preview {
            IssuePreview::Found(diff) => {
                let mut after = shown(&row.labels_after).to_string();
                if diff.state_before != diff.state_after {
                    after.push_str(&format!(" [{}]", state_word(diff.state_after)));
                }
                let after = if diff.is_unchanged() {
                    format!("{} (no change)", after.dimmed())
                } else {
                    after.green().to_string()
                };
                writeln!(out, "  {issue}  {:<width$}  {after}", shown(&row.labels_before))?;
            }
            IssuePreview::Failed { .. } => {
                writeln!(out, "  {issue}  {}", format!("Error: {}", row.error).red())?;
            }
        }
    }
    Ok(())
}

fn shown(labels: &str) -> &str {
    if labels.is_empty() { "(none)" } else { labels }
}

const fn state_word(state: IssueState) -> &'static str {
    match state {
        IssueState::Open => "reopened",
        IssueState::Closed => "closed",
    }
}

#[derive(Serialize)]
struct PreviewRow<'a> {
    issue: u64,
    labels_before: String,
    labels_after: String,
    state_before: &'static str,
    state_after: &'static str,
    changed: bool,
    error: &'a str,
}

impl<'a> From<&'a IssuePreview> for PreviewRow<'a> {
    fn from(preview: &'a IssuePreview) -> Self {
        match preview {
            IssuePreview::Found(diff) => Self {
                issue: diff.issue.get(),
                labels_before: join_set(&diff.labels_before),
                labels_after: join_set(&diff.labels_after),
                state_before: diff.state_before.as_str(),
                state_after: diff.state_after.as_str(),
                changed: !diff.is_unchanged(),
                error: "",
            },
            IssuePreview::Failed { issue, message, .. } => Self {
                issue: issue.get(),
                labels_before: String::new(),
                labels_after: String::new(),
                state_before: "",
                state_after: "",
                changed: false,
                error: message,
            },
        }
    }
}

fn join_set(labels: &std::collections::BTreeSet<String>) -> String {
    labels.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Render repository labels
///
/// # Errors
/// Propagates write and serialization errors.
pub fn write_labels<W: Write>(out: &mut W, labels: &[Label], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let width = labels.iter().map(|l| l.name.chars().count()).max().unwrap_or(0);
            for label in labels {
                let name = format!("{:<width$}", label.name);
                let name = match hex_rgb(&label.color) {
                    Some((r, g, b)) => name.truecolor(r, g, b).bold(),
                    None => name.bold(),
                };
                let description = label.description.as_deref().unwrap_or("");
                writeln!(out, "  {name}  #{:<6}  {description}", label.color)?;
            }
            Ok(())
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(out);
            for label in labels {
                wtr.serialize(LabelRow {
                    name: &label.name,
                    color: &label.color,
                    description: label.description.as_deref().unwrap_or(""),
                })?;
            }
            wtr.flush()?;
            Ok(())
        }
        OutputFormat::Json => write_json(out, labels),
        OutputFormat::Plain => {
            for label in labels {
                writeln!(out, "{}", label.name)?;
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct LabelRow<'a> {
    name: &'a str,
    color: &'a str,
    description: &'a str,
}

/// Render repository milestones
///
/// # Errors
/// Propagates write and serialization errors.
pub fn write_milestones<W: Write>(out: &mut W, milestones: &[Milestone], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let width = milestones.iter().map(|m| m.title.chars().count()).max().unwrap_or(0);
            for m in milestones {
                let state = if m.state == "open" {
                    m.state.green()
                } else {
                    m.state.dimmed()
                };
                let due = m
                    .due_on
                    .map(|d| format!("  due {}", d.format("%Y-%m-%d")))
                    .unwrap_or_default();
                writeln!(
                    out,
                    "  {}  {:<width$}  {state}  {}/{} open{due}",
                    format!("{:>4}", format!("#{}", m.number)).cyan(),
                    m.title,
                    m.open_issues,
                    m.open_issues + m.closed_issues,
                )?;
            }
            Ok(())
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(out);
            for m in milestones {
                wtr.serialize(MilestoneRow {
                    number: m.number,
                    title: &m.title,
                    state: &m.state,
                    due_on: m.due_on.map(|d| d.format("%Y-%m-%d").to_string()),
                    open_issues: m.open_issues,
                    closed_issues: m.closed_issues,
                })?;
            }
            wtr.flush()?;
            Ok(())
        }
        OutputFormat::Json => write_json(out, milestones),
        OutputFormat::Plain => {
            for m in milestones {
                writeln!(out, "{}\t{}", m.number, m.title)?;
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct MilestoneRow<'a> {
    number: u64,
    title: &'a str,
    state: &'a str,
    due_on: Option<String>,
    open_issues: u64,
    closed_issues: u64,
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Parse a label color such as `d73a4a`
fn hex_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let color = color.trim_start_matches('#');
    if color.len() != 6 || !color.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&color[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
