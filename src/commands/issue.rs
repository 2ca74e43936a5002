//! Issue commands

use std::io::{self, Write};

use colored::Colorize;
use dialoguer::Confirm;

use crate::api::types::IssueState;
use crate::bulk::{
    BulkEditor, IssueSet, MutationPlan, ReportStatus, ResolvedPlan, build_mutation_plan,
    parse_range_spec,
};
use crate::cli::{ApplyArgs, EditArgs, StateArgs};
use crate::config::OutputFormat;
use crate::output;
use crate::session::Session;
use crate::GhxError;

type Result<T> = std::result::Result<T, GhxError>;

/// What happens once a plan has been validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// Show the per-issue comparison, change nothing
    DryRun,
    /// Ask before writing
    Confirm,
    /// Write without asking
    Apply,
}

/// Only `--yes` skips the prompt; output settings never do
const fn gate(apply: ApplyArgs) -> Gate {
    if apply.dry_run {
        Gate::DryRun
    } else if apply.yes {
        Gate::Apply
    } else {
        Gate::Confirm
    }
}

/// Execute `ghx issue edit`
///
/// Everything that can be checked up front (range, plan consistency, label
/// and milestone names) is checked before the prompt. Returns the aggregate
/// status so `main` can pick the exit code.
///
/// # Errors
/// Validation, scope and collection-fetch errors; per-issue failures are
/// reported, not returned.
pub fn edit(session: &Session, args: &EditArgs, format: OutputFormat, quiet: bool) -> Result<ReportStatus> {
    let issues = parse_range_spec(&args.range, session.config().max_targets)?;
    let plan = build_mutation_plan(
        non_empty(&args.add_labels),
        non_empty(&args.remove_labels),
        args.set_labels.clone(),
        args.assignee_edit(),
        args.milestone.clone(),
    )?;
    run_batch(session, &issues, &plan, args.apply, format, quiet)
}

/// Execute `ghx issue close` or `ghx issue reopen`
///
/// # Errors
/// See [`edit`].
pub fn set_state(
    session: &Session,
    args: &StateArgs,
    state: IssueState,
    format: OutputFormat,
    quiet: bool,
) -> Result<ReportStatus> {
    let issues = parse_range_spec(&args.range, session.config().max_targets)?;
    run_batch(
        session,
        &issues,
        &MutationPlan::state_change(state),
        args.apply,
        format,
        quiet,
    )
}

fn run_batch(
    session: &Session,
    issues: &IssueSet,
    plan: &MutationPlan,
    apply: ApplyArgs,
    format: OutputFormat,
    quiet: bool,
) -> Result<ReportStatus> {
    let mut editor = session.bulk_editor();
    let resolved = editor.prepare(plan)?;
    let preview = editor.preview(issues, &resolved);

    match gate(apply) {
        Gate::DryRun => {
            if !quiet {
                eprintln!("{}", "=== Dry Run Mode ===".yellow().bold());
                eprint!("{preview}");
            }
            dry_run(&mut io::stdout().lock(), &editor, issues, &resolved, format)?;
            if !quiet {
                eprintln!("\n{}", "Run without --dry-run to apply changes.".yellow());
            }
            return Ok(ReportStatus::Success);
        }
        Gate::Confirm => {
            eprint!("{preview}");
            let confirmed = Confirm::new()
                .with_prompt(format!("Apply to {} issue(s)?", issues.len()))
                .default(false)
                .interact()
                .map_err(|e| GhxError::InvalidInput(format!("Failed to get confirmation: {e}")))?;
            if !confirmed {
                eprintln!("Cancelled.");
                return Ok(ReportStatus::Success);
            }
        }
        Gate::Apply => {}
    }

    let report = editor.apply_with(issues, &resolved, |outcome| {
        if !quiet {
            eprintln!("{}", output::outcome_line(outcome));
        }
    });
    output::write_report(&mut io::stdout().lock(), &report, format)?;
    Ok(report.status())
}

/// Read every target issue and render its before/after comparison
fn dry_run<W: Write>(
    out: &mut W,
    editor: &BulkEditor<'_>,
    issues: &IssueSet,
    plan: &ResolvedPlan,
    format: OutputFormat,
) -> Result<()> {
    let previews = editor.preview_changes(issues, plan);
    output::write_preview(out, &previews, format)
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}
