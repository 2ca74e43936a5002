use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use tracing::{info, instrument, warn};

use super::error::BulkError;
use super::plan::{FieldChange, MilestoneInstruction, MutationPlan, ResolvedLabel, ResolvedPlan};
use super::preview::{IssueDiff, IssuePreview};
use super::range::{IssueNumber, IssueSet};
use super::report::{BulkEditOutcome, BulkEditReport};
use super::resolve::ReferenceResolver;
use crate::api::issues::{self, IssuePatch};
use crate::api::{ApiError, Transport};
use crate::scope::Scope;

/// Number of issue numbers listed in a preview before eliding the rest
pub const PREVIEW_LIMIT: usize = 10;

/// Applies one mutation plan to many issues of a single repository
///
/// Use [`prepare`](Self::prepare) to validate and resolve a plan, then
/// [`apply`](Self::apply) it, or do both with [`execute`](Self::execute).
/// Resolution shares one [`ReferenceResolver`], so repeated runs through the
/// same editor hit the cache.
pub struct BulkEditor<'a> {
    scope: Scope,
    transport: &'a dyn Transport,
    resolver: ReferenceResolver<'a>,
}

impl<'a> BulkEditor<'a> {
    /// An editor with a reference cache of its own
    #[must_use]
    pub fn new(transport: &'a dyn Transport, scope: Scope) -> Self {
        Self::with_resolver(transport, scope, ReferenceResolver::new(transport))
    }

    /// An editor resolving through `resolver`, sharing its cache
    #[must_use]
    pub fn with_resolver(transport: &'a dyn Transport, scope: Scope, resolver: ReferenceResolver<'a>) -> Self {
        Self {
            scope,
            transport,
            resolver,
        }
    }

    /// Build an editor for an `owner/repo` string
    ///
    /// # Errors
    /// `BulkError::Configuration` if the repository is malformed.
    pub fn for_repo(transport: &'a dyn Transport, repo: &str) -> Result<Self, BulkError> {
        Ok(Self::new(transport, Scope::parse(repo)?))
    }

    #[must_use]
    pub const fn scope(&self) -> &Scope {
        &self.scope
    }

    pub const fn resolver(&mut self) -> &mut ReferenceResolver<'a> {
        &mut self.resolver
    }

    /// Validate a plan and resolve every name it mentions
    ///
    /// Makes no remote mutation. The milestone reference is resolved once
    /// for the whole batch, and every label name the plan mentions is
    /// resolved in a single lookup, so an error names all unknown labels.
    ///
    /// # Errors
    /// `BulkError::Validation` for an inconsistent plan or unknown names,
    /// `BulkError::Fetch` if a collection cannot be loaded.
    #[instrument(skip_all, fields(scope = %self.scope))]
    pub fn prepare(&mut self, plan: &MutationPlan) -> Result<ResolvedPlan, BulkError> {
        plan.validate()?;
        let scope = &self.scope;

        let milestone = match plan.milestone() {
            Some(raw) => self.resolver.resolve_milestone_ref(scope, raw)?,
            None => MilestoneInstruction::Unchanged,
        };

        let mut wanted: BTreeSet<String> = plan.add_labels().clone();
        wanted.extend(plan.remove_labels().iter().cloned());
        if let Some(names) = plan.set_labels() {
            wanted.extend(names.iter().cloned());
        }
        let labels = self.resolver.resolve_label_names(scope, &wanted)?;
        let by_name: BTreeMap<&str, &ResolvedLabel> =
            labels.iter().map(|l| (l.name.as_str(), l)).collect();
        let pick = |names: &BTreeSet<String>| -> Vec<ResolvedLabel> {
            names
                .iter()
                .filter_map(|n| by_name.get(n.as_str()).map(|l| (*l).clone()))
                .collect()
        };

        let resolved = ResolvedPlan {
            add_labels: pick(plan.add_labels()),
            remove_labels: pick(plan.remove_labels()),
            set_labels: plan.set_labels().map(pick),
            assignees: plan.assignees().map(|a| a.iter().cloned().collect()),
            milestone,
            state: plan.state(),
        };
        info!(plan = %resolved.describe(), "plan resolved");
        Ok(resolved)
    }

    /// Describe what applying `plan` to `issues` would do
    #[must_use]
    pub fn preview(&self, issues: &IssueSet, plan: &ResolvedPlan) -> String {
        let mut out = format!(
            "Edit {} issue(s) in {}: {}\n",
            issues.len(),
            self.scope,
            plan.describe()
        );
        for issue in issues.iter().take(PREVIEW_LIMIT) {
            let _ = writeln!(out, "  {issue}");
        }
        if issues.len() > PREVIEW_LIMIT {
            let _ = writeln!(out, "  ... and {} more", issues.len() - PREVIEW_LIMIT);
        }
        out
    }

    /// Read every target issue and compare it with what the plan would do
    ///
    /// Read-only. An issue that cannot be fetched is listed with its error.
    #[instrument(skip_all, fields(scope = %self.scope, issues = issues.len()))]
    pub fn preview_changes(&self, issues: &IssueSet, plan: &ResolvedPlan) -> Vec<IssuePreview> {
        issues
            .iter()
            .map(|issue| match issues::get_issue(self.transport, &self.scope, issue.get()) {
                Ok(current) => IssuePreview::Found(IssueDiff::new(issue, &current, plan)),
                Err(e) => {
                    warn!(%issue, error = %e, "issue fetch failed");
                    IssuePreview::Failed {
                        issue,
                        cause: e.cause(),
                        message: e.to_string(),
                    }
                }
            })
            .collect()
    }

    /// Apply a resolved plan to every issue
    #[must_use]
    pub fn apply(&self, issues: &IssueSet, plan: &ResolvedPlan) -> BulkEditReport {
        self.apply_with(issues, plan, |_| {})
    }

    /// Apply a resolved plan, reporting each outcome as it happens
    ///
    /// Issues are edited one at a time in ascending order. A failure is
    /// recorded and the batch moves on to the next issue.
    #[instrument(skip_all, fields(scope = %self.scope, issues = issues.len()))]
    pub fn apply_with(
        &self,
        issues: &IssueSet,
        plan: &ResolvedPlan,
        mut observer: impl FnMut(&BulkEditOutcome),
    ) -> BulkEditReport {
        let mut outcomes = Vec::with_capacity(issues.len());
        for issue in issues {
            let mut changed = Vec::new();
            let outcome = match self.edit_issue(issue, plan, &mut changed) {
                Ok(()) => BulkEditOutcome::Succeeded { issue, changed },
                Err(e) => {
                    warn!(%issue, error = %e, applied = changed.len(), "issue edit failed");
                    BulkEditOutcome::Failed {
                        issue,
                        cause: e.cause(),
                        message: e.to_string(),
                        changed,
                    }
                }
            };
            observer(&outcome);
            outcomes.push(outcome);
        }
        let report = BulkEditReport::new(self.scope.clone(), plan.clone(), outcomes);
        info!(
            succeeded = report.success_count(),
            failed = report.failure_count(),
            status = %report.status(),
            "bulk edit finished"
        );
        report
    }

    /// Validate, resolve and apply in one step
    ///
    /// # Errors
    /// See [`prepare`](Self::prepare). Per-issue failures are in the report.
    pub fn execute(&mut self, issues: &IssueSet, plan: &MutationPlan) -> Result<BulkEditReport, BulkError> {
        self.execute_with(issues, plan, |_| {})
    }

    /// [`execute`](Self::execute) with a per-issue observer
    ///
    /// # Errors
    /// See [`prepare`](Self::prepare).
    pub fn execute_with(
        &mut self,
        issues: &IssueSet,
        plan: &MutationPlan,
        observer: impl FnMut(&BulkEditOutcome),
    ) -> Result<BulkEditReport, BulkError> {
        let resolved = self.prepare(plan)?;
        Ok(self.apply_with(issues, &resolved, observer))
    }

    /// Edit one issue: replacements first, then additions, then removals
    ///
    /// Every edit that lands is pushed to `changed` before the next call, so
    /// on error it still lists what was modified.
    fn edit_issue(
        &self,
        issue: IssueNumber,
        plan: &ResolvedPlan,
        changed: &mut Vec<FieldChange>,
    ) -> Result<(), ApiError> {
        let number = issue.get();

        let patch = IssuePatch {
            labels: plan.set_labels.as_deref().map(names),
            assignees: plan.assignees.clone(),
            milestone: match plan.milestone {
                MilestoneInstruction::Unchanged => None,
                MilestoneInstruction::Set { number: m, .. } => Some(Some(m)),
                MilestoneInstruction::Clear => Some(None),
            },
            state: plan.state,
        };
        if !patch.is_empty() {
            issues::patch_issue(self.transport, &self.scope, number, &patch)?;
            if let Some(labels) = patch.labels {
                changed.push(FieldChange::LabelsSet(labels));
            }
            if let Some(assignees) = patch.assignees {
                changed.push(FieldChange::AssigneesSet(assignees));
            }
            match patch.milestone {
                Some(Some(n)) => changed.push(FieldChange::MilestoneSet(n)),
                Some(None) => changed.push(FieldChange::MilestoneCleared),
                None => {}
            }
            if let Some(state) = patch.state {
                changed.push(FieldChange::StateSet(state));
            }
        }

        if !plan.add_labels.is_empty() {
            let added = names(&plan.add_labels);
            issues::add_labels(self.transport, &self.scope, number, &added)?;
            changed.push(FieldChange::LabelsAdded(added));
        }

        let mut removed = Vec::new();
        for label in &plan.remove_labels {
            if let Err(e) = issues::remove_label(self.transport, &self.scope, number, &label.name) {
                if !removed.is_empty() {
                    changed.push(FieldChange::LabelsRemoved(removed));
                }
                return Err(e);
            }
            removed.push(label.name.clone());
        }
        if !removed.is_empty() {
            changed.push(FieldChange::LabelsRemoved(removed));
        }

        info!(%issue, "issue updated");
        Ok(())
    }
}

fn names(labels: &[ResolvedLabel]) -> Vec<String> {
    labels.iter().map(|l| l.name.clone()).collect()
}
