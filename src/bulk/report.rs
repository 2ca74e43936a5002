use serde::Serialize;

use super::plan::{FieldChange, ResolvedPlan};
use super::range::{IssueNumber, IssueSet};
use crate::api::FailureCause;
use crate::scope::Scope;

/// Result of editing a single issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BulkEditOutcome {
    Succeeded {
        issue: IssueNumber,
        changed: Vec<FieldChange>,
    },
    /// `changed` lists the edits that landed before the failing call
    Failed {
        issue: IssueNumber,
        cause: FailureCause,
        message: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        changed: Vec<FieldChange>,
    },
}

impl BulkEditOutcome {
    #[must_use]
    pub const fn issue(&self) -> IssueNumber {
        match self {
            Self::Succeeded { issue, .. } | Self::Failed { issue, .. } => *issue,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Fields changed remotely, including partial edits of a failed issue
    #[must_use]
    pub fn changed(&self) -> &[FieldChange] {
        match self {
            Self::Succeeded { changed, .. } | Self::Failed { changed, .. } => changed,
        }
    }
}

/// Aggregate status of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    Success,
    PartialFailure,
    Failure,
}

impl ReportStatus {
    /// Process exit code: 0 success, 2 partial failure, 1 total failure
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::PartialFailure => 2,
            Self::Failure => 1,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::PartialFailure => "partial-failure",
            Self::Failure => "failure",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a whole bulk edit
///
/// Outcomes are kept in ascending issue order. A batch with no targets
/// counts as a success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkEditReport {
    scope: Scope,
    summary: String,
    plan: ResolvedPlan,
    status: ReportStatus,
    succeeded: usize,
    failed: usize,
    outcomes: Vec<BulkEditOutcome>,
}

impl BulkEditReport {
    #[must_use]
    pub fn new(scope: Scope, plan: ResolvedPlan, mut outcomes: Vec<BulkEditOutcome>) -> Self {
        outcomes.sort_by_key(BulkEditOutcome::issue);
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let failed = outcomes.len() - succeeded;
        let status = match (succeeded, failed) {
            (_, 0) => ReportStatus::Success,
            (0, _) => ReportStatus::Failure,
            _ => ReportStatus::PartialFailure,
        };
        Self {
            scope,
            summary: plan.describe(),
            plan,
            status,
            succeeded,
            failed,
            outcomes,
        }
    }

    #[must_use]
    pub const fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Summary of the applied plan
    #[must_use]
    pub fn plan_summary(&self) -> &str {
        &self.summary
    }

    /// The resolved plan the batch applied
    #[must_use]
    pub const fn plan(&self) -> &ResolvedPlan {
        &self.plan
    }

    #[must_use]
    pub const fn status(&self) -> ReportStatus {
        self.status
    }

    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.status.exit_code()
    }

    #[must_use]
    pub const fn success_count(&self) -> usize {
        self.succeeded
    }

    #[must_use]
    pub const fn failure_count(&self) -> usize {
        self.failed
    }

    #[must_use]
    pub fn outcomes(&self) -> &[BulkEditOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = &BulkEditOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Range expression covering only the failed issues, for a retry run
    #[must_use]
    pub fn failed_range_spec(&self) -> Option<String> {
        if self.failed == 0 {
            return None;
        }
        let failed: IssueSet = self.failures().map(BulkEditOutcome::issue).collect();
        Some(failed.to_range_spec())
    }
}
