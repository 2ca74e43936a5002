//! Per-issue comparison shown by a dry run

use std::collections::BTreeSet;

use serde::Serialize;

use super::plan::ResolvedPlan;
use super::range::IssueNumber;
use crate::api::FailureCause;
use crate::api::types::{Issue, IssueState};

/// One issue as it is now and as the plan would leave it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueDiff {
    pub issue: IssueNumber,
    pub title: String,
    pub labels_before: BTreeSet<String>,
    pub labels_after: BTreeSet<String>,
    pub state_before: IssueState,
    pub state_after: IssueState,
}

impl IssueDiff {
    #[must_use]
    pub fn new(issue: IssueNumber, current: &Issue, plan: &ResolvedPlan) -> Self {
        let labels_before: BTreeSet<String> = current.labels.iter().map(|l| l.name.clone()).collect();
        Self {
            issue,
            title: current.title.clone(),
            labels_after: plan.labels_after(&labels_before),
            labels_before,
            state_before: current.state,
            state_after: plan.state.unwrap_or(current.state),
        }
    }

    /// Labels and state would stay as they are
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.labels_before == self.labels_after && self.state_before == self.state_after
    }
}

/// Dry-run line for one target issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IssuePreview {
    Found(IssueDiff),
    /// The issue could not be read; applying the plan would likely fail too
    Failed {
        issue: IssueNumber,
        cause: FailureCause,
        message: String,
    },
}

impl IssuePreview {
    #[must_use]
    pub const fn issue(&self) -> IssueNumber {
        match self {
            Self::Found(diff) => diff.issue,
            Self::Failed { issue, .. } => *issue,
        }
    }
}
