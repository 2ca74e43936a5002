use std::collections::BTreeSet;

use serde::Serialize;

use super::error::ValidationError;
use crate::api::types::IssueState;

/// Requested field edits, as names typed by the user
///
/// Built with [`build_mutation_plan`], which guarantees internal
/// consistency. Resolution against the repository happens later, in
/// [`BulkEditor::prepare`](super::BulkEditor::prepare).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MutationPlan {
    add_labels: BTreeSet<String>,
    remove_labels: BTreeSet<String>,
    set_labels: Option<BTreeSet<String>>,
    assignees: Option<BTreeSet<String>>,
    milestone: Option<String>,
    state: Option<IssueState>,
}

impl MutationPlan {
    /// A plan that only opens or closes issues
    #[must_use]
    pub fn state_change(state: IssueState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn add_labels(&self) -> &BTreeSet<String> {
        &self.add_labels
    }

    #[must_use]
    pub const fn remove_labels(&self) -> &BTreeSet<String> {
        &self.remove_labels
    }

    #[must_use]
    pub const fn set_labels(&self) -> Option<&BTreeSet<String>> {
        self.set_labels.as_ref()
    }

    #[must_use]
    pub const fn assignees(&self) -> Option<&BTreeSet<String>> {
        self.assignees.as_ref()
    }

    /// Raw milestone reference; `None` leaves the milestone unchanged
    #[must_use]
    pub fn milestone(&self) -> Option<&str> {
        self.milestone.as_deref()
    }

    #[must_use]
    pub const fn state(&self) -> Option<IssueState> {
        self.state
    }

    /// Check that the requested edits can be applied together
    ///
    /// # Errors
    /// - `ConflictingLabelEdits` when replacement is combined with add/remove
    /// - `LabelAddedAndRemoved` when a name appears in both add and remove
    /// - `EmptyPlan` when nothing would change
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.set_labels.is_some() && !(self.add_labels.is_empty() && self.remove_labels.is_empty()) {
            return Err(ValidationError::ConflictingLabelEdits);
        }
        if let Some(name) = self.add_labels.intersection(&self.remove_labels).next() {
            return Err(ValidationError::LabelAddedAndRemoved(name.clone()));
        }
        let empty = self.add_labels.is_empty()
            && self.remove_labels.is_empty()
            && self.set_labels.is_none()
            && self.assignees.is_none()
            && self.milestone.is_none()
            && self.state.is_none();
        if empty {
            return Err(ValidationError::EmptyPlan);
        }
        Ok(())
    }
}

/// Build and validate a plan from CLI-level inputs
///
/// Names are trimmed and blank entries dropped. `Some` with no names left
/// means "clear": `set_labels: Some(vec![])` removes every label and
/// `assignees: Some(vec![])` unassigns everyone. The milestone reference is
/// kept verbatim; an empty string or `none` clears it at resolution time.
///
/// # Errors
/// See [`MutationPlan::validate`].
pub fn build_mutation_plan(
    add_labels: Option<Vec<String>>,
    remove_labels: Option<Vec<String>>,
    set_labels: Option<Vec<String>>,
    assignees: Option<Vec<String>>,
    milestone: Option<String>,
) -> Result<MutationPlan, ValidationError> {
    let plan = MutationPlan {
        add_labels: normalize(add_labels.unwrap_or_default()),
        remove_labels: normalize(remove_labels.unwrap_or_default()),
        set_labels: set_labels.map(normalize),
        assignees: assignees.map(normalize),
        milestone: milestone.map(|m| m.trim().to_string()),
        state: None,
    };
    plan.validate()?;
    Ok(plan)
}

fn normalize(names: Vec<String>) -> BTreeSet<String> {
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

/// A label that exists in the repository
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ResolvedLabel {
    pub id: u64,
    pub name: String,
}

/// What to do with an issue's milestone
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum MilestoneInstruction {
    #[default]
    Unchanged,
    /// Title is known when the milestone was looked up by name
    Set { number: u64, title: Option<String> },
    Clear,
}

/// A plan whose names have all been checked against the repository
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResolvedPlan {
    pub add_labels: Vec<ResolvedLabel>,
    pub remove_labels: Vec<ResolvedLabel>,
    pub set_labels: Option<Vec<ResolvedLabel>>,
    pub assignees: Option<Vec<String>>,
    pub milestone: MilestoneInstruction,
    pub state: Option<IssueState>,
}

impl ResolvedPlan {
    /// Labels an issue carrying `current` would have once the plan is applied
    #[must_use]
    pub fn labels_after(&self, current: &BTreeSet<String>) -> BTreeSet<String> {
        let mut after = match &self.set_labels {
            Some(labels) => labels.iter().map(|l| l.name.clone()).collect(),
            None => current.clone(),
        };
        after.extend(self.add_labels.iter().map(|l| l.name.clone()));
        for label in &self.remove_labels {
            after.remove(&label.name);
        }
        after
    }

    /// Human-readable summary, e.g. `add labels: bug; clear milestone`
    ///
    /// Parts appear in a fixed order so identical plans describe identically.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        match &self.set_labels {
            Some(labels) if labels.is_empty() => parts.push("clear labels".to_string()),
            Some(labels) => parts.push(format!("set labels: {}", join_names(labels))),
            None => {}
        }
        if !self.add_labels.is_empty() {
            parts.push(format!("add labels: {}", join_names(&self.add_labels)));
        }
        if !self.remove_labels.is_empty() {
            parts.push(format!("remove labels: {}", join_names(&self.remove_labels)));
        }
        match &self.assignees {
            Some(users) if users.is_empty() => parts.push("clear assignees".to_string()),
            Some(users) => parts.push(format!("set assignees: {}", users.join(", "))),
            None => {}
        }
        match &self.milestone {
            MilestoneInstruction::Unchanged => {}
            MilestoneInstruction::Set {
                number,
                title: Some(title),
            } => parts.push(format!("set milestone: {title} (#{number})")),
            MilestoneInstruction::Set { number, title: None } => {
                parts.push(format!("set milestone: #{number}"));
            }
            MilestoneInstruction::Clear => parts.push("clear milestone".to_string()),
        }
        match self.state {
            Some(IssueState::Closed) => parts.push("close".to_string()),
            Some(IssueState::Open) => parts.push("reopen".to_string()),
            None => {}
        }
        parts.join("; ")
    }
}

fn join_names(labels: &[ResolvedLabel]) -> String {
    labels
        .iter()
        .map(|l| l.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A field that was changed on one issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "field", content = "value", rename_all = "kebab-case")]
pub enum FieldChange {
    LabelsSet(Vec<String>),
    LabelsAdded(Vec<String>),
    LabelsRemoved(Vec<String>),
    AssigneesSet(Vec<String>),
    MilestoneSet(u64),
    MilestoneCleared,
    StateSet(IssueState),
}

impl std::fmt::Display for FieldChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LabelsSet(names) => write!(f, "labels = [{}]", names.join(", ")),
            Self::LabelsAdded(names) => write!(f, "+[{}]", names.join(", ")),
            Self::LabelsRemoved(names) => write!(f, "-[{}]", names.join(", ")),
            Self::AssigneesSet(users) => write!(f, "assignees = [{}]", users.join(", ")),
            Self::MilestoneSet(number) => write!(f, "milestone = #{number}"),
            Self::MilestoneCleared => f.write_str("milestone cleared"),
            Self::StateSet(state) => write!(f, "state = {state}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Option<Vec<String>> {
        Some(list.iter().map(|s| (*s).to_string()).collect())
    }

    #[test]
    fn test_set_and_add_conflict() {
        let err = build_mutation_plan(names(&["a"]), None, names(&["b"]), None, None).unwrap_err();
        assert_eq!(err, ValidationError::ConflictingLabelEdits);
    }

    #[test]
    fn test_set_and_remove_conflict() {
        let err = build_mutation_plan(None, names(&["a"]), names(&["b"]), None, None).unwrap_err();
        assert_eq!(err, ValidationError::ConflictingLabelEdits);
    }

    #[test]
    fn test_add_and_remove_same_label() {
        let err = build_mutation_plan(names(&["bug", "x"]), names(&["x"]), None, None, None)
            .unwrap_err();
        assert_eq!(err, ValidationError::LabelAddedAndRemoved("x".into()));
    }

    #[test]
    fn test_add_and_remove_different_labels_ok() {
        let plan = build_mutation_plan(names(&["a"]), names(&["b"]), None, None, None).unwrap();
        assert!(plan.add_labels().contains("a"));
        assert!(plan.remove_labels().contains("b"));
    }

    #[test]
    fn test_empty_plan() {
        assert_eq!(
            build_mutation_plan(None, None, None, None, None).unwrap_err(),
            ValidationError::EmptyPlan
        );
        // Blank names only: still nothing to do
        assert_eq!(
            build_mutation_plan(names(&[" ", ""]), None, None, None, None).unwrap_err(),
            ValidationError::EmptyPlan
        );
    }

    #[test]
    fn test_clear_requests_are_not_empty() {
        let plan = build_mutation_plan(None, None, Some(vec![]), None, None).unwrap();
        assert!(plan.set_labels().unwrap().is_empty());
        let plan = build_mutation_plan(None, None, None, Some(vec![]), None).unwrap();
        assert!(plan.assignees().unwrap().is_empty());
        let plan = build_mutation_plan(None, None, None, None, Some(String::new())).unwrap();
        assert_eq!(plan.milestone(), Some(""));
    }

    #[test]
    fn test_names_trimmed_and_deduplicated() {
        let plan =
            build_mutation_plan(names(&[" bug", "bug ", "docs"]), None, None, None, None).unwrap();
        assert_eq!(
            plan.add_labels().iter().cloned().collect::<Vec<_>>(),
            vec!["bug".to_string(), "docs".to_string()]
        );
    }

    #[test]
    fn test_describe_order_and_wording() {
        let plan = ResolvedPlan {
            add_labels: vec![ResolvedLabel {
                id: 1,
                name: "sprint/week1".into(),
            }],
            remove_labels: vec![ResolvedLabel {
                id: 2,
                name: "triage".into(),
            }],
            set_labels: None,
            assignees: Some(vec!["octocat".into()]),
            milestone: MilestoneInstruction::Set {
                number: 3,
                title: Some("v1.0".into()),
            },
            state: None,
        };
        assert_eq!(
            plan.describe(),
            "add labels: sprint/week1; remove labels: triage; set assignees: octocat; set milestone: v1.0 (#3)"
        );
    }

    #[test]
    fn test_describe_clears() {
        let plan = ResolvedPlan {
            set_labels: Some(vec![]),
            assignees: Some(vec![]),
            milestone: MilestoneInstruction::Clear,
            ..ResolvedPlan::default()
        };
        assert_eq!(
            plan.describe(),
            "clear labels; clear assignees; clear milestone"
        );
    }

    #[test]
    fn test_describe_numeric_milestone() {
        let plan = ResolvedPlan {
            milestone: MilestoneInstruction::Set {
                number: 12,
                title: None,
            },
            ..ResolvedPlan::default()
        };
        assert_eq!(plan.describe(), "set milestone: #12");
    }

    #[test]
    fn test_field_change_display() {
        assert_eq!(
            FieldChange::LabelsAdded(vec!["a".into(), "b".into()]).to_string(),
            "+[a, b]"
        );
        assert_eq!(FieldChange::MilestoneSet(4).to_string(), "milestone = #4");
    }

    #[test]
    fn test_state_change_plan() {
        let plan = MutationPlan::state_change(IssueState::Closed);
        assert!(plan.validate().is_ok());
        assert_eq!(plan.state(), Some(IssueState::Closed));
        assert!(plan.add_labels().is_empty());

        let resolved = ResolvedPlan {
            state: Some(IssueState::Open),
            ..ResolvedPlan::default()
        };
        assert_eq!(resolved.describe(), "reopen");
        assert_eq!(FieldChange::StateSet(IssueState::Closed).to_string(), "state = closed");
    }

    #[test]
    fn test_labels_after() {
        let label = |id, name: &str| ResolvedLabel {
            id,
            name: name.into(),
        };
        let current: BTreeSet<String> = ["bug".to_string(), "triage".to_string()].into();

        let plan = ResolvedPlan {
            add_labels: vec![label(1, "docs")],
            remove_labels: vec![label(2, "triage"), label(3, "absent")],
            ..ResolvedPlan::default()
        };
        assert_eq!(
            plan.labels_after(&current),
            BTreeSet::from(["bug".to_string(), "docs".to_string()])
        );

        let replace = ResolvedPlan {
            set_labels: Some(vec![label(4, "wontfix")]),
            ..ResolvedPlan::default()
        };
        assert_eq!(
            replace.labels_after(&current),
            BTreeSet::from(["wontfix".to_string()])
        );
        assert_eq!(ResolvedPlan::default().labels_after(&current), current);
    }
}
