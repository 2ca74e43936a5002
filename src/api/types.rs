//! Typed payloads for the handful of REST resources ghx reads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A repository milestone
///
/// Issues reference milestones by `number`, not by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Milestone {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub due_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub open_issues: u64,
    #[serde(default)]
    pub closed_issues: u64,
}

/// Open or closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
}

impl IssueState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parts of an issue a dry run compares against
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: IssueState,
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Body for `POST /repos/{owner}/{repo}/labels`
#[derive(Debug, Clone, Serialize)]
pub struct NewLabel<'a> {
    pub name: &'a str,
    pub color: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_deserialize_ignores_extra_fields() {
        let json = r#"{"id":7,"node_id":"x","url":"u","name":"bug","color":"d73a4a","default":true,"description":null}"#;
        let label: Label = serde_json::from_str(json).unwrap();
        assert_eq!(label.id, 7);
        assert_eq!(label.name, "bug");
        assert!(label.description.is_none());
    }

    #[test]
    fn test_milestone_deserialize_due_on() {
        let json = r#"{"number":3,"title":"v1.0","state":"open","due_on":"2026-11-01T07:00:00Z","open_issues":4,"closed_issues":1}"#;
        let m: Milestone = serde_json::from_str(json).unwrap();
        assert_eq!(m.number, 3);
        assert_eq!(m.title, "v1.0");
        assert_eq!(m.due_on.unwrap().to_rfc3339(), "2026-11-01T07:00:00+00:00");
    }

    #[test]
    fn test_issue_deserialize_labels_and_state() {
        let json = r#"{"number":12,"title":"Crash on start","state":"closed","labels":[{"id":1,"name":"bug","color":"d73a4a"}],"assignees":[]}"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.number, 12);
        assert_eq!(issue.state, IssueState::Closed);
        assert_eq!(issue.labels[0].name, "bug");

        let bare: Issue = serde_json::from_str(r#"{"number":3}"#).unwrap();
        assert_eq!(bare.state, IssueState::Open);
        assert!(bare.labels.is_empty());
    }

    #[test]
    fn test_new_label_skips_missing_description() {
        let body = serde_json::to_value(NewLabel {
            name: "triage",
            color: "ededed",
            description: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"name": "triage", "color": "ededed"}));
    }
}
