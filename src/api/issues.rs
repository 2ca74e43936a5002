//! Per-issue write endpoints

use serde_json::{Map, Value, json};

use super::types::{Issue, IssueState};
use super::{ApiError, Method, Result, Transport};
use crate::scope::Scope;

/// Message the API returns when deleting a label the issue does not carry
const LABEL_NOT_ON_ISSUE: &str = "Label does not exist";

/// Fields replaced in a single `PATCH /issues/{n}`
///
/// `None` leaves a field out of the request body. `milestone: Some(None)`
/// sends `null`, which clears the milestone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuePatch {
    pub labels: Option<Vec<String>>,
    pub assignees: Option<Vec<String>>,
    pub milestone: Option<Option<u64>>,
    pub state: Option<IssueState>,
}

impl IssuePatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.labels.is_none()
            && self.assignees.is_none()
            && self.milestone.is_none()
            && self.state.is_none()
    }

    #[must_use]
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        if let Some(labels) = &self.labels {
            body.insert("labels".into(), json!(labels));
        }
        if let Some(assignees) = &self.assignees {
            body.insert("assignees".into(), json!(assignees));
        }
        if let Some(milestone) = self.milestone {
            body.insert("milestone".into(), json!(milestone));
        }
        if let Some(state) = self.state {
            body.insert("state".into(), json!(state.as_str()));
        }
        Value::Object(body)
    }
}

fn issue_path(scope: &Scope, issue: u64) -> String {
    format!("{}/issues/{issue}", scope.api_path())
}

/// Fetch one issue
///
/// # Errors
/// Propagates transport errors; `ApiError::Decode` for an unexpected body.
pub fn get_issue(transport: &dyn Transport, scope: &Scope, issue: u64) -> Result<Issue> {
    let value = transport.request(Method::Get, &issue_path(scope, issue), None)?;
    Ok(serde_json::from_value(value)?)
}

/// Replace the fields named in `patch`
///
/// # Errors
/// Propagates transport errors.
pub fn patch_issue(transport: &dyn Transport, scope: &Scope, issue: u64, patch: &IssuePatch) -> Result<()> {
    transport.request(Method::Patch, &issue_path(scope, issue), Some(&patch.to_body()))?;
    Ok(())
}

/// Add labels to an issue, keeping the ones it already has
///
/// # Errors
/// Propagates transport errors.
pub fn add_labels(transport: &dyn Transport, scope: &Scope, issue: u64, names: &[String]) -> Result<()> {
    let body = json!({ "labels": names });
    transport.request(
        Method::Post,
        &format!("{}/labels", issue_path(scope, issue)),
        Some(&body),
    )?;
    Ok(())
}

/// Remove one label from an issue
///
/// A label the issue does not carry counts as already removed.
///
/// # Errors
/// Propagates every other transport error.
pub fn remove_label(transport: &dyn Transport, scope: &Scope, issue: u64, name: &str) -> Result<()> {
    let path = format!(
        "{}/labels/{}",
        issue_path(scope, issue),
        urlencoding::encode(name)
    );
    match transport.request(Method::Delete, &path, None) {
        Ok(_) => Ok(()),
        Err(ApiError::NotFound(message)) if message.contains(LABEL_NOT_ON_ISSUE) => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTransport;

    fn scope() -> Scope {
        Scope::parse("octo/widgets").unwrap()
    }

    #[test]
    fn test_patch_body_only_has_requested_fields() {
        let patch = IssuePatch {
            assignees: Some(vec!["octocat".into()]),
            ..IssuePatch::default()
        };
        assert_eq!(patch.to_body(), json!({"assignees": ["octocat"]}));
        assert!(IssuePatch::default().is_empty());
    }

    #[test]
    fn test_patch_body_clears_milestone_with_null() {
        let patch = IssuePatch {
            labels: Some(Vec::new()),
            milestone: Some(None),
            ..IssuePatch::default()
        };
        assert_eq!(patch.to_body(), json!({"labels": [], "milestone": null}));
    }

    #[test]
    fn test_patch_body_state() {
        let patch = IssuePatch {
            state: Some(IssueState::Closed),
            ..IssuePatch::default()
        };
        assert!(!patch.is_empty());
        assert_eq!(patch.to_body(), json!({"state": "closed"}));
    }

    #[test]
    fn test_get_issue_decodes() {
        let fake = FakeTransport::new().respond(
            Method::Get,
            "/repos/octo/widgets/issues/5",
            Ok(json!({"number": 5, "title": "Docs", "state": "open", "labels": []})),
        );
        let issue = get_issue(&fake, &scope(), 5).unwrap();
        assert_eq!(issue.title, "Docs");
        assert!(matches!(
            get_issue(&fake, &scope(), 6),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_label_encodes_name() {
        let fake = FakeTransport::new();
        remove_label(&fake, &scope(), 7, "sprint/week 1").unwrap();
        assert_eq!(
            fake.calls()[0].path,
            "/repos/octo/widgets/issues/7/labels/sprint%2Fweek%201"
        );
    }

    #[test]
    fn test_remove_absent_label_is_ok() {
        let fake = FakeTransport::new().fail(
            Method::Delete,
            "/repos/octo/widgets/issues/7/labels/bug",
            ApiError::NotFound("Label does not exist".into()),
        );
        assert!(remove_label(&fake, &scope(), 7, "bug").is_ok());
    }

    #[test]
    fn test_remove_label_on_missing_issue_fails() {
        let fake = FakeTransport::new().fail(
            Method::Delete,
            "/repos/octo/widgets/issues/7/labels/bug",
            ApiError::NotFound("Not Found".into()),
        );
        assert!(matches!(
            remove_label(&fake, &scope(), 7, "bug"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_add_labels_posts_names() {
        let fake = FakeTransport::new();
        add_labels(&fake, &scope(), 3, &["bug".into(), "docs".into()]).unwrap();
        let call = &fake.mutations()[0];
        assert_eq!(call.method, Method::Post);
        assert_eq!(call.path, "/repos/octo/widgets/issues/3/labels");
        assert_eq!(call.body, Some(json!({"labels": ["bug", "docs"]})));
    }
}
