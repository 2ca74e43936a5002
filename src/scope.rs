//! Repository scope: the `(owner, repo)` pair every remote call targets

use std::fmt;
use std::process::Command;

use serde::Serialize;
use thiserror::Error;

/// Errors raised while determining which repository to operate on
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScopeError {
    /// The value is not of the form `owner/repo`
    #[error("Malformed repository '{0}': expected OWNER/REPO")]
    Malformed(String),

    /// An owner or repository name contains characters GitHub does not allow
    #[error("Invalid {part} name '{value}'")]
    InvalidName { part: &'static str, value: String },

    /// No repository was given and none could be inferred
    #[error("No repository specified. Use --repo OWNER/REPO or set default_repo")]
    Missing,
}

/// A validated `(owner, repo)` pair
///
/// Fields are private so a `Scope` is always well-formed once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Scope {
    owner: String,
    repo: String,
}

impl Scope {
    /// Build a scope from its parts
    ///
    /// # Errors
    /// Returns `ScopeError::InvalidName` if either part is empty or contains
    /// characters outside `[A-Za-z0-9._-]`.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self, ScopeError> {
        let owner = owner.into();
        let repo = repo.into();
        validate_part("owner", &owner)?;
        validate_part("repository", &repo)?;
        Ok(Self { owner, repo })
    }

    /// Parse `owner/repo`
    ///
    /// # Errors
    /// Returns `ScopeError::Malformed` unless the input has exactly one `/`
    /// separating two valid names.
    pub fn parse(raw: &str) -> Result<Self, ScopeError> {
        let raw = raw.trim();
        match raw.split_once('/') {
            Some((owner, repo)) if !repo.contains('/') => Self::new(owner, repo),
            _ => Err(ScopeError::Malformed(raw.to_string())),
        }
    }

    /// Infer the scope from the `origin` remote of the current git checkout
    ///
    /// Returns `None` outside a git repository or when `origin` does not look
    /// like a GitHub URL.
    #[must_use]
    pub fn from_git_origin() -> Option<Self> {
        let output = Command::new("git")
            .args(["remote", "get-url", "origin"])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let url = String::from_utf8(output.stdout).ok()?;
        parse_remote_url(url.trim())
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// API path prefix for this repository (`/repos/{owner}/{repo}`)
    #[must_use]
    pub fn api_path(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

fn validate_part(part: &'static str, value: &str) -> Result<(), ScopeError> {
    let valid = !value.is_empty()
        && value != "."
        && value != ".."
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(ScopeError::InvalidName {
            part,
            value: value.to_string(),
        })
    }
}

/// Extract `owner/repo` from an https, ssh or scp-style remote URL
fn parse_remote_url(url: &str) -> Option<Scope> {
    let path = if let Some(rest) = url.split_once("://").map(|(_, rest)| rest) {
        rest.split_once('/')?.1
    } else {
        // scp-like syntax: git@github.com:owner/repo.git
        url.split_once(':')?.1
    };
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut segments = path.rsplit('/');
    let repo = segments.next()?;
    let owner = segments.next()?;
    Scope::new(owner, repo).ok()
}
