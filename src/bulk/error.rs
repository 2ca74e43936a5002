//! Bulk edit error types

use thiserror::Error;

use super::cache::CollectionKind;
use crate::api::ApiError;
use crate::scope::{Scope, ScopeError};

/// Problems with the user's request, detected before any remote mutation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Empty issue range")]
    EmptyRange,

    #[error("Invalid range token '{0}': expected N or N-M")]
    InvalidToken(String),

    #[error("Inverted range '{lower}-{upper}': lower bound exceeds upper bound")]
    InvertedRange { lower: u64, upper: u64 },

    #[error("Issue numbers must be positive, got '{0}'")]
    NonPositive(String),

    #[error("Range expands to more than {max} issues")]
    TooManyTargets { max: usize },

    #[error("Setting labels cannot be combined with adding or removing labels")]
    ConflictingLabelEdits,

    #[error("Label '{0}' is both added and removed")]
    LabelAddedAndRemoved(String),

    #[error("No changes requested")]
    EmptyPlan,

    #[error("Unknown label(s) in {scope}: {}", .names.join(", "))]
    UnknownLabels { scope: Scope, names: Vec<String> },

    #[error("Unknown milestone '{title}' in {scope}")]
    UnknownMilestone { scope: Scope, title: String },
}

/// Errors that abort a bulk edit before any issue is touched
#[derive(Debug, Error)]
pub enum BulkError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ScopeError),

    /// Loading a label or milestone collection failed during resolution
    #[error("Failed to load {kind} for {scope}: {source}")]
    Fetch {
        kind: CollectionKind,
        scope: Scope,
        #[source]
        source: ApiError,
    },

    /// A session-level write (e.g. creating a label) failed
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

impl BulkError {
    /// The validation failure, if this is one
    #[must_use]
    pub const fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }
}
