//! Bulk issue editing
//!
//! The subsystem is split into focused modules:
//! - `range`: parse `17-23,25` into a bounded, sorted set of issue numbers
//! - `cache`: per-session name to ID cache for labels and milestones
//! - `resolve`: turn user tokens into resolved references via the cache
//! - `plan`: requested field edits and their resolved form
//! - `orchestrator`: validate once, then apply a plan issue by issue
//! - `preview`: per-issue before/after comparison for dry runs
//! - `report`: per-issue outcomes and the aggregate status
//!
//! Errors split into two families. Anything found before the first remote
//! mutation (bad range, inconsistent plan, unknown label or milestone, a
//! failed collection fetch) is returned as a [`BulkError`] and nothing is
//! changed remotely. Failures while mutating individual issues are captured
//! in the [`BulkEditReport`] and the batch continues. Edits are not
//! transactional: issues that were updated stay updated.

mod cache;
mod error;
mod orchestrator;
mod plan;
mod preview;
mod range;
mod report;
mod resolve;

pub use cache::{CacheState, CollectionKind, Lookup, NameMap, ReferenceCache};
pub use error::{BulkError, ValidationError};
pub use orchestrator::{BulkEditor, PREVIEW_LIMIT};
pub use plan::{
    FieldChange, MilestoneInstruction, MutationPlan, ResolvedLabel, ResolvedPlan,
    build_mutation_plan,
};
pub use preview::{IssueDiff, IssuePreview};
pub use range::{DEFAULT_MAX_TARGETS, IssueNumber, IssueSet, parse_range_spec};
pub use report::{BulkEditOutcome, BulkEditReport, ReportStatus};
pub use resolve::{ReferenceResolver, SharedCache};
