use std::cell::{Ref, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use tracing::{debug, info};

use super::cache::{CollectionKind, ReferenceCache};
use super::error::{BulkError, ValidationError};
use super::plan::{MilestoneInstruction, ResolvedLabel};
use crate::api::types::{Label, NewLabel};
use crate::api::{self, Transport};
use crate::scope::Scope;

/// Milestone references that mean "remove the milestone"
const CLEAR_SENTINELS: &[&str] = &["", "none"];

/// A reference cache shared by every resolver of one session
pub type SharedCache = Rc<RefCell<ReferenceCache>>;

/// Turns user-facing label and milestone references into IDs
///
/// Resolvers built from the same [`SharedCache`] see each other's fetches
/// and invalidations.
pub struct ReferenceResolver<'a> {
    transport: &'a dyn Transport,
    cache: SharedCache,
}

impl<'a> ReferenceResolver<'a> {
    /// A resolver with a cache of its own
    #[must_use]
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self::with_cache(transport, SharedCache::default())
    }

    #[must_use]
    pub fn with_cache(transport: &'a dyn Transport, cache: SharedCache) -> Self {
        Self { transport, cache }
    }

    /// The underlying cache, for inspection
    #[must_use]
    pub fn cache(&self) -> Ref<'_, ReferenceCache> {
        self.cache.borrow()
    }

    /// Resolve a set of label names, all or nothing
    ///
    /// Misses are refreshed once as a group. If any name is still unknown
    /// the whole call fails and the error lists every missing name.
    ///
    /// # Errors
    /// `ValidationError::UnknownLabels`, or `BulkError::Fetch` if the label
    /// collection cannot be loaded.
    pub fn resolve_label_names(
        &mut self,
        scope: &Scope,
        names: &BTreeSet<String>,
    ) -> Result<Vec<ResolvedLabel>, BulkError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let wanted: Vec<&str> = names.iter().map(String::as_str).collect();
        let lookup = self
            .cache
            .borrow_mut()
            .lookup_many(self.transport, scope, CollectionKind::Labels, &wanted)
            .map_err(|source| BulkError::Fetch {
                kind: CollectionKind::Labels,
                scope: scope.clone(),
                source,
            })?;

        if !lookup.missing.is_empty() {
            return Err(ValidationError::UnknownLabels {
                scope: scope.clone(),
                names: lookup.missing,
            }
            .into());
        }
        debug!(%scope, count = lookup.found.len(), "labels resolved");
        Ok(lookup
            .found
            .into_iter()
            .map(|(name, id)| ResolvedLabel { id, name })
            .collect())
    }

    /// Classify and resolve a milestone reference
    ///
    /// - `""` or `none` (any case): clear the milestone
    /// - a positive integer: used as the milestone number without a lookup;
    ///   a wrong number surfaces per issue when the edit is applied
    /// - anything else: looked up by title, with one refresh on a miss
    ///
    /// # Errors
    /// `ValidationError::UnknownMilestone`, or `BulkError::Fetch` if the
    /// milestone collection cannot be loaded.
    pub fn resolve_milestone_ref(
        &mut self,
        scope: &Scope,
        raw: &str,
    ) -> Result<MilestoneInstruction, BulkError> {
        let raw = raw.trim();
        if CLEAR_SENTINELS.iter().any(|s| s.eq_ignore_ascii_case(raw)) {
            return Ok(MilestoneInstruction::Clear);
        }
        if let Ok(number) = raw.parse::<u64>()
            && number > 0
        {
            return Ok(MilestoneInstruction::Set { number, title: None });
        }

        let found = self
            .cache
            .borrow_mut()
            .resolve_miss(self.transport, scope, CollectionKind::Milestones, raw)
            .map_err(|source| BulkError::Fetch {
                kind: CollectionKind::Milestones,
                scope: scope.clone(),
                source,
            })?;
        match found {
            Some(number) => Ok(MilestoneInstruction::Set {
                number,
                title: Some(raw.to_string()),
            }),
            None => Err(ValidationError::UnknownMilestone {
                scope: scope.clone(),
                title: raw.to_string(),
            }
            .into()),
        }
    }

    /// Create a label and make it visible to later lookups in this session
    ///
    /// # Errors
    /// `BulkError::Api` if the remote call fails.
    pub fn create_label(
        &mut self,
        scope: &Scope,
        name: &str,
        color: &str,
        description: Option<&str>,
    ) -> Result<Label, BulkError> {
        let label = api::repo::create_label(
            self.transport,
            scope,
            &NewLabel {
                name,
                color,
                description,
            },
        )?;
        self.cache.borrow_mut().invalidate(scope, CollectionKind::Labels);
        info!(%scope, name = %label.name, id = label.id, "label created");
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, Method};
    use crate::testing::FakeTransport;
    use serde_json::json;

    fn scope() -> Scope {
        Scope::parse("octo/widgets").unwrap()
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_resolve_label_names_all_found() {
        let fake = FakeTransport::new().with_labels(&scope(), &[("bug", 1), ("docs", 2)]);
        let mut resolver = ReferenceResolver::new(&fake);
        let labels = resolver
            .resolve_label_names(&scope(), &set(&["docs", "bug"]))
            .unwrap();
        assert_eq!(
            labels,
            vec![
                ResolvedLabel {
                    id: 1,
                    name: "bug".into()
                },
                ResolvedLabel {
                    id: 2,
                    name: "docs".into()
                },
            ]
        );
    }

    #[test]
    fn test_resolve_label_names_reports_all_missing() {
        let fake = FakeTransport::new().with_labels(&scope(), &[("bug", 1)]);
        let mut resolver = ReferenceResolver::new(&fake);
        let err = resolver
            .resolve_label_names(&scope(), &set(&["bug", "zeta", "alpha"]))
            .unwrap_err();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::UnknownLabels {
                scope: scope(),
                names: vec!["alpha".into(), "zeta".into()],
            })
        );
    }

    #[test]
    fn test_repeated_resolution_fetches_once() {
        let fake = FakeTransport::new().with_labels(&scope(), &[("bug", 1), ("docs", 2)]);
        let mut resolver = ReferenceResolver::new(&fake);
        resolver.resolve_label_names(&scope(), &set(&["bug"])).unwrap();
        resolver.resolve_label_names(&scope(), &set(&["docs"])).unwrap();
        assert_eq!(fake.get_count("/repos/octo/widgets/labels"), 1);
    }

    #[test]
    fn test_repeated_miss_refreshes_once_per_name() {
        let fake = FakeTransport::new().with_labels(&scope(), &[("bug", 1)]);
        let mut resolver = ReferenceResolver::new(&fake);
        assert!(resolver.resolve_label_names(&scope(), &set(&["typo"])).is_err());
        assert!(resolver.resolve_label_names(&scope(), &set(&["typo"])).is_err());
        // One population plus one refresh for the single distinct miss
        assert_eq!(fake.get_count("/repos/octo/widgets/labels"), 2);
    }

    #[test]
    fn test_label_fetch_failure_is_fetch_error() {
        let fake = FakeTransport::new().fail(
            Method::Get,
            "/repos/octo/widgets/labels",
            ApiError::PermissionDenied("Resource not accessible".into()),
        );
        let mut resolver = ReferenceResolver::new(&fake);
        let err = resolver
            .resolve_label_names(&scope(), &set(&["bug"]))
            .unwrap_err();
        assert!(matches!(
            err,
            BulkError::Fetch {
                kind: CollectionKind::Labels,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_label_set_needs_no_fetch() {
        let fake = FakeTransport::new();
        let mut resolver = ReferenceResolver::new(&fake);
        assert!(resolver
            .resolve_label_names(&scope(), &BTreeSet::new())
            .unwrap()
            .is_empty());
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn test_milestone_clear_sentinels() {
        let fake = FakeTransport::new();
        let mut resolver = ReferenceResolver::new(&fake);
        for raw in ["", "  ", "none", "None", "NONE"] {
            assert_eq!(
                resolver.resolve_milestone_ref(&scope(), raw).unwrap(),
                MilestoneInstruction::Clear,
                "{raw:?}"
            );
        }
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn test_milestone_numeric_is_trusted() {
        let fake = FakeTransport::new();
        let mut resolver = ReferenceResolver::new(&fake);
        assert_eq!(
            resolver.resolve_milestone_ref(&scope(), "42").unwrap(),
            MilestoneInstruction::Set {
                number: 42,
                title: None
            }
        );
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn test_milestone_title_lookup() {
        let fake = FakeTransport::new().with_milestones(&scope(), &[("v1.0", 3)]);
        let mut resolver = ReferenceResolver::new(&fake);
        assert_eq!(
            resolver.resolve_milestone_ref(&scope(), "v1.0").unwrap(),
            MilestoneInstruction::Set {
                number: 3,
                title: Some("v1.0".into())
            }
        );
    }

    #[test]
    fn test_milestone_zero_is_treated_as_title() {
        let fake = FakeTransport::new().with_milestones(&scope(), &[("v1.0", 3)]);
        let mut resolver = ReferenceResolver::new(&fake);
        let err = resolver.resolve_milestone_ref(&scope(), "0").unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::UnknownMilestone { .. })
        ));
    }

    #[test]
    fn test_milestone_unknown_after_refresh() {
        let fake = FakeTransport::new().with_milestones(&scope(), &[("v1.0", 3)]);
        let mut resolver = ReferenceResolver::new(&fake);
        let err = resolver.resolve_milestone_ref(&scope(), "v9").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Unknown milestone 'v9' in octo/widgets"
        );
        assert_eq!(fake.get_count("/repos/octo/widgets/milestones"), 2);
    }

    #[test]
    fn test_create_label_invalidates_cache() {
        let fake = FakeTransport::new()
            .with_labels(&scope(), &[("bug", 1)])
            .then_labels(&scope(), &[("bug", 1), ("triage", 8)])
            .respond(
                Method::Post,
                "/repos/octo/widgets/labels",
                Ok(json!({"id": 8, "name": "triage", "color": "ededed"})),
            );
        let mut resolver = ReferenceResolver::new(&fake);
        resolver.resolve_label_names(&scope(), &set(&["bug"])).unwrap();

        let label = resolver
            .create_label(&scope(), "triage", "ededed", None)
            .unwrap();
        assert_eq!(label.id, 8);

        let labels = resolver
            .resolve_label_names(&scope(), &set(&["triage"]))
            .unwrap();
        assert_eq!(labels[0].id, 8);
        // Initial fetch, then one refetch after invalidation; no miss refresh
        assert_eq!(fake.get_count("/repos/octo/widgets/labels"), 2);
    }

    #[test]
    fn test_resolvers_sharing_a_cache_fetch_once() {
        let fake = FakeTransport::new()
            .with_labels(&scope(), &[("bug", 1)])
            .then_labels(&scope(), &[("bug", 1), ("triage", 8)])
            .respond(
                Method::Post,
                "/repos/octo/widgets/labels",
                Ok(json!({"id": 8, "name": "triage", "color": "ededed"})),
            );
        let cache = SharedCache::default();

        ReferenceResolver::with_cache(&fake, Rc::clone(&cache))
            .resolve_label_names(&scope(), &set(&["bug"]))
            .unwrap();
        ReferenceResolver::with_cache(&fake, Rc::clone(&cache))
            .resolve_label_names(&scope(), &set(&["bug"]))
            .unwrap();
        assert_eq!(cache.borrow().fetch_count(), 1);

        ReferenceResolver::with_cache(&fake, Rc::clone(&cache))
            .create_label(&scope(), "triage", "ededed", None)
            .unwrap();
        assert_eq!(
            cache.borrow().state(&scope(), CollectionKind::Labels),
            crate::bulk::CacheState::Stale
        );
        let labels = ReferenceResolver::with_cache(&fake, Rc::clone(&cache))
            .resolve_label_names(&scope(), &set(&["triage"]))
            .unwrap();
        assert_eq!(labels[0].id, 8);
        assert_eq!(fake.get_count("/repos/octo/widgets/labels"), 2);
    }
}
