//! Per-session name to ID cache for labels and milestones
//!
//! Each `(scope, collection)` pair moves through three states:
//!
//! - **Absent**: never fetched in this session
//! - **Populated**: the full collection was fetched and indexed by name
//! - **Stale**: invalidated after a local write; the next access refetches
//!
//! A lookup that misses triggers at most one refresh fetch for that name.
//! Names that still miss after their refresh are remembered, so asking for
//! them again reports the miss without another round trip. Nothing here
//! outlives the session that owns it.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use tracing::debug;

use crate::api::{self, ApiError, Transport};
use crate::scope::Scope;

/// Display name to numeric ID, case-sensitive
pub type NameMap = BTreeMap<String, u64>;

/// The remote collections that can be resolved by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Labels, keyed by name, valued by label ID
    Labels,
    /// Milestones, keyed by title, valued by milestone number
    Milestones,
}

impl CollectionKind {
    fn fetch(self, transport: &dyn Transport, scope: &Scope) -> Result<NameMap, ApiError> {
        Ok(match self {
            Self::Labels => api::repo::list_labels(transport, scope)?
                .into_iter()
                .map(|l| (l.name, l.id))
                .collect(),
            Self::Milestones => api::repo::list_milestones(transport, scope)?
                .into_iter()
                .map(|m| (m.title, m.number))
                .collect(),
        })
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Labels => "labels",
            Self::Milestones => "milestones",
        })
    }
}

/// Observable state of one cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheState {
    #[default]
    Absent,
    Populated,
    Stale,
}

/// Result of looking up several names at once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lookup {
    /// Names that resolved, with their IDs, in input order
    pub found: Vec<(String, u64)>,
    /// Names that did not resolve, in input order
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    scope: Scope,
    kind: CollectionKind,
}

#[derive(Debug, Default)]
struct Entry {
    state: CacheState,
    names: NameMap,
    /// Names already refreshed for since the last population or invalidation
    refreshed_misses: HashSet<String>,
}

/// Session-scoped reference cache
///
/// The cache holds no connection of its own; every call that may fetch takes
/// the transport to fetch with.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    entries: HashMap<CacheKey, Entry>,
    fetches: usize,
}

impl ReferenceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the mapping for a collection, fetching it if absent or stale
    ///
    /// # Errors
    /// Propagates the error of the collection fetch; the entry keeps its
    /// previous state in that case.
    pub fn get_or_fetch(
        &mut self,
        transport: &dyn Transport,
        scope: &Scope,
        kind: CollectionKind,
    ) -> Result<&NameMap, ApiError> {
        let entry = self.entries.entry(CacheKey::new(scope, kind)).or_default();
        if entry.state != CacheState::Populated {
            let names = kind.fetch(transport, scope)?;
            self.fetches += 1;
            debug!(%scope, %kind, count = names.len(), "collection fetched");
            entry.names = names;
            entry.state = CacheState::Populated;
            entry.refreshed_misses.clear();
        }
        Ok(&entry.names)
    }

    /// Re-check a name that missed, refreshing the collection at most once
    ///
    /// # Errors
    /// Propagates the error of any fetch performed.
    pub fn resolve_miss(
        &mut self,
        transport: &dyn Transport,
        scope: &Scope,
        kind: CollectionKind,
        name: &str,
    ) -> Result<Option<u64>, ApiError> {
        if let Some(id) = self.get_or_fetch(transport, scope, kind)?.get(name).copied() {
            return Ok(Some(id));
        }
        self.refresh_for(transport, scope, kind, &[name])?;
        Ok(self.get_or_fetch(transport, scope, kind)?.get(name).copied())
    }

    /// Resolve several names, sharing a single refresh between their misses
    ///
    /// # Errors
    /// Propagates the error of any fetch performed.
    pub fn lookup_many(
        &mut self,
        transport: &dyn Transport,
        scope: &Scope,
        kind: CollectionKind,
        names: &[&str],
    ) -> Result<Lookup, ApiError> {
        let lookup = partition(self.get_or_fetch(transport, scope, kind)?, names);
        if lookup.missing.is_empty() {
            return Ok(lookup);
        }
        let missing: Vec<&str> = lookup.missing.iter().map(String::as_str).collect();
        self.refresh_for(transport, scope, kind, &missing)?;
        Ok(partition(self.get_or_fetch(transport, scope, kind)?, names))
    }

    /// Mark a collection stale so the next access refetches it
    pub fn invalidate(&mut self, scope: &Scope, kind: CollectionKind) {
        if let Some(entry) = self.entries.get_mut(&CacheKey::new(scope, kind))
            && entry.state == CacheState::Populated
        {
            debug!(%scope, %kind, "collection invalidated");
            entry.state = CacheState::Stale;
            entry.refreshed_misses.clear();
        }
    }

    #[must_use]
    pub fn state(&self, scope: &Scope, kind: CollectionKind) -> CacheState {
        self.entries
            .get(&CacheKey::new(scope, kind))
            .map_or(CacheState::Absent, |e| e.state)
    }

    /// Number of collection fetches performed so far, refreshes included
    #[must_use]
    pub const fn fetch_count(&self) -> usize {
        self.fetches
    }

    fn refresh_for(
        &mut self,
        transport: &dyn Transport,
        scope: &Scope,
        kind: CollectionKind,
        missing: &[&str],
    ) -> Result<(), ApiError> {
        let entry = self.entries.entry(CacheKey::new(scope, kind)).or_default();
        if missing.iter().all(|name| entry.refreshed_misses.contains(*name)) {
            return Ok(());
        }
        debug!(%scope, %kind, ?missing, "refreshing after miss");
        let names = kind.fetch(transport, scope)?;
        self.fetches += 1;
        entry.names = names;
        entry.state = CacheState::Populated;
        entry
            .refreshed_misses
            .extend(missing.iter().map(|name| (*name).to_string()));
        Ok(())
    }
}

impl CacheKey {
    fn new(scope: &Scope, kind: CollectionKind) -> Self {
        Self {
            scope: scope.clone(),
            kind,
        }
    }
}

fn partition(names: &NameMap, wanted: &[&str]) -> Lookup {
    let mut lookup = Lookup::default();
    for name in wanted {
        match names.get(*name) {
            Some(id) => lookup.found.push(((*name).to_string(), *id)),
            None => lookup.missing.push((*name).to_string()),
        }
    }
    lookup
}
