//! Process-lifetime cache of resolved accessor plans.
//!
//! Entries are keyed by record `TypeId`, then by raw path string, and are
//! never evicted: the key space is bounded by the (type, path) pairs a
//! program actually uses. Lookups borrow the path; only an insert allocates.
//!
//! # Concurrency
//!
//! Lookups and inserts go through sharded [`DashMap`]s, taking a shard read
//! or write lock. Path resolution runs outside any lock; only the final
//! insert is atomic, and it never overwrites. When two callers miss on the
//! same key concurrently, both resolve, the first insert wins, and both
//! receive the winning plan.

use std::any::TypeId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::path::AccessorPlan;

static GLOBAL: Lazy<AccessorCache> = Lazy::new(AccessorCache::new);

type PathPlans = DashMap<Box<str>, Arc<AccessorPlan>>;

/// Hit and miss counters of an [`AccessorCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Concurrent map from (record type, path) to resolved plans.
#[derive(Debug, Default)]
pub struct AccessorCache {
    entries: DashMap<TypeId, PathPlans>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AccessorCache {
    pub fn new() -> Self {
        AccessorCache::default()
    }

    /// The process-wide cache, created on first use and never torn down.
    pub fn global() -> &'static AccessorCache {
        &GLOBAL
    }

    /// Looks up a cached plan, counting the hit or miss.
    pub fn get(&self, type_id: TypeId, path: &str) -> Option<Arc<AccessorPlan>> {
        let found = self.entries.get(&type_id).and_then(|paths| {
            let entry = paths.get(path)?;
            Some(Arc::clone(entry.value()))
        });
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Inserts `plan` unless the key is already present, returning whichever
    /// plan ends up cached.
    pub fn insert_if_absent(
        &self,
        type_id: TypeId,
        path: &str,
        plan: AccessorPlan,
    ) -> Arc<AccessorPlan> {
        let paths = self.entries.entry(type_id).or_default();
        let mut inserted = false;
        let cached = Arc::clone(
            paths
                .entry(Box::from(path))
                .or_insert_with(|| {
                    inserted = true;
                    Arc::new(plan)
                })
                .value(),
        );
        drop(paths);

        if inserted {
            tracing::debug!(record = cached.root().name(), path, "cached accessor plan");
        } else {
            tracing::trace!(path, "accessor plan already cached, discarding duplicate");
        }
        cached
    }

    pub fn contains(&self, type_id: TypeId, path: &str) -> bool {
        self.entries
            .get(&type_id)
            .is_some_and(|paths| paths.contains_key(path))
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(|paths| paths.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|paths| paths.is_empty())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
