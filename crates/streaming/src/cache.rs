use std::collections::BTreeMap;

use formats::BoundaryCollection;

use crate::request::LayerKey;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CacheBudget {
    pub max_bytes: usize,
}

impl CacheBudget {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    EntryTooLarge { requested: usize, max: usize },
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::EntryTooLarge { requested, max } => {
                write!(
                    f,
                    "collection too large for cache budget: requested={requested} max={max}"
                )
            }
        }
    }
}

impl std::error::Error for CacheError {}

#[derive(Debug, Clone)]
struct CacheEntry {
    collection: BoundaryCollection,
    bytes: usize,
    last_used_tick: u64,
    revision: Option<String>,
}

/// Decoded boundary collections keyed by ancestor key, with a byte budget.
///
/// Drilling back into an ancestor the user already visited re-loads from
/// here without a provider round trip; refetching is therefore idempotent
/// from the host's point of view.
///
/// Notes on determinism:
/// - Entries are keyed in a `BTreeMap` for stable traversal order.
/// - Eviction is LRU by `last_used_tick`, with a tie-break by key ordering.
/// - Pinning a catalog revision deterministically evicts entries cached
///   under a different revision (their id resolution may no longer hold).
#[derive(Debug)]
pub struct BoundaryCache {
    budget: CacheBudget,
    used_bytes: usize,
    tick: u64,
    revision: Option<String>,
    entries: BTreeMap<LayerKey, CacheEntry>,
}

impl BoundaryCache {
    pub fn new(budget: CacheBudget) -> Self {
        Self {
            budget,
            used_bytes: 0,
            tick: 0,
            revision: None,
            entries: BTreeMap::new(),
        }
    }

    pub fn budget(&self) -> CacheBudget {
        self.budget
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a resident collection, refreshing its LRU position.
    pub fn get(&mut self, key: &LayerKey) -> Option<&BoundaryCollection> {
        self.tick += 1;
        let tick = self.tick;
        let entry = self.entries.get_mut(key)?;
        entry.last_used_tick = tick;
        Some(&entry.collection)
    }

    /// Inserts a collection, evicting LRU entries to stay within budget.
    ///
    /// Returns the evicted keys. A collection larger than the whole budget
    /// is refused; the caller simply skips caching it.
    pub fn insert(
        &mut self,
        key: LayerKey,
        collection: BoundaryCollection,
    ) -> Result<Vec<LayerKey>, CacheError> {
        let bytes = collection.approx_size_bytes();
        if bytes > self.budget.max_bytes {
            return Err(CacheError::EntryTooLarge {
                requested: bytes,
                max: self.budget.max_bytes,
            });
        }

        self.tick += 1;
        if let Some(old) = self.entries.remove(&key) {
            self.used_bytes = self.used_bytes.saturating_sub(old.bytes);
        }
        self.entries.insert(
            key.clone(),
            CacheEntry {
                collection,
                bytes,
                last_used_tick: self.tick,
                revision: self.revision.clone(),
            },
        );
        self.used_bytes += bytes;

        let mut evicted = Vec::new();
        while self.used_bytes > self.budget.max_bytes {
            let candidate = self
                .entries
                .iter()
                .filter(|(k, _)| **k != key)
                .min_by(|(ka, ea), (kb, eb)| {
                    ea.last_used_tick
                        .cmp(&eb.last_used_tick)
                        .then_with(|| ka.cmp(kb))
                })
                .map(|(k, _)| k.clone());
            let Some(victim) = candidate else {
                break;
            };
            self.remove(&victim);
            evicted.push(victim);
        }
        Ok(evicted)
    }

    pub fn remove(&mut self, key: &LayerKey) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.used_bytes = self.used_bytes.saturating_sub(entry.bytes);
                true
            }
            None => false,
        }
    }

    /// Pins the catalog revision the cached resolutions were made under.
    ///
    /// Entries cached under a different revision are evicted and returned.
    pub fn pin_revision(&mut self, revision: impl Into<String>) -> Vec<LayerKey> {
        let revision = revision.into();
        let stale: Vec<LayerKey> = self
            .entries
            .iter()
            .filter(|(_, e)| e.revision.as_deref() != Some(revision.as_str()))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &stale {
            self.remove(key);
        }
        self.revision = Some(revision);
        stale
    }

    pub fn pinned_revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }
}
