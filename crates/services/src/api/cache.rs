//! Read-through cache for query endpoints, invalidated by tag.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

/// Resource families a cached query belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheTag {
    Auth,
    Exam,
    Question,
    Attempt,
}

#[derive(Clone, Debug)]
struct CacheEntry {
    tag: CacheTag,
    body: Value,
}

/// Invalidation count for one tag, taken before a query goes out.
///
/// A response fetched under a stamp that has since moved is stale and
/// must not be cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheStamp {
    epoch: u64,
    generation: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    generations: HashMap<CacheTag, u64>,
    // Bumped by `clear`, which covers every tag.
    epoch: u64,
}

impl CacheState {
    fn stamp(&self, tag: CacheTag) -> CacheStamp {
        CacheStamp {
            epoch: self.epoch,
            generation: self.generations.get(&tag).copied().unwrap_or(0),
        }
    }
}

/// Response bodies keyed by request path.
#[derive(Debug, Default)]
pub struct QueryCache {
    state: Mutex<CacheState>,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let guard = self.state.lock().ok()?;
        guard.entries.get(key).map(|entry| entry.body.clone())
    }

    #[must_use]
    pub fn stamp(&self, tag: CacheTag) -> Option<CacheStamp> {
        self.state.lock().ok().map(|guard| guard.stamp(tag))
    }

    pub fn insert(&self, key: impl Into<String>, tag: CacheTag, body: Value) {
        if let Ok(mut guard) = self.state.lock() {
            guard.entries.insert(key.into(), CacheEntry { tag, body });
        }
    }

    /// Insert only if `tag` has not been invalidated since `stamp` was taken.
    pub fn insert_fresh(
        &self,
        key: impl Into<String>,
        tag: CacheTag,
        stamp: CacheStamp,
        body: Value,
    ) -> bool {
        let Ok(mut guard) = self.state.lock() else {
            return false;
        };
        if guard.stamp(tag) != stamp {
            return false;
        }
        guard.entries.insert(key.into(), CacheEntry { tag, body });
        true
    }

    /// Drop every entry carrying one of `tags`; returns how many were dropped.
    pub fn invalidate(&self, tags: &[CacheTag]) -> usize {
        let Ok(mut guard) = self.state.lock() else {
            return 0;
        };
        for tag in tags {
            *guard.generations.entry(*tag).or_default() += 1;
        }
        let before = guard.entries.len();
        guard.entries.retain(|_, entry| !tags.contains(&entry.tag));
        before - guard.entries.len()
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.state.lock() {
            guard.entries.clear();
            guard.epoch += 1;
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.state
            .lock()
            .is_ok_and(|guard| guard.entries.contains_key(key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().map_or(0, |guard| guard.entries.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
