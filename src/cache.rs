//! Cache whose entries expire after a fixed number of lookups.
//!
//! Each entry carries a remaining-uses counter. A hit decrements it; a hit on
//! an exhausted entry evicts it and fetches a fresh value.

use std::collections::HashMap;
use std::hash::Hash;

/// Cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Cached hits served before an entry is refetched. `0` disables caching.
    pub ttl: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl: 5 }
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    remaining_uses: u32,
}

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// Served from cache; `remaining` hits are left after this one.
    Cached { value: V, remaining: u32 },
    /// Fetched from the source and stored with `ttl` uses.
    Fresh { value: V, ttl: u32 },
}

impl<V> Lookup<V> {
    pub fn value(&self) -> &V {
        match self {
            Lookup::Cached { value, .. } | Lookup::Fresh { value, .. } => value,
        }
    }

    pub fn into_value(self) -> V {
        match self {
            Lookup::Cached { value, .. } | Lookup::Fresh { value, .. } => value,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, Lookup::Cached { .. })
    }
}

#[derive(Debug, Clone)]
pub struct UseCountedCache<K, V> {
    config: CacheConfig,
    entries: HashMap<K, Entry<V>>,
}

impl<K, V> UseCountedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Looks up `key` using the configured ttl, calling `fetch` on a miss.
    pub fn get_or_fetch(&mut self, key: K, fetch: impl FnOnce(&K) -> V) -> Lookup<V> {
        let ttl = self.config.ttl;
        self.get_or_fetch_with_ttl(key, ttl, fetch)
    }

    /// Like [`get_or_fetch`](Self::get_or_fetch) with a per-call ttl for a
    /// freshly stored entry. Existing entries keep their own counter.
    pub fn get_or_fetch_with_ttl(
        &mut self,
        key: K,
        ttl: u32,
        fetch: impl FnOnce(&K) -> V,
    ) -> Lookup<V> {
        if let Some(entry) = self.entries.get_mut(&key) {
            if entry.remaining_uses > 0 {
                entry.remaining_uses -= 1;
                return Lookup::Cached {
                    value: entry.value.clone(),
                    remaining: entry.remaining_uses,
                };
            }

            log::debug!("Cache entry exhausted, evicting");
            self.entries.remove(&key);
        }

        let value = fetch(&key);
        if ttl > 0 {
            self.entries.insert(
                key,
                Entry {
                    value: value.clone(),
                    remaining_uses: ttl,
                },
            );
        }

        Lookup::Fresh { value, ttl }
    }

    /// Remaining cached hits for `key`, if present.
    pub fn remaining(&self, key: &K) -> Option<u32> {
        self.entries.get(key).map(|e| e.remaining_uses)
    }

    pub fn invalidate(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for UseCountedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
