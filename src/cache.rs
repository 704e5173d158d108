//! In-memory byte cache shared by archives and extracted assets.
//!
//! One namespace holds two kinds of key: whole-archive buffers under
//! `{pkgkey}.tar.gz` and extracted file buffers under their archive-relative
//! path. Path parsing never produces the reserved `.tar.gz` form, so the two
//! cannot collide. Entries live for the process lifetime; there is no expiry,
//! and the cache is unbounded unless [`CacheConfig::max_entries`] is set.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use bytes::Bytes;

/// Configuration for the asset cache.
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Maximum number of cached buffers before least-recently-used entries
    /// are evicted. `None` (the default) keeps the cache unbounded.
    pub max_entries: Option<usize>,
}

struct CacheEntry {
    buffer: Bytes,
    last_accessed: Instant,
}

/// Mutex-protected map of cache key to immutable byte buffer.
///
/// Buffers are [`Bytes`], so `get` hands out cheap reference-counted views;
/// cached content is never mutated after insertion.
pub struct AssetCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    config: CacheConfig,
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl AssetCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Cache with no entry bound, the behavior the fetch-once invariant
    /// assumes.
    pub fn unbounded() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Look up a buffer by key.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let mut guard = self.entries.lock().expect("cache lock poisoned");
        guard.get_mut(key).map(|entry| {
            entry.last_accessed = Instant::now();
            entry.buffer.clone()
        })
    }

    /// Store a buffer under a key. Last write wins on collision.
    pub fn insert(&self, key: impl Into<String>, buffer: Bytes) {
        let key = key.into();
        let mut guard = self.entries.lock().expect("cache lock poisoned");

        if let Some(max) = self.config.max_entries {
            // Replacing an existing key never needs an eviction.
            if !guard.contains_key(&key) {
                while guard.len() >= max {
                    let oldest = guard
                        .iter()
                        .min_by_key(|(_, entry)| entry.last_accessed)
                        .map(|(k, _)| k.clone());

                    match oldest {
                        Some(k) => {
                            guard.remove(&k);
                        }
                        None => break,
                    }
                }
            }
        }

        guard.insert(
            key,
            CacheEntry {
                buffer,
                last_accessed: Instant::now(),
            },
        );
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().expect("cache lock poisoned").is_empty()
    }

    /// Drop every cached buffer.
    pub fn clear(&self) {
        self.entries.lock().expect("cache lock poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_miss_returns_none() {
        let cache = AssetCache::unbounded();
        assert!(cache.get("missing").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn last_write_wins() {
        let cache = AssetCache::unbounded();
        cache.insert("key", Bytes::from_static(b"first"));
        cache.insert("key", Bytes::from_static(b"second"));

        assert_eq!(cache.get("key").unwrap(), Bytes::from_static(b"second"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unbounded_cache_never_evicts() {
        let cache = AssetCache::unbounded();
        for i in 0..1000 {
            cache.insert(format!("key-{i}"), Bytes::from_static(b"x"));
        }
        assert_eq!(cache.len(), 1000);
    }

    #[test]
    fn bounded_cache_holds_at_most_max_entries() {
        let cache = AssetCache::new(CacheConfig {
            max_entries: Some(2),
        });
        cache.insert("a", Bytes::from_static(b"a"));
        cache.insert("b", Bytes::from_static(b"b"));
        cache.insert("c", Bytes::from_static(b"c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("c"));
    }

    #[test]
    fn bounded_cache_evicts_least_recently_used() {
        let cache = AssetCache::new(CacheConfig {
            max_entries: Some(2),
        });
        cache.insert("a", Bytes::from_static(b"a"));
        std::thread::sleep(std::time::Duration::from_millis(2));
        cache.insert("b", Bytes::from_static(b"b"));
        std::thread::sleep(std::time::Duration::from_millis(2));

        // Touch "a" so "b" becomes the oldest.
        cache.get("a");
        std::thread::sleep(std::time::Duration::from_millis(2));
        cache.insert("c", Bytes::from_static(b"c"));

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn replacing_a_key_does_not_evict_at_capacity() {
        let cache = AssetCache::new(CacheConfig {
            max_entries: Some(2),
        });
        cache.insert("a", Bytes::from_static(b"a"));
        cache.insert("b", Bytes::from_static(b"b"));
        cache.insert("a", Bytes::from_static(b"a2"));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("b"));
        assert_eq!(cache.get("a").unwrap(), Bytes::from_static(b"a2"));
    }

    #[test]
    fn clear_empties_cache() {
        let cache = AssetCache::unbounded();
        cache.insert("key", Bytes::from_static(b"data"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
