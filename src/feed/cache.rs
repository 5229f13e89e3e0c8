//! Short-lived caching for feed listings.
//!
//! [`Cache`] is the seam the feed assembler depends on; [`MemoryCache`] is
//! the in-process implementation and [`NullCache`] turns caching off.
//! Concurrent writers race with last-writer-wins semantics. The lock only
//! protects the map itself, since every cached value can be recomputed.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Key/value store with a per-entry time to live.
pub trait Cache<V>: Send + Sync {
    /// Return the value if present and not expired.
    fn get(&self, key: &str) -> Option<V>;

    /// Store a value, replacing any previous one.
    fn set(&self, key: &str, value: V, ttl: Duration);

    /// Drop a value so the next read recomputes it.
    fn delete(&self, key: &str);
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    cached_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_valid(&self) -> bool {
        self.cached_at.elapsed() < self.ttl
    }
}

/// In-memory cache shared by all request handlers.
#[derive(Debug)]
pub struct MemoryCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V> MemoryCache<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync> Cache<V> for MemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.is_valid())
            .map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: V, ttl: Duration) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| entry.is_valid());
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                cached_at: Instant::now(),
                ttl,
            },
        );
    }

    fn delete(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// A cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl<V> Cache<V> for NullCache {
    fn get(&self, _key: &str) -> Option<V> {
        None
    }

    fn set(&self, _key: &str, _value: V, _ttl: Duration) {}

    fn delete(&self, _key: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_validity() {
        let fresh = CacheEntry {
            value: 1,
            cached_at: Instant::now(),
            ttl: Duration::from_secs(20),
        };
        assert!(fresh.is_valid());

        let stale = CacheEntry {
            value: 1,
            cached_at: Instant::now() - Duration::from_secs(21),
            ttl: Duration::from_secs(20),
        };
        assert!(!stale.is_valid());
    }

    #[test]
    fn test_get_set_delete() {
        let cache = MemoryCache::new();
        assert!(cache.get("index_page").is_none());

        cache.set("index_page", vec![1, 2, 3], Duration::from_secs(60));
        assert_eq!(cache.get("index_page"), Some(vec![1, 2, 3]));

        cache.set("index_page", vec![4], Duration::from_secs(60));
        assert_eq!(cache.get("index_page"), Some(vec![4]));

        cache.delete("index_page");
        assert!(cache.get("index_page").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_ttl_is_never_served() {
        let cache = MemoryCache::new();
        cache.set("k", "v".to_string(), Duration::ZERO);
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_expired_entry_is_not_served() {
        let cache: MemoryCache<u8> = MemoryCache::new();
        cache.entries.write().unwrap().insert(
            "k".to_string(),
            CacheEntry {
                value: 7,
                cached_at: Instant::now() - Duration::from_secs(30),
                ttl: Duration::from_secs(20),
            },
        );
        assert!(cache.get("k").is_none());

        // The next write sweeps it out.
        cache.set("other", 1, Duration::from_secs(20));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_null_cache_stores_nothing() {
        let cache = NullCache;
        Cache::<u8>::set(&cache, "k", 1, Duration::from_secs(60));
        assert_eq!(Cache::<u8>::get(&cache, "k"), None);
    }
}
