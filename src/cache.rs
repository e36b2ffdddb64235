//! # Result Cache Module
//!
//! Thread-safe, in-memory TTL cache used by the dispatcher to avoid repeat
//! outbound calls for identical queries.
//!
//! - Expired entries behave exactly like misses and are purged lazily on read
//! - Size is bounded: when full, the oldest insertion is evicted (not LRU)

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::capability::Capability;
use crate::config::CacheConfig;

/// Composite cache key: capability plus normalized argument
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub capability: Capability,
    pub argument: String,
}

impl CacheKey {
    pub fn new(capability: Capability, argument: &str) -> Self {
        Self {
            capability,
            argument: normalize_argument(argument),
        }
    }
}

/// Lowercase, trim and collapse inner whitespace
pub fn normalize_argument(argument: &str) -> String {
    argument
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

struct CacheInner<K, V> {
    entries: HashMap<K, (V, Instant)>,
    order: VecDeque<K>,
}

/// In-memory map from key to value with an expiry timestamp
pub struct TtlCache<K, V> {
    inner: Mutex<CacheInner<K, V>>,
    ttl: Duration,
    max_entries: usize,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl(), config.max_entries)
    }

    /// Return the cached value if present and not expired
    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        let expired = match inner.entries.get(key) {
            Some((value, expires_at)) if *expires_at > now => return Some(value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            inner.entries.remove(key);
            inner.order.retain(|k| k != key);
        }
        None
    }

    /// Store a value, stamping it with `now + ttl`
    pub fn set(&self, key: K, value: V) {
        self.set_at(key, value, Instant::now());
    }

    fn set_at(&self, key: K, value: V, now: Instant) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let expires_at = now + self.ttl;

        if inner.entries.insert(key.clone(), (value, expires_at)).is_none() {
            inner.order.push_back(key);
        }

        while inner.entries.len() > self.max_entries {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(300), 8);
        cache.set("k".to_string(), Some("v".to_string()));

        assert_eq!(cache.get(&"k".to_string()), Some(Some("v".to_string())));
    }

    #[test]
    fn test_negative_result_is_cached() {
        let cache: TtlCache<String, Option<String>> = TtlCache::new(Duration::from_secs(300), 8);
        cache.set("k".to_string(), None);

        assert_eq!(cache.get(&"k".to_string()), Some(None));
    }

    #[test]
    fn test_expired_entry_is_miss_and_purged() {
        let cache = TtlCache::new(Duration::from_secs(10), 8);
        let start = Instant::now();
        cache.set_at(1u32, "one", start);

        assert_eq!(cache.get_at(&1, start + Duration::from_secs(9)), Some("one"));
        assert_eq!(cache.get_at(&1, start + Duration::from_secs(10)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_evicts_oldest_insertion_when_full() {
        let cache = TtlCache::new(Duration::from_secs(300), 2);
        cache.set(1u32, "a");
        cache.set(2u32, "b");
        let _ = cache.get(&1); // reads don't refresh position
        cache.set(3u32, "c");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some("b"));
        assert_eq!(cache.get(&3), Some("c"));
    }

    #[test]
    fn test_overwrite_keeps_single_slot() {
        let cache = TtlCache::new(Duration::from_secs(300), 2);
        cache.set(1u32, "a");
        cache.set(1u32, "a2");
        cache.set(2u32, "b");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), Some("a2"));
    }

    #[test]
    fn test_key_normalization() {
        assert_eq!(
            CacheKey::new(Capability::Knowledge, "  Malaria   Parasite "),
            CacheKey::new(Capability::Knowledge, "malaria parasite")
        );
        assert_ne!(
            CacheKey::new(Capability::Knowledge, "malaria"),
            CacheKey::new(Capability::Drug, "malaria")
        );
    }
}
