//! A minimal get/put cache seam. The scoring core is deterministic and
//! cache-oblivious; callers that want memoisation inject an implementation at
//! the provider boundary.

use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub trait Cache<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;
    fn put(&self, key: K, value: V);
}

/// In-process cache with a single TTL across all entries. Expired entries are
/// dropped lazily on access.
pub struct MemoryCache<K, V> {
    ttl: Duration,
    entries: Mutex<FxHashMap<K, (Instant, V)>>,
}
impl<K: Eq + Hash, V> MemoryCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Send,
    V: Clone + Send,
{
    fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((inserted, value)) if inserted.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: K, value: V) {
        self.entries
            .lock()
            .unwrap()
            .insert(key, (Instant::now(), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_within_ttl() {
        let cache = MemoryCache::new(Duration::from_secs(3600));
        cache.put("k", 42);
        assert_eq!(Some(42), cache.get(&"k"));
        assert_eq!(1, cache.len());
    }

    #[test]
    fn miss_after_expiry() {
        let cache = MemoryCache::new(Duration::ZERO);
        cache.put("k", 42);
        assert_eq!(None, cache.get(&"k"));
        // expired entry is evicted on access
        assert!(cache.is_empty());
    }

    #[test]
    fn miss_on_absent_key() {
        let cache: MemoryCache<&str, i32> = MemoryCache::new(Duration::from_secs(3600));
        assert_eq!(None, cache.get(&"k"));
    }

    #[test]
    fn put_overwrites() {
        let cache = MemoryCache::new(Duration::from_secs(3600));
        cache.put("k", 1);
        cache.put("k", 2);
        assert_eq!(Some(2), cache.get(&"k"));
    }
}
