//! Thread-safe wrapper around [`crate::lru::ByteLru`].
//!
//! The teacher's own `ConcurrentLruCache` shards its keyspace across
//! multiple segments to spread lock contention. This crate deliberately
//! does *not* do that: a `Group` is meant to be read-through, so the
//! values behind a single key are cheap to recompute and the extra
//! complexity of sharded locking buys little. Instead `ConcurrentCache` is
//! one `ByteLru` behind one `parking_lot::Mutex`, built lazily on first use
//! so a `Group` can be constructed with its byte budget decided but no
//! memory committed until the first `add`.

use crate::lru::{ByteLru, CacheValue};
use crate::metrics::{CacheMetrics, LruMetrics};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::hash::Hash;

/// A `ByteLru` guarded by a single mutex, constructed on first access.
pub struct ConcurrentCache<K, V> {
    max_bytes: u64,
    inner: Mutex<Option<ByteLru<K, V>>>,
}

impl<K, V> ConcurrentCache<K, V>
where
    K: Hash + Eq + Clone + AsRef<[u8]>,
    V: Clone + CacheValue,
{
    /// Creates a cache with the given byte budget. No `ByteLru` is
    /// allocated until the first `add` or `get`.
    pub fn new(max_bytes: u64) -> Self {
        ConcurrentCache {
            max_bytes,
            inner: Mutex::new(None),
        }
    }

    /// Looks up `key`. Returns `None` without allocating if the cache has
    /// never been written to.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let mut guard = self.inner.lock();
        guard.as_mut()?.get(key)
    }

    /// Inserts or updates `key`, allocating the underlying `ByteLru` on
    /// first use.
    pub fn add(&self, key: K, value: V) {
        let mut guard = self.inner.lock();
        guard
            .get_or_insert_with(|| ByteLru::new(self.max_bytes))
            .add(key, value);
    }

    /// Snapshot of hit/miss/eviction counters. All zero if the cache has
    /// never been written to.
    pub fn metrics(&self) -> BTreeMap<String, f64> {
        let guard = self.inner.lock();
        match guard.as_ref() {
            Some(lru) => lru.metrics(),
            None => LruMetrics::default().metrics(),
        }
    }
}

impl<K, V> std::fmt::Debug for ConcurrentCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.inner.lock();
        f.debug_struct("ConcurrentCache")
            .field("max_bytes", &self.max_bytes)
            .field("initialized", &guard.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_view::ByteView;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn lazy_until_first_write() {
        let cache: ConcurrentCache<String, ByteView> = ConcurrentCache::new(1024);
        assert!(cache.get("missing").is_none());
        assert_eq!(cache.metrics().get("requests").copied().unwrap_or(0.0), 0.0);
    }

    #[test]
    fn concurrent_writers_do_not_corrupt_state() {
        let cache = Arc::new(ConcurrentCache::<String, ByteView>::new(0));
        let mut handles = Vec::new();
        for t in 0..8 {
            let cache = cache.clone();
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    cache.add(format!("t{t}-{i}"), ByteView::new(b"v"));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.get("t0-0").unwrap().as_bytes(), b"v");
    }
}
