//! Byte-budget LRU cache.
//!
//! A single-threaded, recency-ordered map from key to value with eviction
//! governed by a total byte budget rather than an entry count. Adapted from
//! the teacher's `LruSegment`/`LruCache` split: the intrusive doubly linked
//! list (`list::List`) plus a `HashMap<K, *mut ListEntry<_>>` still gives
//! O(1) move-to-front and O(1) tail eviction, but the dual
//! entry-count-and-size limiter is gone — this cache has exactly one knob,
//! `max_bytes`, matching the design's `usedBytes <= maxBytes` invariant.
//!
//! # Thread Safety
//!
//! `ByteLru` is **not** thread-safe; see [`crate::concurrent_cache::ConcurrentCache`]
//! for the mutex-guarded adapter `Group` builds on.

use crate::entry::CacheEntry;
use crate::list::{Entry as ListEntry, List};
use crate::metrics::{CacheMetrics, LruMetrics};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::hash::Hash;
use std::num::NonZeroUsize;

use hashbrown::HashMap;

/// A value that can report how many bytes it costs to keep cached.
///
/// `ByteView` is the only type this crate caches, but the trait keeps the
/// cache itself generic the way the teacher's `Value` abstraction does, and
/// documents exactly what `used_bytes` is measuring.
pub trait CacheValue {
    /// Number of bytes this value contributes to the cache's byte budget.
    fn weight(&self) -> u64;
}

impl CacheValue for crate::byte_view::ByteView {
    fn weight(&self) -> u64 {
        self.len() as u64
    }
}

/// Number of bytes a key contributes to the budget. Matches the design's
/// `usedBytes = sum(len(key) + value.Len())`.
fn key_weight<K: AsRef<[u8]>>(key: &K) -> u64 {
    key.as_ref().len() as u64
}

/// A recency-ordered, byte-budgeted cache.
///
/// `max_bytes == 0` disables eviction entirely (matches the design's
/// explicit "0 = unlimited"). A single oversized value can still be
/// inserted even with a nonzero budget: eviction walks the tail until
/// either the budget holds or the cache is empty, whichever comes first.
pub struct ByteLru<K, V> {
    max_bytes: u64,
    used_bytes: u64,
    list: List<CacheEntry<K, V>>,
    map: HashMap<K, *mut ListEntry<CacheEntry<K, V>>>,
    metrics: LruMetrics,
    on_evict: Option<Box<dyn FnMut(&K, &V) + Send>>,
}

// SAFETY: ByteLru owns all data; the raw pointers in `map` only ever point
// at nodes owned by `list`, and every mutation requires `&mut self`.
unsafe impl<K: Send, V: Send> Send for ByteLru<K, V> {}

impl<K, V> ByteLru<K, V>
where
    K: Hash + Eq + Clone + AsRef<[u8]>,
    V: Clone + CacheValue,
{
    /// Creates a new cache with the given byte budget and no eviction callback.
    pub fn new(max_bytes: u64) -> Self {
        Self::with_on_evict(max_bytes, None)
    }

    /// Creates a new cache with an eviction callback, invoked synchronously
    /// whenever `remove_oldest` drops an entry (including the implicit
    /// evictions a byte-over-budget `add` triggers).
    pub fn with_on_evict(max_bytes: u64, on_evict: Option<Box<dyn FnMut(&K, &V) + Send>>) -> Self {
        ByteLru {
            max_bytes,
            used_bytes: 0,
            // The list itself is not what bounds capacity here -- the byte
            // budget is -- so give it effectively unlimited node capacity
            // and rely on `add_unchecked` plus our own eviction loop.
            list: List::new(NonZeroUsize::new(usize::MAX).unwrap()),
            map: HashMap::new(),
            metrics: LruMetrics::default(),
            on_evict,
        }
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Total bytes currently accounted for across all entries.
    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    /// The configured byte budget (`0` means unlimited).
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn metrics(&self) -> &LruMetrics {
        &self.metrics
    }

    /// Looks up `key`, moving it to the most-recently-used position on a
    /// hit. A hit is a mutation of recency order, so this takes `&mut self`
    /// even though it only "reads" the value.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(&node) = self.map.get(key) else {
            self.record_miss();
            return None;
        };
        unsafe {
            // SAFETY: node was handed to us by our own map and has not been
            // removed from the list since.
            self.list.move_to_front(node);
            let entry = (*node).get_value();
            self.metrics.record_hit();
            Some(entry.value.clone())
        }
    }

    /// Inserts or updates `key`. Moves the entry to the head of recency
    /// order either way, then evicts from the tail while `max_bytes > 0 &&
    /// used_bytes > max_bytes`.
    pub fn add(&mut self, key: K, value: V) {
        let value_size = value.weight();

        if let Some(&node) = self.map.get(&key) {
            unsafe {
                // SAFETY: node comes from our map.
                self.list.move_to_front(node);
                let entry = (*node).get_value_mut();
                self.used_bytes = self.used_bytes + value_size - entry.value.weight();
                entry.value = value;
            }
        } else {
            let size = key_weight(&key) + value_size;
            let entry = CacheEntry::new(key.clone(), value, size);
            let node = self.list.add_unchecked(entry);
            self.map.insert(key, node);
            self.used_bytes += size;
            self.metrics.record_insertion(size);
        }

        while self.max_bytes > 0 && self.used_bytes > self.max_bytes {
            if !self.remove_oldest() {
                break;
            }
        }
    }

    /// Removes the least-recently-used entry. Returns `false` if the cache
    /// was already empty.
    pub fn remove_oldest(&mut self) -> bool {
        let Some(boxed) = self.list.remove_last() else {
            return false;
        };
        unsafe {
            // SAFETY: boxed was just detached from the list; its value is
            // initialized (it is not a sigil node).
            let entry = boxed.get_value();
            self.map.remove(&entry.key);
            self.used_bytes = self.used_bytes.saturating_sub(entry.size);
            self.metrics.record_eviction(entry.size);
            if let Some(cb) = self.on_evict.as_mut() {
                cb(&entry.key, &entry.value);
            }
        }
        true
    }

    /// Records a miss for metrics purposes. Callers consult `get`, find a
    /// miss, and fall through to a loader or peer -- this just keeps the
    /// hit-rate denominator honest.
    pub fn record_miss(&mut self) {
        self.metrics.record_miss();
    }
}

impl<K, V> CacheMetrics for ByteLru<K, V> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.metrics()
    }
}

impl<K: std::fmt::Debug, V> std::fmt::Debug for ByteLru<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteLru")
            .field("max_bytes", &self.max_bytes)
            .field("used_bytes", &self.used_bytes)
            .field("len", &self.map.len())
            .finish()
    }
}
