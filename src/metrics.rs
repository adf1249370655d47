//! Cache metrics.
//!
//! Kept from the teacher's metrics system but trimmed to the single
//! algorithm this crate implements. Counters live alongside each `ByteLru`
//! and are snapshotted into a `BTreeMap<String, f64>` — `BTreeMap` over
//! `HashMap` for the same reason the teacher uses it: deterministic
//! iteration order makes metrics output and tests reproducible.

use std::collections::BTreeMap;

/// Hit/miss/eviction counters for one `ByteLru`.
#[derive(Debug, Default, Clone)]
pub struct LruMetrics {
    pub requests: u64,
    pub hits: u64,
    pub evictions: u64,
    pub bytes_written: u64,
    pub bytes_evicted: u64,
}

impl LruMetrics {
    pub(crate) fn record_hit(&mut self) {
        self.requests += 1;
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.requests += 1;
    }

    pub(crate) fn record_insertion(&mut self, size: u64) {
        self.bytes_written += size;
    }

    pub(crate) fn record_eviction(&mut self, size: u64) {
        self.evictions += 1;
        self.bytes_evicted += size;
    }

    /// Fraction of requests that were served from cache, or `0.0` if there
    /// have been no requests yet.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }
}

/// Common reporting surface for cache implementations in this crate.
pub trait CacheMetrics {
    /// All metrics as key-value pairs, in deterministic (alphabetical) order.
    fn metrics(&self) -> BTreeMap<String, f64>;
}

impl CacheMetrics for LruMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        let mut m = BTreeMap::new();
        m.insert("bytes_evicted".to_string(), self.bytes_evicted as f64);
        m.insert("bytes_written".to_string(), self.bytes_written as f64);
        m.insert("evictions".to_string(), self.evictions as f64);
        m.insert("hit_rate".to_string(), self.hit_rate());
        m.insert("hits".to_string(), self.hits as f64);
        m.insert("requests".to_string(), self.requests as f64);
        m
    }
}
