//! Consistent-hash ring used to route a key to the peer responsible for it.
//!
//! Grounded on `original_source/geecache/consistenthash/conistenthash.go`:
//! each real peer is hashed under `replicas` virtual node names
//! (`"{i}{peer}"`), the resulting hash values are kept sorted, and `get`
//! binary-searches for the first virtual node hash greater than or equal
//! to the key's hash, wrapping back to index 0 at the end of the ring.
//! Default hash function is CRC32 (IEEE), matching the Go default of
//! `crc32.ChecksumIEEE`; callers may supply their own via
//! [`ConsistentHashRing::with_hash`].

use std::collections::BTreeMap;

/// A hash function from an arbitrary byte string to a 32-bit ring position.
pub trait RingHash: Fn(&[u8]) -> u32 {}
impl<T: Fn(&[u8]) -> u32> RingHash for T {}

fn crc32_ieee(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Maps keys to peers by consistent hashing with virtual nodes.
pub struct ConsistentHashRing {
    replicas: usize,
    hash_fn: Box<dyn Fn(&[u8]) -> u32 + Send + Sync>,
    /// Sorted ring positions.
    keys: Vec<u32>,
    /// Ring position -> real peer name.
    ring: BTreeMap<u32, String>,
}

impl ConsistentHashRing {
    /// Creates an empty ring with `replicas` virtual nodes per peer and the
    /// default CRC32 hash function.
    pub fn new(replicas: usize) -> Self {
        Self::with_hash(replicas, crc32_ieee)
    }

    /// Creates an empty ring using a caller-supplied hash function.
    pub fn with_hash<F>(replicas: usize, hash_fn: F) -> Self
    where
        F: Fn(&[u8]) -> u32 + Send + Sync + 'static,
    {
        ConsistentHashRing {
            replicas,
            hash_fn: Box::new(hash_fn),
            keys: Vec::new(),
            ring: BTreeMap::new(),
        }
    }

    /// Adds one or more real peers to the ring, each represented by
    /// `replicas` virtual nodes.
    pub fn add(&mut self, peers: &[&str]) {
        for peer in peers {
            for i in 0..self.replicas {
                let virtual_key = format!("{i}{peer}");
                let hash = (self.hash_fn)(virtual_key.as_bytes());
                self.ring.insert(hash, peer.to_string());
                self.keys.push(hash);
            }
        }
        self.keys.sort_unstable();
    }

    /// Returns the peer responsible for `key`, or `None` if the ring has no
    /// peers.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let hash = (self.hash_fn)(key.as_bytes());
        let idx = match self.keys.binary_search(&hash) {
            Ok(i) => i,
            Err(i) => i,
        };
        let idx = if idx == self.keys.len() { 0 } else { idx };
        self.ring.get(&self.keys[idx]).map(String::as_str)
    }

    /// True if the ring has no peers registered.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl std::fmt::Debug for ConsistentHashRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsistentHashRing")
            .field("replicas", &self.replicas)
            .field("peers", &self.ring.values().collect::<std::collections::BTreeSet<_>>())
            .finish()
    }
}
