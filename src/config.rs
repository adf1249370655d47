//! Plain configuration structs for the pieces an application wires
//! together at startup.
//!
//! Kept in the teacher's style: public fields, no builder ceremony. The
//! one behavior these add over the original Go code (which never
//! validates `basePath` and simply panics on a malformed peer address) is
//! `PoolConfig::validate`, which turns that startup mistake into a
//! `Result` the caller can report before binding a socket.

use crate::error::CacheError;

/// Sizing and identity for one [`crate::group::Group`].
#[derive(Debug, Clone)]
pub struct GroupConfig {
    pub name: String,
    pub max_bytes: u64,
}

/// Tuning for a [`crate::consistent_hash::ConsistentHashRing`].
#[derive(Debug, Clone)]
pub struct HashRingConfig {
    pub replicas: usize,
}

impl Default for HashRingConfig {
    fn default() -> Self {
        // Matches the default used by `original_source/geecache/main.go`.
        HashRingConfig { replicas: 50 }
    }
}

/// Wiring for a [`crate::pool::PeerPool`]: this node's own address, its
/// peers, and the URL prefix peer requests are served under.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub self_addr: String,
    pub base_path: String,
    pub peers: Vec<String>,
    pub hash_ring: HashRingConfig,
}

impl PoolConfig {
    pub fn new(self_addr: impl Into<String>) -> Self {
        PoolConfig {
            self_addr: self_addr.into(),
            base_path: "/_geecache/".to_string(),
            peers: Vec::new(),
            hash_ring: HashRingConfig::default(),
        }
    }

    /// Checks the invariants the HTTP layer relies on: `base_path` must be
    /// an absolute path with a trailing slash, since peer URLs are built by
    /// simple string concatenation.
    pub fn validate(&self) -> Result<(), CacheError> {
        if !self.base_path.starts_with('/') || !self.base_path.ends_with('/') {
            return Err(CacheError::Config(format!(
                "base_path must start and end with '/', got {:?}",
                self.base_path
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_base_path_without_trailing_slash() {
        let mut cfg = PoolConfig::new("127.0.0.1:8001");
        cfg.base_path = "/_geecache".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn default_base_path_is_valid() {
        let cfg = PoolConfig::new("127.0.0.1:8001");
        assert!(cfg.validate().is_ok());
    }
}
