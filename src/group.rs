//! A named, independently-sized cache namespace: the unit an application
//! actually talks to.
//!
//! Grounded on `original_source/geecache/geecache.go`. A `Group` wires
//! together the pieces built elsewhere in this crate: a
//! [`ConcurrentCache`] for storage, a [`Loader`] for misses, an optional
//! [`PeerPicker`] for routing a miss to whichever node owns it, and a
//! [`SingleFlight`] so concurrent misses for the same key cost one load
//! instead of N. `Group::get`/`load`/`get_locally`/`get_from_peer` mirror
//! the Go methods of the same names one-to-one.

use crate::byte_view::ByteView;
use crate::concurrent_cache::ConcurrentCache;
use crate::error::CacheError;
use crate::peer::{Loader, PeerPicker};
use crate::singleflight::SingleFlight;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// A named cache namespace with its own byte budget and loader.
pub struct Group {
    name: String,
    loader: Arc<dyn Loader>,
    main_cache: ConcurrentCache<String, ByteView>,
    peers: RwLock<Option<Arc<dyn PeerPicker>>>,
    single_flight: SingleFlight<String, ByteView, CacheError>,
}

fn registry() -> &'static RwLock<HashMap<String, Arc<Group>>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, Arc<Group>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

impl Group {
    /// Creates a new group and registers it process-wide under `name`.
    /// Replaces any previously-registered group of the same name, matching
    /// the Go constructor's unconditional map write.
    pub fn new(name: impl Into<String>, max_bytes: u64, loader: Arc<dyn Loader>) -> Arc<Group> {
        let name = name.into();
        let group = Arc::new(Group {
            name: name.clone(),
            loader,
            main_cache: ConcurrentCache::new(max_bytes),
            peers: RwLock::new(None),
            single_flight: SingleFlight::new(),
        });
        registry().write().insert(name, group.clone());
        group
    }

    /// Looks up a previously-created group by name.
    pub fn get_group(name: &str) -> Option<Arc<Group>> {
        registry().read().get(name).cloned()
    }

    /// Registers the peer picker this group should consult on a miss.
    ///
    /// Returns `CacheError::Config` if a peer picker is already registered
    /// for this group; the original implementation panics on this case, but
    /// a double `RegisterPeers` is a configuration mistake a caller can and
    /// should be able to recover from rather than crash the whole process.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<(), CacheError> {
        let mut slot = self.peers.write();
        if slot.is_some() {
            return Err(CacheError::Config(format!(
                "peers already registered for group {}",
                self.name
            )));
        }
        *slot = Some(peers);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetches `key`, serving from cache when possible and otherwise
    /// loading it (from a peer if one owns the key, else locally).
    pub async fn get(&self, key: &str) -> Result<ByteView, CacheError> {
        if key.is_empty() {
            return Err(CacheError::KeyRequired);
        }

        if let Some(value) = self.main_cache.get(key) {
            info!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        self.load(key).await
    }

    async fn load(&self, key: &str) -> Result<ByteView, CacheError> {
        let peer = self.peers.read().as_ref().and_then(|p| p.pick_peer(key));

        self.single_flight
            .do_call(key.to_string(), move || async move {
                if let Some(peer) = peer {
                    match self.get_from_peer(peer.as_ref(), key).await {
                        Ok(value) => return Ok(value),
                        Err(e) => warn!(group = %self.name, key, error = %e, "peer fetch failed, falling back to local load"),
                    }
                }
                self.get_locally(key).await
            })
            .await
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView, CacheError> {
        let value = self.loader.load(key).await?;
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    async fn get_from_peer(
        &self,
        peer: &dyn crate::peer::PeerClient,
        key: &str,
    ) -> Result<ByteView, CacheError> {
        peer.get(&self.name, key).await
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key.to_string(), value);
    }

    /// Snapshot of the underlying cache's hit/miss/eviction counters.
    pub fn metrics(&self) -> std::collections::BTreeMap<String, f64> {
        self.main_cache.metrics()
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group").field("name", &self.name).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn miss_then_hit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        let loader = move |key: String| {
            let calls = calls2.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<ByteView, CacheError>(ByteView::new(format!("{key}-value").as_bytes()))
            }
        };
        let group = Group::new("scores-miss-hit", 1 << 20, Arc::new(loader));

        let v1 = group.get("tom").await.unwrap();
        assert_eq!(v1.as_str(), "tom-value");
        let v2 = group.get("tom").await.unwrap();
        assert_eq!(v2.as_str(), "tom-value");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_key_is_rejected() {
        let loader = |_: String| async { Ok::<ByteView, CacheError>(ByteView::new(b"x")) };
        let group = Group::new("scores-empty-key", 1024, Arc::new(loader));
        assert!(matches!(group.get("").await, Err(CacheError::KeyRequired)));
    }

    #[tokio::test]
    async fn loader_not_found_propagates() {
        let loader = |key: String| async move { Err(CacheError::NotFound(key)) };
        let group = Group::new("scores-not-found", 1024, Arc::new(loader));
        let err = group.get("unknown").await.unwrap_err();
        assert!(err.to_string().contains("not exist"));
    }

    #[tokio::test]
    async fn get_group_finds_registered_group() {
        let loader = |_: String| async { Ok::<ByteView, CacheError>(ByteView::new(b"x")) };
        Group::new("scores-lookup", 1024, Arc::new(loader));
        assert!(Group::get_group("scores-lookup").is_some());
        assert!(Group::get_group("does-not-exist-xyz").is_none());
    }

    struct NoPeerPicker;
    impl PeerPicker for NoPeerPicker {
        fn pick_peer(&self, _key: &str) -> Option<Arc<dyn crate::peer::PeerClient>> {
            None
        }
    }

    #[tokio::test]
    async fn double_register_peers_is_a_config_error() {
        let loader = |_: String| async { Ok::<ByteView, CacheError>(ByteView::new(b"x")) };
        let group = Group::new("scores-double-register", 1024, Arc::new(loader));

        group.register_peers(Arc::new(NoPeerPicker)).unwrap();
        let err = group.register_peers(Arc::new(NoPeerPicker)).unwrap_err();
        assert!(matches!(err, CacheError::Config(_)));
    }
}
