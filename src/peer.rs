//! Trait seams between a [`crate::group::Group`] and the outside world:
//! where a miss is loaded from, and who else might already have it cached.
//!
//! Grounded on `original_source/geecache/getter.go` and
//! `original_source/geecache/peers.go`. The Go `Getter`/`GetterFunc` pair
//! (an interface plus a function-to-interface adapter) becomes a plain
//! async trait here; `GetterFunc`'s adapter role is filled by blanket
//! implementations Rust closures can satisfy directly via boxed futures
//! where needed.

use crate::byte_view::ByteView;
use crate::error::CacheError;
use async_trait::async_trait;
use std::sync::Arc;

/// Loads the value for a key from the system of record (a database, a
/// file, a computation) when it is not present in any cache.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, key: &str) -> Result<ByteView, CacheError>;
}

/// Adapts a plain async closure into a [`Loader`], mirroring the Go
/// `GetterFunc` adapter.
#[async_trait]
impl<F, Fut> Loader for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<ByteView, CacheError>> + Send,
{
    async fn load(&self, key: &str) -> Result<ByteView, CacheError> {
        (self)(key.to_string()).await
    }
}

/// A remote cache node, reachable over the wire.
#[async_trait]
pub trait PeerClient: Send + Sync {
    /// Fetches `key` from `group` on this peer.
    async fn get(&self, group: &str, key: &str) -> Result<ByteView, CacheError>;
}

/// Chooses which peer, if any, owns a given key.
///
/// Returns `None` when the key maps to the local node, signaling the
/// caller should load it itself rather than make a network round trip.
pub trait PeerPicker: Send + Sync {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerClient>>;
}
