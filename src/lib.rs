//! A distributed, read-through byte cache.
//!
//! Each process holds one or more named [`Group`](group::Group)s. A `Group`
//! is backed by a byte-budgeted LRU cache; on a miss it either asks a peer
//! (chosen by consistent hashing over the cluster) or falls back to a
//! [`Loader`](peer::Loader) that knows how to produce the value from
//! scratch. Concurrent misses for the same key are coalesced by a
//! [`SingleFlight`](singleflight::SingleFlight) so the loader or peer only
//! does the work once.
//!
//! ```no_run
//! use geecache::group::Group;
//! use geecache::byte_view::ByteView;
//! use geecache::error::CacheError;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let loader = |key: String| async move {
//!     Ok::<ByteView, CacheError>(ByteView::new(format!("value-for-{key}").as_bytes()))
//! };
//! let group = Group::new("scores", 64 << 20, Arc::new(loader));
//! let value = group.get("tom").await.unwrap();
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`byte_view`]: immutable byte buffer shared between cache, loader, and wire
//! - [`lru`]: byte-budgeted least-recently-used cache
//! - [`concurrent_cache`]: mutex-guarded, lazily-initialized `ByteLru`
//! - [`singleflight`]: in-flight call coalescing
//! - [`consistent_hash`]: virtual-node consistent-hash ring
//! - [`group`]: named cache namespace tying the above together
//! - [`peer`]: `Loader`/`PeerClient`/`PeerPicker` trait seams
//! - [`pool`]: HTTP peer transport (client and server)
//! - [`config`]: plain configuration structs
//! - [`error`]: crate-wide error type
//! - [`metrics`]: hit/miss/eviction counters
//! - [`entry`], [`list`]: internal cache storage, not part of the public API surface

pub mod byte_view;
pub mod concurrent_cache;
pub mod config;
pub(crate) mod entry;
pub mod error;
pub mod group;
pub(crate) mod list;
pub mod lru;
pub mod metrics;
pub mod peer;
pub mod pool;
pub mod singleflight;
pub mod consistent_hash;

pub use byte_view::ByteView;
pub use config::{GroupConfig, HashRingConfig, PoolConfig};
pub use consistent_hash::ConsistentHashRing;
pub use error::{CacheError, Result};
pub use group::Group;
pub use lru::ByteLru;
pub use peer::{Loader, PeerClient, PeerPicker};
pub use pool::PeerPool;
pub use singleflight::SingleFlight;
