//! Error taxonomy for the cache engine and its peer transport.
//!
//! Mirrors the propagation policy from the design: only a peer fetch failure
//! is ever recovered internally (`Group::get` falls through to a local
//! load); everything else reaches the original caller as-is. Configuration
//! mistakes (null loader, double `register_peers`, malformed `base_path`)
//! are programmer errors in the original implementation (it panics); here
//! they all surface as `CacheError::Config` from a fallible constructor or
//! method instead, so a caller can `.expect()` on them the same way, or
//! handle them as an ordinary `Result` if it'd rather not crash.

use thiserror::Error;

/// Errors produced by the cache engine, its peer transport, and the HTTP
/// wire protocol.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// `Group::get` was called with an empty key.
    #[error("key is required")]
    KeyRequired,

    /// The loader reported that the key does not exist in the origin.
    /// Not cached; a later caller may retry immediately.
    #[error("{0} not exist")]
    NotFound(String),

    /// The loader failed for a reason other than "not found".
    #[error("loader error: {0}")]
    Loader(String),

    /// A peer fetch failed (network error or non-200 status). Recovered by
    /// `Group::load`, which falls through to a local load; never returned
    /// to the original `Group::get` caller.
    #[error("peer fetch failed: {0}")]
    Peer(String),

    /// HTTP request path did not contain the configured `base_path`.
    #[error("bad request: {0}")]
    BadPath(String),

    /// HTTP request named a group with no registered `Group`.
    #[error("no such group: {0}")]
    UnknownGroup(String),

    /// A configuration invariant was violated at construction time.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, CacheError>;
