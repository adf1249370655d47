//! An immutable snapshot of a byte sequence — the value type that flows
//! through the whole cache: returned by a `Loader`, stored in the `ByteLru`,
//! and shipped across the wire by a `PeerPool`.
//!
//! # Invariant
//!
//! Once constructed, the internal buffer is never mutated. Every producer
//! clones its input on the way in (`ByteView::new`) and every consumer gets
//! a defensive copy on the way out (`as_bytes`), so a caller mutating the
//! `Vec<u8>` it got back can never affect what's sitting in the cache.

use bytes::Bytes;
use core::fmt;

/// Immutable, cheaply-cloneable view over a byte buffer.
///
/// `Bytes` gives us the "shared by value, never mutated" semantics the
/// design calls for: cloning a `ByteView` bumps a refcount rather than
/// copying the buffer, while `as_bytes`/`as_str` still hand back owned
/// copies so nothing external can alias into the cached buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct ByteView {
    b: Bytes,
}

impl ByteView {
    /// Builds a `ByteView` by cloning `data` into an owned buffer.
    pub fn new(data: &[u8]) -> Self {
        ByteView {
            b: Bytes::copy_from_slice(data),
        }
    }

    /// Takes ownership of an already-owned buffer without copying it.
    /// Used when the caller (e.g. a loader) already produced a fresh `Vec`.
    pub fn from_vec(data: Vec<u8>) -> Self {
        ByteView { b: Bytes::from(data) }
    }

    /// Length of the underlying buffer, in bytes.
    pub fn len(&self) -> usize {
        self.b.len()
    }

    /// True if the view holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    /// A defensive copy of the buffer as an owned `Vec<u8>`.
    pub fn as_bytes(&self) -> Vec<u8> {
        self.b.to_vec()
    }

    /// A borrowed view of the buffer, valid for the lifetime of `self`.
    pub fn as_slice(&self) -> &[u8] {
        &self.b
    }

    /// The buffer decoded as UTF-8, replacing invalid sequences.
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.b)
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView").field("len", &self.len()).finish()
    }
}

impl From<&[u8]> for ByteView {
    fn from(data: &[u8]) -> Self {
        ByteView::new(data)
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(data: Vec<u8>) -> Self {
        ByteView::from_vec(data)
    }
}

impl From<String> for ByteView {
    fn from(data: String) -> Self {
        ByteView::from_vec(data.into_bytes())
    }
}
