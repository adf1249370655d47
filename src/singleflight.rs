//! Call coalescing: if N callers ask for the same key at once, the loader
//! runs once and all N get the same result.
//!
//! Grounded on `original_source/geecache/singleflight/singleflight.go`: a
//! mutex-guarded map from key to an in-flight call. The Go version uses a
//! `sync.WaitGroup` per call and deletes the map entry before returning so
//! the *next* call for that key starts fresh rather than replaying a stale
//! result.
//!
//! The per-key cell is `OnceCell<Result<V, E>>`, not `OnceCell<V>`: the
//! *outcome* of the call, success or failure, is what gets coalesced.
//! `OnceCell::get_or_init` (the infallible form) only ever runs its future
//! once per cell no matter what that future resolves to, so a failing
//! loader is invoked exactly once and every waiter observes the same
//! `Err`. An earlier version of this module used `get_or_try_init`, whose
//! semantics are the opposite of what's wanted here: on `Err` it leaves the
//! cell uninitialized and hands the init permit to the next queued waiter,
//! so a coalesced *failing* call could re-invoke the loader once per
//! waiter.
//!
//! Crucially the map lock is held only long enough to look up or insert the
//! per-key cell, never across the call to the loader itself -- otherwise a
//! slow loader for key A would block unrelated callers for key B, which the
//! design explicitly calls out as a correctness requirement.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Coalesces concurrent calls for the same key into a single execution.
pub struct SingleFlight<K, V, E> {
    calls: Mutex<HashMap<K, Arc<OnceCell<Result<V, E>>>>>,
}

impl<K, V, E> SingleFlight<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
    E: Clone,
{
    pub fn new() -> Self {
        SingleFlight {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `f` for `key`, or waits for an already-in-flight call for the
    /// same key and reuses its result. `f` is only invoked by whichever
    /// caller first registers the key; it is not invoked at all if another
    /// caller's call is already in flight, and that holds whether the
    /// in-flight call eventually succeeds or fails.
    pub async fn do_call<F, Fut>(&self, key: K, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = {
            let mut calls = self.calls.lock().await;
            calls
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let result = cell.get_or_init(f).await.clone();

        // Always drop our entry once the call resolves, win or lose, so the
        // next caller for this key starts a fresh call rather than reusing
        // a result that's already been handed out.
        let mut calls = self.calls.lock().await;
        calls.remove(&key);

        result
    }
}

impl<K, V, E> Default for SingleFlight<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
    E: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, E> std::fmt::Debug for SingleFlight<K, V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight").finish_non_exhaustive()
    }
}
