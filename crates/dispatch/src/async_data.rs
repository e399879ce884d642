//! Keyed one-shot fetching with in-flight deduplication.
//!
//! [`AsyncDataStore`] runs one request per key at a time: a call that arrives
//! while another call with the same key is still in flight awaits that request
//! instead of issuing its own. Once the request settles its slot is freed, so
//! the next call with the key fetches again. The last successful payload per
//! key is kept and can be read back with [`AsyncDataStore::cached`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;

use crate::{CacheKey, DispatchError, FetchStatus, TransportError};

type SharedFetch = Shared<BoxFuture<'static, Result<Value, TransportError>>>;

/// Store backing [`crate::RequestDispatcher::dispatch_once`].
#[derive(Default)]
pub struct AsyncDataStore {
    in_flight: Mutex<HashMap<CacheKey, SharedFetch>>,
    settled: Mutex<HashMap<CacheKey, Value>>,
}

impl AsyncDataStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `fetch` under `key`, or joins the request already in flight for it.
    ///
    /// `fetch` is only polled when this call starts a new request; a joining
    /// call drops it unpolled.
    pub async fn run<F>(&self, key: &CacheKey, fetch: F) -> Result<Value, TransportError>
    where
        F: Future<Output = Result<Value, TransportError>> + Send + 'static,
    {
        let (shared, _guard) = {
            let mut in_flight = self.lock_in_flight();
            match in_flight.get(key) {
                Some(existing) => {
                    tracing::debug!(key = %key, "Joining in-flight request");
                    (existing.clone(), None)
                }
                None => {
                    let shared = fetch.boxed().shared();
                    in_flight.insert(key.clone(), shared.clone());
                    let guard = InFlightGuard {
                        store: self,
                        key: key.clone(),
                        shared: shared.clone(),
                    };
                    (shared, Some(guard))
                }
            }
        };

        let outcome = shared.await;
        if let Ok(value) = &outcome {
            lock(&self.settled).insert(key.clone(), value.clone());
        }
        outcome
    }

    /// Returns the last successful payload stored under `key`.
    pub fn cached(&self, key: &CacheKey) -> Option<Value> {
        lock(&self.settled).get(key).cloned()
    }

    /// Forgets the cached payload for `key`. In-flight requests are unaffected.
    pub fn clear(&self, key: &CacheKey) {
        lock(&self.settled).remove(key);
    }

    /// Returns `true` while a request for `key` is in flight.
    pub fn is_in_flight(&self, key: &CacheKey) -> bool {
        self.lock_in_flight().contains_key(key)
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<CacheKey, SharedFetch>> {
        lock(&self.in_flight)
    }
}

impl std::fmt::Debug for AsyncDataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncDataStore")
            .field("in_flight", &self.lock_in_flight().len())
            .field("settled", &lock(&self.settled).len())
            .finish()
    }
}

// The maps hold no invariants that a panicking holder could break mid-update.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Frees a key's in-flight slot when the call that created it finishes or is
/// dropped.
struct InFlightGuard<'a> {
    store: &'a AsyncDataStore,
    key: CacheKey,
    shared: SharedFetch,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.store.lock_in_flight();
        if in_flight
            .get(&self.key)
            .is_some_and(|current| current.ptr_eq(&self.shared))
        {
            in_flight.remove(&self.key);
        }
    }
}

// ---------------------------------------------------------------------------

/// Settled result of a one-shot fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncData<T> {
    key: CacheKey,
    outcome: Result<T, DispatchError>,
}

impl<T> AsyncData<T> {
    pub(crate) fn new(key: CacheKey, outcome: Result<T, DispatchError>) -> Self {
        Self { key, outcome }
    }

    /// The key this result was fetched under.
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// The decoded payload, if the request succeeded.
    pub fn data(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    /// The failure, if the request failed.
    pub fn error(&self) -> Option<&DispatchError> {
        self.outcome.as_ref().err()
    }

    pub fn status(&self) -> FetchStatus {
        match self.outcome {
            Ok(_) => FetchStatus::Success,
            Err(_) => FetchStatus::Error,
        }
    }

    /// Converts into a plain `Result`.
    pub fn into_result(self) -> Result<T, DispatchError> {
        self.outcome
    }
}
