//! Live result handle returned by
//! [`crate::RequestDispatcher::dispatch_reactive`].
//!
//! The handle owns the request definition (normalized path plus options) and
//! publishes every state change on a [`tokio::sync::watch`] channel.
//! [`ReactiveResult::refresh`] re-runs the request; a lazy path is resolved
//! again each time, so a refresh after the underlying value changes targets the
//! new path.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::watch;

use crate::dispatcher::ReactiveRequest;
use crate::{ApiPath, DispatchError, FetchStatus};

/// Snapshot of a reactive fetch.
#[derive(Debug)]
pub struct FetchState<T> {
    /// Last decoded payload. Kept while a refresh is pending; cleared on error.
    pub data: Option<Arc<T>>,
    /// Error of the last settled request.
    pub error: Option<DispatchError>,
    pub status: FetchStatus,
    /// Path the last request was sent to.
    pub path: Option<ApiPath>,
}

impl<T> Clone for FetchState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            status: self.status,
            path: self.path.clone(),
        }
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            status: FetchStatus::Idle,
            path: None,
        }
    }
}

/// A live, subscribable fetch result.
pub struct ReactiveResult<T> {
    request: Arc<ReactiveRequest>,
    state: watch::Sender<FetchState<T>>,
}

impl<T> ReactiveResult<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    pub(crate) fn new(request: ReactiveRequest) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            request: Arc::new(request),
            state,
        }
    }

    /// Runs the request again and publishes the outcome.
    ///
    /// Overlapping refreshes each run to completion; the last one to settle
    /// determines the final state.
    pub async fn refresh(&self) {
        self.state.send_modify(|state| state.status = FetchStatus::Pending);

        let (path, outcome) = self.request.execute().await;
        let outcome = outcome.and_then(|value| {
            serde_json::from_value::<T>(value).map_err(|e| DispatchError::Decode {
                message: e.to_string(),
            })
        });

        self.state.send_modify(|state| {
            state.path = Some(path);
            match outcome {
                Ok(data) => {
                    state.data = Some(Arc::new(data));
                    state.error = None;
                    state.status = FetchStatus::Success;
                }
                Err(err) => {
                    state.data = None;
                    state.error = Some(err);
                    state.status = FetchStatus::Error;
                }
            }
        });
    }

    /// Returns the last decoded payload.
    pub fn data(&self) -> Option<Arc<T>> {
        self.state.borrow().data.clone()
    }

    /// Returns the error of the last settled request.
    pub fn error(&self) -> Option<DispatchError> {
        self.state.borrow().error.clone()
    }

    pub fn status(&self) -> FetchStatus {
        self.state.borrow().status
    }

    /// Returns the path the last request was sent to.
    pub fn path(&self) -> Option<ApiPath> {
        self.state.borrow().path.clone()
    }

    /// Returns a full snapshot of the current state.
    pub fn state(&self) -> FetchState<T> {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.state.subscribe()
    }
}

impl<T> std::fmt::Debug for ReactiveResult<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ReactiveResult")
            .field("status", &state.status)
            .field("path", &state.path)
            .field("has_data", &state.data.is_some())
            .field("error", &state.error)
            .finish()
    }
}
