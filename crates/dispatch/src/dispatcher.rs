//! The request dispatcher.
//!
//! [`RequestDispatcher`] offers two call forms over the same path
//! normalization:
//!
//! - [`RequestDispatcher::dispatch_reactive`] returns a live
//!   [`ReactiveResult`] and routes error responses through the caller's hook
//!   and then the [`Notifier`].
//! - [`RequestDispatcher::dispatch_once`] resolves the path once, runs through
//!   the keyed [`AsyncDataStore`], and never notifies. Callers inspect the
//!   returned [`AsyncData`] themselves.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::Instrument;

use crate::path::{normalize_path, NormalizedPath};
use crate::{
    ApiError, ApiPath, AsyncData, AsyncDataStore, CacheKey, DispatchError, FetchOptions,
    Notification, Notifier, ParsedErrorBody, PathSpec, ReactiveResult, RequestId,
    RequestOptions, Transport, TransportError,
};

// ---------------------------------------------------------------------------
// Error context
// ---------------------------------------------------------------------------

/// Context handed to a response-error hook.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseErrorContext {
    request_id: RequestId,
    path: ApiPath,
    status: u16,
    body: Option<Value>,
    parsed: ParsedErrorBody,
}

impl ResponseErrorContext {
    /// Builds a context, running the error-body parse step once.
    pub fn new(request_id: RequestId, path: ApiPath, status: u16, body: Option<Value>) -> Self {
        let parsed = match &body {
            Some(value) => ApiError::parse(value),
            None => ParsedErrorBody::Unparsed(Value::Null),
        };
        Self {
            request_id,
            path,
            status,
            body,
            parsed,
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Normalized path the failing request was sent to.
    pub fn path(&self) -> &ApiPath {
        &self.path
    }

    /// HTTP status of the response.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Raw response body as reported by the transport.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Result of parsing the body as an [`ApiError`].
    pub fn parsed(&self) -> &ParsedErrorBody {
        &self.parsed
    }

    /// Returns `true` if the response carried a non-empty body.
    pub fn has_body(&self) -> bool {
        match &self.body {
            None | Some(Value::Null) => false,
            Some(Value::String(text)) => !text.is_empty(),
            Some(_) => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Dispatches API requests through an injected transport and notifier.
///
/// Cloning is cheap and shares the transport, notifier, and async-data store.
#[derive(Clone)]
pub struct RequestDispatcher {
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    store: Arc<AsyncDataStore>,
}

impl RequestDispatcher {
    /// Creates a dispatcher with its own [`AsyncDataStore`].
    pub fn new(transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_store(transport, notifier, Arc::new(AsyncDataStore::new()))
    }

    /// Creates a dispatcher that shares an existing [`AsyncDataStore`].
    pub fn with_store(
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        store: Arc<AsyncDataStore>,
    ) -> Self {
        Self {
            transport,
            notifier,
            store,
        }
    }

    /// The store backing [`Self::dispatch_once`].
    pub fn store(&self) -> &AsyncDataStore {
        &self.store
    }

    /// Fetches `path` and returns a live result handle.
    ///
    /// The first request is awaited before returning. Error responses run the
    /// caller's `on_response_error` hook and then, unless `silent` is set,
    /// notify with the best message from the error body.
    pub async fn dispatch_reactive<T>(
        &self,
        path: impl Into<PathSpec>,
        options: RequestOptions,
    ) -> ReactiveResult<T>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let request = ReactiveRequest {
            transport: Arc::clone(&self.transport),
            notifier: Arc::clone(&self.notifier),
            path: normalize_path(path.into()),
            options,
        };
        let result = ReactiveResult::new(request);
        result.refresh().await;
        result
    }

    /// Fetches `path` once under `key`.
    ///
    /// The path is resolved at call time. Concurrent calls with the same key
    /// share one request. Errors are returned on the [`AsyncData`] and are
    /// never sent to the notifier.
    pub async fn dispatch_once<T>(
        &self,
        key: CacheKey,
        path: impl Into<PathSpec>,
        options: FetchOptions,
    ) -> AsyncData<T>
    where
        T: DeserializeOwned,
    {
        let path = normalize_path(path.into()).resolve();
        let request_id = RequestId::new_random();
        let span = tracing::info_span!(
            "dispatch_once",
            key = %key,
            request_id = %request_id,
            path = %path,
            method = %options.method(),
        );

        let transport = Arc::clone(&self.transport);
        let fetch = async move { transport.fetch(&path, &options).await };

        let outcome = self
            .store
            .run(&key, fetch)
            .instrument(span.clone())
            .await
            .map_err(DispatchError::from)
            .and_then(decode::<T>);

        if let Err(err) = &outcome {
            span.in_scope(|| tracing::debug!(error = %err, "One-shot request failed"));
        }

        AsyncData::new(key, outcome)
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("transport", &self.transport.name())
            .field("store", &self.store)
            .finish()
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, DispatchError> {
    serde_json::from_value(value).map_err(|e| DispatchError::Decode {
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Reactive request
// ---------------------------------------------------------------------------

/// Request definition owned by a [`ReactiveResult`].
pub(crate) struct ReactiveRequest {
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    path: NormalizedPath,
    options: RequestOptions,
}

impl ReactiveRequest {
    /// Resolves the path and sends one request, routing any error response.
    pub(crate) async fn execute(&self) -> (ApiPath, Result<Value, DispatchError>) {
        let path = self.path.resolve();
        let request_id = RequestId::new_random();
        let span = tracing::info_span!(
            "dispatch_reactive",
            request_id = %request_id,
            path = %path,
            method = %self.options.fetch.method(),
            silent = self.options.silent,
        );

        let outcome = async {
            match self.transport.fetch(&path, &self.options.fetch).await {
                Ok(value) => Ok(value),
                Err(err) => Err(self.route_error(request_id, &path, err)),
            }
        }
        .instrument(span)
        .await;

        (path, outcome)
    }

    /// Runs the hook and the notifier for an error response.
    ///
    /// Failures without a response (network, timeout) pass through untouched.
    fn route_error(&self, request_id: RequestId, path: &ApiPath, err: TransportError) -> DispatchError {
        let TransportError::Status { status, body } = &err else {
            tracing::warn!(error = %err, "Request failed without a response");
            return err.into();
        };

        tracing::warn!(status, "Request failed with error response");
        let context = ResponseErrorContext::new(request_id, path.clone(), *status, body.clone());

        if let Some(hook) = &self.options.on_response_error {
            if let Err(hook_err) = hook(&context) {
                tracing::warn!(error = %hook_err, "Response error hook failed; skipping notification");
                return hook_err.into();
            }
        }

        if self.options.silent {
            tracing::debug!("Notification suppressed (silent)");
        } else if context.has_body() {
            self.notifier.notify(Notification::error(context.parsed().description()));
        }

        err.into()
    }
}
