//! Request dispatching for API clients.
//!
//! This crate normalizes request paths, hands each request to an injected
//! [`Transport`], and routes error responses to a caller hook and a pluggable
//! [`Notifier`]. It contains no I/O of its own; the HTTP implementation of
//! [`Transport`] lives in the `transport` crate.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** Infrastructure crates implement
//! [`Transport`] and [`Notifier`]; applications construct a
//! [`RequestDispatcher`] with both and own its lifecycle.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtypes (`ApiPath`, `CacheKey`, `RequestId`) |
//! | [`path`] | `PathSpec`, `NormalizedPath`, normalization functions |
//! | [`options`] | `FetchOptions`, `RequestOptions`, `HttpMethod` |
//! | [`types`] | `ApiError`, `ParsedErrorBody`, `Notification`, `FetchStatus` |
//! | [`errors`] | `TransportError`, `DispatchError`, `HookError`, `OptionsError` |
//! | [`ports`] | `Transport` and `Notifier` traits |
//! | [`dispatcher`] | `RequestDispatcher`, `ResponseErrorContext` |
//! | [`reactive`] | `ReactiveResult`, `FetchState` |
//! | [`async_data`] | `AsyncDataStore`, `AsyncData` |
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dispatch::{RequestDispatcher, RequestOptions, TracingNotifier, Transport};
//!
//! # async fn demo(transport: Arc<dyn Transport>) {
//! let dispatcher = RequestDispatcher::new(transport, Arc::new(TracingNotifier));
//! let user = dispatcher
//!     .dispatch_reactive::<serde_json::Value>("users/1", RequestOptions::default())
//!     .await;
//! println!("{:?}", user.data());
//! # }
//! ```

pub mod async_data;
pub mod dispatcher;
pub mod errors;
pub mod identifiers;
pub mod options;
pub mod path;
pub mod ports;
pub mod reactive;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use async_data::{AsyncData, AsyncDataStore};
pub use dispatcher::{RequestDispatcher, ResponseErrorContext};
pub use errors::{DispatchError, HookError, OptionsError, TransportError};
pub use identifiers::{ApiPath, CacheKey, RequestId};
pub use options::{FetchOptions, FetchOptionsBuilder, HttpMethod, RequestOptions, ResponseErrorHook};
pub use path::{normalize, normalize_path, NormalizedPath, PathResolver, PathSpec};
pub use ports::{Notifier, NullNotifier, TracingNotifier, Transport};
pub use reactive::{FetchState, ReactiveResult};
pub use types::{
    ApiError, FetchStatus, Notification, ParsedErrorBody, Severity, Timestamp,
    DEFAULT_ERROR_MESSAGE, ERROR_TITLE,
};
