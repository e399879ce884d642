//! Error types for the dispatcher and its ports.
//!
//! [`TransportError`] is what a [`crate::Transport`] reports; the dispatcher
//! never rewrites it. [`DispatchError`] is what callers see on a result handle:
//! a transport error, a decode failure, or a failure raised by a user hook.
//! [`OptionsError`] is returned when request options are built with invalid
//! values.

use serde_json::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Failure reported by a transport for a single request.
///
/// `Clone` so one in-flight result can be handed to every caller that joined
/// it through the [`crate::AsyncDataStore`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    ///
    /// `body` holds the parsed response body: JSON when it parses, otherwise
    /// the raw text as a JSON string. `None` when the body was empty.
    #[error("HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Parsed response body, if any.
        body: Option<Value>,
    },

    /// The request did not complete within its timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be sent or the response could not be read.
    #[error("Network error: {message}")]
    Network {
        /// Description of the underlying failure.
        message: String,
    },

    /// The transport refused to build the request (bad URL, bad header value).
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of the problem.
        message: String,
    },
}

impl TransportError {
    /// Returns the HTTP status when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the response body when the failure came from a response.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Hook errors
// ---------------------------------------------------------------------------

/// Failure raised by a caller-supplied response-error hook.
///
/// A hook failure propagates to the caller in place of the transport error
/// and suppresses the built-in notification for that response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Response error hook failed: {message}")]
pub struct HookError {
    /// Human-readable description supplied by the hook.
    pub message: String,
}

impl HookError {
    /// Creates a new [`HookError`].
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch errors
// ---------------------------------------------------------------------------

/// Errors surfaced on a dispatch result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// The transport reported a failure; passed through unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body could not be decoded into the requested type.
    #[error("Failed to decode response body: {message}")]
    Decode {
        /// The serde error message.
        message: String,
    },

    /// The caller's response-error hook failed.
    #[error(transparent)]
    Hook(#[from] HookError),
}

impl DispatchError {
    /// Returns the underlying transport error, if this is one.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Option validation errors
// ---------------------------------------------------------------------------

/// Errors produced when building [`crate::FetchOptions`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    /// A header name was empty or contained whitespace or `:`.
    #[error("Invalid header name: {name:?}")]
    InvalidHeaderName {
        /// The rejected header name.
        name: String,
    },

    /// A body was supplied for a method that does not carry one.
    #[error("{method} requests cannot carry a body")]
    BodyNotAllowed {
        /// The request method.
        method: crate::HttpMethod,
    },

    /// A zero timeout was supplied.
    #[error("Timeout must be greater than zero")]
    ZeroTimeout,
}
