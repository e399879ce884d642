//! Request options.
//!
//! [`FetchOptions`] is the transport-native part (method, headers, query,
//! body, timeout) and is passed to the transport verbatim. [`RequestOptions`]
//! wraps it with the two dispatcher-level controls: `silent` and the
//! response-error hook.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{HookError, OptionsError, ResponseErrorContext};

// ---------------------------------------------------------------------------
// HTTP method
// ---------------------------------------------------------------------------

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl HttpMethod {
    /// Returns the canonical upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
        }
    }

    /// Returns `true` if requests with this method may carry a body.
    pub fn allows_body(self) -> bool {
        !matches!(self, Self::Get | Self::Head)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "OPTIONS" => Ok(Self::Options),
            other => Err(format!("unsupported HTTP method '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport passthrough options
// ---------------------------------------------------------------------------

/// Transport-native request options.
///
/// Built through [`FetchOptions::builder`], which validates the combination
/// once; the transport can then trust every field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FetchOptions {
    method: HttpMethod,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<Value>,
    timeout: Option<Duration>,
}

impl FetchOptions {
    /// Returns a builder starting from a plain `GET`.
    pub fn builder() -> FetchOptionsBuilder {
        FetchOptionsBuilder::default()
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Extra request headers, in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Query parameters, in insertion order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// JSON request body.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Per-request timeout overriding the transport default.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Builder for [`FetchOptions`].
#[derive(Debug, Clone, Default)]
pub struct FetchOptionsBuilder {
    options: FetchOptions,
}

impl FetchOptionsBuilder {
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.options.method = method;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.query.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.options.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Validates and returns the options.
    ///
    /// # Errors
    ///
    /// - [`OptionsError::InvalidHeaderName`] for an empty header name or one
    ///   containing whitespace or `:`.
    /// - [`OptionsError::BodyNotAllowed`] for a body on `GET` or `HEAD`.
    /// - [`OptionsError::ZeroTimeout`] for a zero timeout.
    pub fn build(self) -> Result<FetchOptions, OptionsError> {
        let options = self.options;

        if let Some((name, _)) = options.headers.iter().find(|(name, _)| !is_valid_header_name(name)) {
            return Err(OptionsError::InvalidHeaderName { name: name.clone() });
        }
        if options.body.is_some() && !options.method.allows_body() {
            return Err(OptionsError::BodyNotAllowed {
                method: options.method,
            });
        }
        if options.timeout == Some(Duration::ZERO) {
            return Err(OptionsError::ZeroTimeout);
        }

        Ok(options)
    }
}

fn is_valid_header_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c.is_whitespace() || c == ':')
}

// ---------------------------------------------------------------------------
// Dispatcher-level options
// ---------------------------------------------------------------------------

/// Hook invoked on every error response before the built-in notifier.
///
/// Returning `Err` aborts error routing: the notifier is skipped and the hook
/// error becomes the request's error.
pub type ResponseErrorHook =
    Arc<dyn Fn(&ResponseErrorContext) -> Result<(), HookError> + Send + Sync>;

/// Options accepted by [`crate::RequestDispatcher::dispatch_reactive`].
#[derive(Clone, Default)]
pub struct RequestOptions {
    /// Passed to the transport verbatim.
    pub fetch: FetchOptions,
    /// When `true`, error responses are not forwarded to the notifier.
    pub silent: bool,
    /// Caller hook run before the notifier on every error response.
    pub on_response_error: Option<ResponseErrorHook>,
}

impl RequestOptions {
    /// Creates options wrapping the given transport options.
    pub fn new(fetch: FetchOptions) -> Self {
        Self {
            fetch,
            ..Self::default()
        }
    }

    /// Suppresses (or re-enables) error notifications.
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Installs a response-error hook.
    pub fn on_response_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ResponseErrorContext) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.on_response_error = Some(Arc::new(hook));
        self
    }
}

impl std::fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOptions")
            .field("fetch", &self.fetch)
            .field("silent", &self.silent)
            .field("on_response_error", &self.on_response_error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_is_plain_get() {
        let options = FetchOptions::builder().build().unwrap();
        assert_eq!(options.method(), HttpMethod::Get);
        assert!(options.headers().is_empty());
        assert!(options.body().is_none());
    }

    #[test]
    fn test_builder_keeps_insertion_order() {
        let options = FetchOptions::builder()
            .method(HttpMethod::Post)
            .header("X-A", "1")
            .header("X-B", "2")
            .query("page", "2")
            .body(json!({"name": "x"}))
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();

        assert_eq!(
            options.headers(),
            &[("X-A".to_owned(), "1".to_owned()), ("X-B".to_owned(), "2".to_owned())]
        );
        assert_eq!(options.query(), &[("page".to_owned(), "2".to_owned())]);
        assert_eq!(options.timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_rejects_invalid_header_names() {
        for name in ["", "Bad Name", "x:y"] {
            let err = FetchOptions::builder().header(name, "v").build().unwrap_err();
            assert_eq!(
                err,
                OptionsError::InvalidHeaderName {
                    name: name.to_owned()
                }
            );
        }
    }

    #[test]
    fn test_rejects_body_on_get_and_head() {
        for method in [HttpMethod::Get, HttpMethod::Head] {
            let err = FetchOptions::builder()
                .method(method)
                .body(json!({}))
                .build()
                .unwrap_err();
            assert_eq!(err, OptionsError::BodyNotAllowed { method });
        }
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = FetchOptions::builder().timeout(Duration::ZERO).build().unwrap_err();
        assert_eq!(err, OptionsError::ZeroTimeout);
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("patch".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert!("BREW".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_request_options_defaults() {
        let options = RequestOptions::default();
        assert!(!options.silent);
        assert!(options.on_response_error.is_none());
    }
}
