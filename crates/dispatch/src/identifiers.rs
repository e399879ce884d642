//! Newtype identifiers used by the dispatcher.
//!
//! A [`CacheKey`] and an [`ApiPath`] are both strings under the hood, but they
//! are never interchangeable: the key names a deduplicated request slot while
//! the path names the resource being fetched.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Identifies a one-shot request slot in the [`crate::AsyncDataStore`].
    ///
    /// Concurrent calls sharing a key join the same in-flight request.
    CacheKey
}

// ---------------------------------------------------------------------------

/// A request path that is guaranteed to begin with `/`.
///
/// There is no way to build an `ApiPath` without going through
/// [`ApiPath::normalize`], so every value handed to a transport is already
/// absolute from the API root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct ApiPath(String);

impl ApiPath {
    /// Normalizes `raw` by prefixing `/` when it is missing.
    ///
    /// Idempotent: normalizing an already-normalized path returns it unchanged.
    pub fn normalize(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.starts_with('/') {
            Self(raw)
        } else {
            Self(format!("/{raw}"))
        }
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the path and returns the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for ApiPath {
    fn from(raw: String) -> Self {
        Self::normalize(raw)
    }
}

impl From<ApiPath> for String {
    fn from(path: ApiPath) -> Self {
        path.0
    }
}

impl AsRef<str> for ApiPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ApiPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// Identifies a single dispatch (one transport round trip).
///
/// Generated fresh for every request; recorded on tracing spans and on
/// [`crate::ResponseErrorContext`] so hooks and logs can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new random request identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
