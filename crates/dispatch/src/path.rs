//! Request path specifications and their normalization.
//!
//! A caller names the resource to fetch either with a literal string or with a
//! resolver closure. Resolvers are evaluated lazily, every time the path is
//! needed, so a path built from changing state (a selected id, a page cursor)
//! always reflects the value current at request time.

use std::sync::Arc;

use crate::ApiPath;

/// Zero-argument resolver producing a raw (possibly un-prefixed) path.
pub type PathResolver = Arc<dyn Fn() -> String + Send + Sync>;

/// How the caller specifies the target path of a request.
#[derive(Clone)]
pub enum PathSpec {
    /// A fixed path string.
    Literal(String),
    /// A path recomputed on every resolution.
    Lazy(PathResolver),
}

impl PathSpec {
    /// Creates a lazily-resolved path spec from a closure.
    pub fn lazy<F>(resolver: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self::Lazy(Arc::new(resolver))
    }
}

impl From<&str> for PathSpec {
    fn from(path: &str) -> Self {
        Self::Literal(path.to_owned())
    }
}

impl From<String> for PathSpec {
    fn from(path: String) -> Self {
        Self::Literal(path)
    }
}

impl From<&String> for PathSpec {
    fn from(path: &String) -> Self {
        Self::Literal(path.clone())
    }
}

impl From<ApiPath> for PathSpec {
    fn from(path: ApiPath) -> Self {
        Self::Literal(path.into_string())
    }
}

impl std::fmt::Debug for PathSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(path) => f.debug_tuple("Literal").field(path).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

// ---------------------------------------------------------------------------

/// A path spec after normalization.
///
/// Literals are normalized once; deferred paths wrap the original resolver and
/// normalize its output on each [`NormalizedPath::resolve`].
#[derive(Clone)]
pub enum NormalizedPath {
    /// A literal path, prefixed at normalization time.
    Fixed(ApiPath),
    /// A resolver whose output is prefixed on every call.
    Deferred(Arc<dyn Fn() -> ApiPath + Send + Sync>),
}

impl NormalizedPath {
    /// Resolves the path for a single request.
    ///
    /// For [`NormalizedPath::Deferred`] this calls the underlying resolver
    /// again; nothing is cached between calls. A panicking resolver is not
    /// intercepted.
    pub fn resolve(&self) -> ApiPath {
        match self {
            Self::Fixed(path) => path.clone(),
            Self::Deferred(resolver) => resolver(),
        }
    }

    /// Returns `true` if the path is recomputed on every resolution.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

impl std::fmt::Debug for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(path) => f.debug_tuple("Fixed").field(path).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Prefixes `raw` with `/` when it does not already start with one.
pub fn normalize(raw: &str) -> String {
    ApiPath::normalize(raw).into_string()
}

/// Normalizes a [`PathSpec`].
///
/// A literal is prefixed immediately. A lazy spec becomes a deferred resolver
/// that calls the original resolver and prefixes the result each time it is
/// invoked.
pub fn normalize_path(spec: PathSpec) -> NormalizedPath {
    match spec {
        PathSpec::Literal(raw) => NormalizedPath::Fixed(ApiPath::normalize(raw)),
        PathSpec::Lazy(resolver) => {
            NormalizedPath::Deferred(Arc::new(move || ApiPath::normalize(resolver())))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["", "/", "users", "/users", "users/1?x=y", "//double"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "raw = {raw:?}");
        }
    }

    #[test]
    fn test_normalize_always_prefixes() {
        for raw in ["", "a", "a/b", " space", "/already"] {
            assert!(normalize(raw).starts_with('/'), "raw = {raw:?}");
        }
        assert_eq!(normalize("/already"), "/already");
        assert_eq!(normalize("a/b"), "/a/b");
    }

    #[test]
    fn test_literal_spec_is_fixed() {
        let normalized = normalize_path("users/1".into());
        assert!(!normalized.is_deferred());
        assert_eq!(normalized.resolve().as_str(), "/users/1");
    }

    #[test]
    fn test_lazy_spec_reevaluates_on_each_resolve() {
        let current = Arc::new(AtomicU64::new(5));
        let source = Arc::clone(&current);
        let normalized =
            normalize_path(PathSpec::lazy(move || format!("orders/{}", source.load(Ordering::SeqCst))));

        assert!(normalized.is_deferred());
        assert_eq!(normalized.resolve().as_str(), "/orders/5");

        current.store(6, Ordering::SeqCst);
        assert_eq!(normalized.resolve().as_str(), "/orders/6");
    }

    #[test]
    fn test_lazy_spec_switching_between_prefixed_and_bare() {
        let toggle = Arc::new(AtomicU64::new(0));
        let source = Arc::clone(&toggle);
        let normalized = normalize_path(PathSpec::lazy(move || {
            if source.load(Ordering::SeqCst) == 0 {
                "bare".to_owned()
            } else {
                "/prefixed".to_owned()
            }
        }));

        assert_eq!(normalized.resolve().as_str(), "/bare");
        toggle.store(1, Ordering::SeqCst);
        assert_eq!(normalized.resolve().as_str(), "/prefixed");
    }
}
