//! Port traits implemented by infrastructure crates.
//!
//! The dispatcher depends only on these two traits. The HTTP adapter in the
//! `transport` crate implements [`Transport`]; applications supply a
//! [`Notifier`] for whatever surface they render messages on.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::{ApiPath, FetchOptions, Notification, TransportError};

/// Performs the actual network request for a normalized path.
///
/// Implementations attach authentication, resolve the base URL, and decode the
/// response body as JSON (`Value::Null` for an empty body).
///
/// ## Contract
///
/// A non-2xx response must be reported as [`TransportError::Status`] carrying
/// the parsed body, so response-error hooks can inspect it.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request and returns the decoded response body.
    async fn fetch(&self, path: &ApiPath, options: &FetchOptions) -> Result<Value, TransportError>;

    /// Name of this transport, used in logs.
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn fetch(&self, path: &ApiPath, options: &FetchOptions) -> Result<Value, TransportError> {
        (**self).fetch(path, options).await
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Renders a transient message to the user.
///
/// Fire-and-forget: the dispatcher ignores whatever happens after the call.
/// A panicking notifier is not caught.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

/// A notifier that drops every message.
///
/// Useful for callers that only ever dispatch silently.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// A notifier that forwards messages to `tracing` at a level matching the
/// severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        use crate::Severity;

        match notification.severity {
            Severity::Error => tracing::error!(
                title = %notification.title,
                description = %notification.description,
                "Notification"
            ),
            Severity::Warning => tracing::warn!(
                title = %notification.title,
                description = %notification.description,
                "Notification"
            ),
            Severity::Info | Severity::Success => tracing::info!(
                title = %notification.title,
                description = %notification.description,
                "Notification"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    struct Echo;

    #[async_trait]
    impl Transport for Echo {
        async fn fetch(&self, path: &ApiPath, _options: &FetchOptions) -> Result<Value, TransportError> {
            Ok(json!({"path": path.as_str()}))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[derive(Default)]
    struct Counting(Mutex<usize>);

    impl Notifier for Counting {
        fn notify(&self, _notification: Notification) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[tokio::test]
    async fn test_arc_transport_delegates() {
        let transport: Arc<dyn Transport> = Arc::new(Echo);
        let shared = Arc::new(transport);
        let body = shared
            .fetch(&ApiPath::normalize("x"), &FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(body, json!({"path": "/x"}));
        assert_eq!(shared.name(), "echo");
    }

    #[test]
    fn test_arc_notifier_delegates() {
        let counting = Arc::new(Counting::default());
        let notifier: Arc<dyn Notifier> = counting.clone();
        notifier.notify(Notification::error("a"));
        Arc::new(notifier).notify(Notification::error("b"));
        assert_eq!(*counting.0.lock().unwrap(), 2);
    }

    #[test]
    fn test_builtin_notifiers_handle_notifications() {
        for notification in [
            Notification::error("e"),
            Notification {
                severity: crate::Severity::Info,
                ..Notification::error("i")
            },
        ] {
            NullNotifier.notify(notification.clone());
            TracingNotifier.notify(notification);
        }
    }
}
