//! Shared value types: API error bodies, notifications, and request status.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Title used for every error notification raised by the dispatcher.
pub const ERROR_TITLE: &str = "Error";

/// Description used when an error body carries no usable message.
pub const DEFAULT_ERROR_MESSAGE: &str = "An unexpected error occurred";

// ---------------------------------------------------------------------------
// Error bodies
// ---------------------------------------------------------------------------

/// The expected shape of a failure response body.
///
/// `error` is the primary, machine-oriented message; `message` is an optional
/// human-oriented fallback; `details` carries per-field information such as
/// validation failures.
///
/// Each field is read leniently: a field with an unexpected type is treated
/// as absent instead of failing the whole body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiError {
    /// Primary error message. Empty when the server omitted it or sent a
    /// non-string value.
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: String,

    /// Optional secondary message.
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,

    /// Optional per-field details. Non-string values are kept as their JSON
    /// text (e.g. `["required"]`).
    #[serde(
        default,
        deserialize_with = "lenient_details",
        skip_serializing_if = "Option::is_none"
    )]
    pub details: Option<BTreeMap<String, String>>,
}

impl ApiError {
    /// Attempts to interpret a raw response body as an [`ApiError`].
    ///
    /// Every JSON object is accepted, with mistyped fields read as absent.
    /// Anything else (strings, arrays, numbers, `null`) is returned untouched
    /// as [`ParsedErrorBody::Unparsed`].
    pub fn parse(body: &Value) -> ParsedErrorBody {
        if !body.is_object() {
            return ParsedErrorBody::Unparsed(body.clone());
        }
        match serde_json::from_value::<ApiError>(body.clone()) {
            Ok(parsed) => ParsedErrorBody::Parsed(parsed),
            Err(_) => ParsedErrorBody::Unparsed(body.clone()),
        }
    }

    /// Returns the best human-readable message carried by this error, if any.
    ///
    /// Prefers `error`, then `message`; empty strings count as absent.
    pub fn best_message(&self) -> Option<&str> {
        Some(self.error.as_str())
            .filter(|e| !e.is_empty())
            .or_else(|| self.message.as_deref().filter(|m| !m.is_empty()))
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_optional_string(deserializer)?.unwrap_or_default())
}

fn lenient_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

fn lenient_details<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(fields) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    let details = fields
        .into_iter()
        .map(|(name, value)| match value {
            Value::String(text) => (name, text),
            other => (name, other.to_string()),
        })
        .collect();
    Ok(Some(details))
}

/// Outcome of the explicit error-body parse step.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedErrorBody {
    /// The body matched the [`ApiError`] shape.
    Parsed(ApiError),
    /// The body did not match; the raw value is preserved.
    Unparsed(Value),
}

impl ParsedErrorBody {
    /// Returns the text to show the user for this body.
    ///
    /// Falls back to [`DEFAULT_ERROR_MESSAGE`] for unparsed bodies and for
    /// parsed bodies without a usable message.
    pub fn description(&self) -> &str {
        match self {
            Self::Parsed(error) => error.best_message().unwrap_or(DEFAULT_ERROR_MESSAGE),
            Self::Unparsed(_) => DEFAULT_ERROR_MESSAGE,
        }
    }

    /// Returns the parsed error, if the body matched.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Parsed(error) => Some(error),
            Self::Unparsed(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Neutral information.
    Info,
    /// A completed action.
    Success,
    /// Something the user should look at.
    Warning,
    /// A failed action.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// A transient, user-facing message handed to a [`crate::Notifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Short heading (e.g. `"Error"`).
    pub title: String,
    /// Body text.
    pub description: String,
    /// Severity used to style the message.
    pub severity: Severity,
    /// When the notification was raised.
    pub raised_at: Timestamp,
}

impl Notification {
    /// Creates an error-severity notification with the standard title.
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: ERROR_TITLE.to_owned(),
            description: description.into(),
            severity: Severity::Error,
            raised_at: Timestamp::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Request status
// ---------------------------------------------------------------------------

/// Lifecycle status of a fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// No request has been issued yet.
    Idle,
    /// A request is in flight.
    Pending,
    /// The last request succeeded.
    Success,
    /// The last request failed.
    Error,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_description_fallback_order() {
        assert_eq!(ApiError::parse(&json!({"error": "A"})).description(), "A");
        assert_eq!(ApiError::parse(&json!({"message": "B"})).description(), "B");
        assert_eq!(ApiError::parse(&json!({})).description(), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn test_error_wins_over_message() {
        let body = json!({"error": "A", "message": "B"});
        assert_eq!(ApiError::parse(&body).description(), "A");
    }

    #[test]
    fn test_empty_error_falls_back_to_message() {
        let body = json!({"error": "", "message": "B"});
        assert_eq!(ApiError::parse(&body).description(), "B");
    }

    #[test]
    fn test_parse_keeps_details() {
        let body = json!({"error": "invalid", "details": {"email": "required"}});
        let parsed = ApiError::parse(&body);
        let details = parsed.as_api_error().and_then(|e| e.details.clone()).unwrap();
        assert_eq!(details.get("email").map(String::as_str), Some("required"));
    }

    #[test]
    fn test_non_object_bodies_are_unparsed() {
        for body in [json!("plain text"), json!([1, 2]), json!(null), json!(3)] {
            let parsed = ApiError::parse(&body);
            assert_eq!(parsed, ParsedErrorBody::Unparsed(body));
            assert_eq!(parsed.description(), DEFAULT_ERROR_MESSAGE);
        }
    }

    #[test]
    fn test_mistyped_error_is_read_as_absent() {
        assert_eq!(ApiError::parse(&json!({"error": 42})).description(), DEFAULT_ERROR_MESSAGE);
        assert_eq!(
            ApiError::parse(&json!({"error": null, "message": "B"})).description(),
            "B"
        );
    }

    #[test]
    fn test_non_string_details_do_not_hide_error() {
        let body = json!({"error": "bad", "details": {"email": ["required"], "name": "missing"}});
        let parsed = ApiError::parse(&body);
        assert_eq!(parsed.description(), "bad");

        let details = parsed.as_api_error().and_then(|e| e.details.clone()).unwrap();
        assert_eq!(details.get("email").map(String::as_str), Some(r#"["required"]"#));
        assert_eq!(details.get("name").map(String::as_str), Some("missing"));
    }

    #[test]
    fn test_non_object_details_are_dropped() {
        let parsed = ApiError::parse(&json!({"error": "bad", "details": "see logs"}));
        assert_eq!(parsed.as_api_error().and_then(|e| e.details.clone()), None);
        assert_eq!(parsed.description(), "bad");
    }

    #[test]
    fn test_error_notification_shape() {
        let n = Notification::error("not found");
        assert_eq!(n.title, ERROR_TITLE);
        assert_eq!(n.description, "not found");
        assert_eq!(n.severity, Severity::Error);
    }
}
