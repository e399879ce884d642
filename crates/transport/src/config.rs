//! Configuration for [`crate::HttpTransport`].

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

/// Environment variable holding the API base URL (required).
pub const ENV_BASE_URL: &str = "API_BASE_URL";
/// Environment variable holding the bearer token (optional).
pub const ENV_TOKEN: &str = "API_TOKEN";
/// Environment variable holding the default timeout in whole seconds (optional).
pub const ENV_TIMEOUT_SECS: &str = "API_TIMEOUT_SECS";
/// Environment variable overriding the `User-Agent` header (optional).
pub const ENV_USER_AGENT: &str = "API_USER_AGENT";

/// Timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors produced while building a transport configuration or client.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL was not provided.
    #[error("Missing base URL (set API_BASE_URL)")]
    MissingBaseUrl,

    /// The base URL could not be parsed or does not use http(s).
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The timeout value was not a positive integer number of seconds.
    #[error("Invalid timeout '{value}': expected a positive number of seconds")]
    InvalidTimeout {
        /// The rejected value.
        value: String,
    },

    /// A default header name or value was rejected.
    #[error("Invalid default header '{name}'")]
    InvalidHeader {
        /// The header name.
        name: String,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Settings for an [`crate::HttpTransport`].
#[derive(Clone)]
pub struct TransportConfig {
    base_url: Url,
    bearer_token: Option<String>,
    timeout: Duration,
    user_agent: String,
    default_headers: Vec<(String, String)>,
}

impl TransportConfig {
    /// Creates a configuration for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidBaseUrl`] if the URL does not parse, its scheme
    /// is not `http` or `https`, or it carries a query or fragment.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        // Request paths are appended to the base, which a query or fragment would swallow.
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "must not carry a query or fragment".to_owned(),
            });
        }

        Ok(Self {
            base_url: parsed,
            bearer_token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("apicall/", env!("CARGO_PKG_VERSION")).to_owned(),
            default_headers: Vec::new(),
        })
    }

    /// Loads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_BASE_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;
        let mut config = Self::new(base_url.trim())?;

        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.is_empty()) {
            config = config.with_bearer_token(token);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config = config.with_timeout(parse_timeout(&raw)?);
        }
        if let Some(agent) = lookup(ENV_USER_AGENT).filter(|v| !v.is_empty()) {
            config = config.with_user_agent(agent);
        }

        Ok(config)
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }
}

impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportConfig")
            .field("base_url", &self.base_url.as_str())
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("default_headers", &self.default_headers)
            .finish()
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            value: raw.to_owned(),
        }),
    }
}
