//! reqwest-backed implementation of [`dispatch::Transport`].

use async_trait::async_trait;
use dispatch::{ApiPath, FetchOptions, HttpMethod, Transport, TransportError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method};
use serde_json::Value;

use crate::{ConfigError, TransportConfig};

/// HTTP transport resolving paths against a configured base URL.
///
/// Authentication, user agent, default headers, and the default timeout are
/// installed on the underlying client once, at construction.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Builds a transport from `config`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidHeader`] if a default header or the bearer
    ///   token is not a valid header value.
    /// - [`ConfigError::Client`] if the reqwest client cannot be built.
    pub fn new(config: TransportConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        for (name, value) in config.default_headers() {
            let invalid = || ConfigError::InvalidHeader { name: name.clone() };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            headers.append(header_name, header_value);
        }
        if let Some(token) = config.bearer_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                ConfigError::InvalidHeader {
                    name: AUTHORIZATION.to_string(),
                }
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent())
            .timeout(config.timeout())
            .build()?;

        Ok(Self::with_client(client, &config))
    }

    /// Wraps an existing client. Only the base URL is taken from `config`.
    pub fn with_client(client: Client, config: &TransportConfig) -> Self {
        Self {
            client,
            base_url: config.base_url().as_str().trim_end_matches('/').to_owned(),
        }
    }

    /// Full URL for `path`; any path prefix on the base URL is kept.
    pub fn url_for(&self, path: &ApiPath) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, path: &ApiPath, options: &FetchOptions) -> Result<Value, TransportError> {
        let url = self.url_for(path);
        tracing::debug!(url = %url, method = %options.method(), "Sending request");

        let mut request = self.client.request(to_method(options.method()), &url);
        for (name, value) in options.headers() {
            request = request.header(name.as_str(), value.as_str());
        }
        if !options.query().is_empty() {
            request = request.query(options.query());
        }
        if let Some(body) = options.body() {
            request = request.json(body);
        }
        if let Some(timeout) = options.timeout() {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        let body = parse_body(&bytes);

        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "Request succeeded");
            Ok(body.unwrap_or(Value::Null))
        } else {
            tracing::debug!(status = status.as_u16(), "Request returned error status");
            Err(TransportError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Options => Method::OPTIONS,
    }
}

/// Decodes a response body: JSON when it parses, otherwise the text as a JSON
/// string. Empty bodies yield `None`.
fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_builder() {
        TransportError::InvalidRequest {
            message: err.to_string(),
        }
    } else {
        TransportError::Network {
            message: err.to_string(),
        }
    }
}
