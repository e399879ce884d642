//! HTTP transport adapter.
//!
//! Implements the [`dispatch::Transport`] trait over `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Base-URL resolution, bearer authentication, default
//! headers, timeouts, and response-body decoding all live here. The
//! [`dispatch`] crate sees only [`dispatch::Transport`].
//!
//! ## Configuration
//!
//! [`TransportConfig::from_env`] reads:
//!
//! | Variable | Required | Meaning |
//! |----------|----------|---------|
//! | `API_BASE_URL` | yes | Base URL; any path prefix (e.g. `/v1`) is kept |
//! | `API_TOKEN` | no | Sent as `Authorization: Bearer <token>` |
//! | `API_TIMEOUT_SECS` | no | Default request timeout (30 s when unset) |
//! | `API_USER_AGENT` | no | Overrides the `User-Agent` header |

pub mod config;
pub mod http;

pub use config::{ConfigError, TransportConfig, DEFAULT_TIMEOUT};
pub use http::HttpTransport;
