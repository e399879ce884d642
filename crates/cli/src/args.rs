//! Command-line arguments.

use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use dispatch::{FetchOptions, HttpMethod};
use transport::TransportConfig;

/// Call a JSON API through the request dispatcher.
#[derive(Debug, Parser)]
#[command(name = "apicall", version, about)]
pub struct Cli {
    /// API base URL. Falls back to `API_BASE_URL` and the other `API_*`
    /// variables when omitted.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Bearer token sent with every request (only with --base-url).
    #[arg(long, global = true, hide_env_values = true, env = "API_TOKEN")]
    pub token: Option<String>,

    /// Log output format (logs go to stderr; filter with RUST_LOG).
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a path and report errors as notifications.
    Fetch {
        /// Request path; a leading `/` is added when missing.
        path: String,

        #[command(flatten)]
        request: RequestArgs,

        /// Do not show error notifications.
        #[arg(long)]
        silent: bool,

        /// Number of additional refreshes after the first request.
        #[arg(long, default_value_t = 0)]
        refresh: u32,

        /// Delay between refreshes, in milliseconds.
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },

    /// Fetch a path once under a dedup key. Errors are printed, not notified.
    Once {
        /// Dedup key for the request.
        key: String,

        /// Request path; a leading `/` is added when missing.
        path: String,

        #[command(flatten)]
        request: RequestArgs,
    },
}

/// Transport options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct RequestArgs {
    /// HTTP method.
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: HttpMethod,

    /// Extra header as `Name: value`. Repeatable.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Query parameter as `key=value`. Repeatable.
    #[arg(short = 'q', long = "query", value_parser = parse_query)]
    pub query: Vec<(String, String)>,

    /// JSON request body.
    #[arg(long)]
    pub data: Option<String>,

    /// Per-request timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl RequestArgs {
    /// Builds validated transport options from the flags.
    pub fn to_fetch_options(&self) -> anyhow::Result<FetchOptions> {
        let mut builder = FetchOptions::builder().method(self.method);
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        for (key, value) in &self.query {
            builder = builder.query(key, value);
        }
        if let Some(raw) = &self.data {
            let body = serde_json::from_str(raw).context("--data is not valid JSON")?;
            builder = builder.body(body);
        }
        if let Some(ms) = self.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        Ok(builder.build()?)
    }
}

impl Cli {
    /// Resolves the transport configuration from flags or the environment.
    pub fn transport_config(&self) -> anyhow::Result<TransportConfig> {
        let config = match &self.base_url {
            Some(url) => {
                let config = TransportConfig::new(url)?;
                match &self.token {
                    Some(token) => config.with_bearer_token(token),
                    None => config,
                }
            }
            None => TransportConfig::from_env()?,
        };
        Ok(config)
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name: value', got '{raw}'"))?;
    Ok((name.trim().to_owned(), value.trim().to_owned()))
}

fn parse_query(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected 'key=value', got '{raw}'"))?;
    Ok((key.to_owned(), value.to_owned()))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_header_and_query() {
        assert_eq!(
            parse_header("X-Trace: abc"),
            Ok(("X-Trace".to_owned(), "abc".to_owned()))
        );
        assert!(parse_header("no-colon").is_err());
        assert_eq!(parse_query("page=2"), Ok(("page".to_owned(), "2".to_owned())));
        assert!(parse_query("page").is_err());
    }

    #[test]
    fn test_fetch_command_to_options() {
        let cli = Cli::try_parse_from([
            "apicall",
            "fetch",
            "users",
            "-X",
            "post",
            "-H",
            "X-Trace: abc",
            "-q",
            "dry_run=true",
            "--data",
            r#"{"name":"n"}"#,
            "--silent",
        ])
        .unwrap();

        let Command::Fetch {
            path,
            request,
            silent,
            ..
        } = cli.command
        else {
            panic!("expected fetch command");
        };
        assert_eq!(path, "users");
        assert!(silent);

        let options = request.to_fetch_options().unwrap();
        assert_eq!(options.method(), HttpMethod::Post);
        assert_eq!(options.headers(), &[("X-Trace".to_owned(), "abc".to_owned())]);
        assert_eq!(options.query(), &[("dry_run".to_owned(), "true".to_owned())]);
        assert_eq!(options.body(), Some(&json!({"name": "n"})));
    }

    #[test]
    fn test_body_on_get_is_rejected() {
        let cli = Cli::try_parse_from(["apicall", "once", "k", "users", "--data", "{}"]).unwrap();
        let Command::Once { request, .. } = cli.command else {
            panic!("expected once command");
        };
        assert!(request.to_fetch_options().is_err());
    }

    #[test]
    fn test_base_url_flag_builds_config() {
        let cli = Cli::try_parse_from([
            "apicall",
            "--base-url",
            "https://api.example.com/v1",
            "--token",
            "tok",
            "fetch",
            "health",
        ])
        .unwrap();

        let config = cli.transport_config().unwrap();
        assert_eq!(config.base_url().as_str(), "https://api.example.com/v1");
        assert_eq!(config.bearer_token(), Some("tok"));
    }
}
