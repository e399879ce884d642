//! apicall CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration** — flags via `clap`, falling back to the `API_*`
//!    environment variables read by [`transport::TransportConfig::from_env`].
//! 2. **Wire observability** — `tracing-subscriber` with a text or JSON layer
//!    and an optional OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure** — an [`transport::HttpTransport`] and a
//!    [`notifier::TerminalNotifier`], injected into a
//!    [`dispatch::RequestDispatcher`].
//! 4. **Run the subcommand** — `fetch` (reactive, notifies on error responses)
//!    or `once` (keyed one-shot, errors printed by the caller).

mod args;
mod notifier;
mod observability;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use dispatch::{
    AsyncData, CacheKey, DispatchError, FetchStatus, ReactiveResult, RequestDispatcher,
    RequestOptions,
};
use serde_json::Value;
use transport::HttpTransport;

use crate::args::{Cli, Command};
use crate::notifier::TerminalNotifier;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = match observability::init(cli.log_format) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "apicall failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    };

    telemetry.shutdown();
    code
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = cli.transport_config()?;
    tracing::info!(config = ?config, "Transport configured");
    let transport = HttpTransport::new(config).context("building HTTP transport")?;
    let dispatcher = RequestDispatcher::new(Arc::new(transport), Arc::new(TerminalNotifier::stderr()));

    match cli.command {
        Command::Fetch {
            path,
            request,
            silent,
            refresh,
            interval_ms,
        } => {
            let options = RequestOptions::new(request.to_fetch_options()?).silent(silent);
            let result = dispatcher.dispatch_reactive::<Value>(path, options).await;
            print_reactive(&result)?;

            for _ in 0..refresh {
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                result.refresh().await;
                print_reactive(&result)?;
            }

            Ok(exit_code(result.status()))
        }
        Command::Once { key, path, request } => {
            let key = CacheKey::new(key).context("key must not be empty")?;
            let data = dispatcher
                .dispatch_once::<Value>(key, path, request.to_fetch_options()?)
                .await;
            print_once(&data)?;
            Ok(exit_code(data.status()))
        }
    }
}

/// Prints the payload; errors were already surfaced by the notifier.
fn print_reactive(result: &ReactiveResult<Value>) -> anyhow::Result<()> {
    if let Some(data) = result.data() {
        println!("{}", serde_json::to_string_pretty(&*data)?);
    }
    Ok(())
}

/// Prints the payload or, since one-shot calls never notify, the error.
fn print_once(data: &AsyncData<Value>) -> anyhow::Result<()> {
    if let Some(value) = data.data() {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    if let Some(err) = data.error() {
        eprintln!("error [{}]: {err}", data.key());
        if let DispatchError::Transport(transport_err) = err {
            if let Some(body) = transport_err.body() {
                eprintln!("{}", dispatch::ApiError::parse(body).description());
            }
        }
    }
    Ok(())
}

fn exit_code(status: FetchStatus) -> ExitCode {
    match status {
        FetchStatus::Success => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
