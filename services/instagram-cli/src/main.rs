//! Instagram CLI
//!
//! Runs one Instagram API operation per invocation:
//! 1. Loads the TOML config and resolves secrets from env or files
//! 2. Builds an `InstagramClient`
//! 3. Executes the requested command
//! 4. Prints the decoded JSON on stdout; logs go to stderr

mod cli;
mod config;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use instagram_graph::InstagramClient;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::config::Config;

/// Exit status for command-line usage errors (EX_USAGE)
const EXIT_USAGE: u8 = 64;

/// Exit status when the API reports an expired access token
const EXIT_TOKEN_EXPIRED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version arrive as errors that print to stdout
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{e:#}"), "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<ExitCode> {
    let prometheus = if args.metrics {
        Some(install_metrics_recorder()?)
    } else {
        None
    };

    let config_path = Config::resolve_path(args.config.as_deref());
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        client_id = %config.client.client_id,
        graph_base_url = %config.http.graph_base_url,
        has_client_secret = config.client.client_secret.is_some(),
        has_access_token = config.client.access_token.is_some(),
        "configuration loaded"
    );

    let client =
        InstagramClient::new(config.client_config()).context("failed to build HTTP client")?;

    let (result, rendered) = execute_and_render(&client, args.command, prometheus.as_ref()).await;
    if let Some(rendered) = rendered {
        eprint!("{rendered}");
    }

    let output = result.context("request failed")?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    if client.is_token_expired_error(&output) {
        warn!("access token has expired, run the authorization flow again");
        return Ok(ExitCode::from(EXIT_TOKEN_EXPIRED));
    }

    Ok(ExitCode::SUCCESS)
}

/// Run the command, then render metrics whether or not it succeeded.
async fn execute_and_render(
    client: &InstagramClient,
    command: cli::Command,
    prometheus: Option<&PrometheusHandle>,
) -> (instagram_graph::Result<serde_json::Value>, Option<String>) {
    let result = cli::execute(client, command).await;
    (result, prometheus.map(PrometheusHandle::render))
}

/// Install a process-wide Prometheus recorder for the client's request metrics.
fn install_metrics_recorder() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(instagram_graph::metrics::REQUEST_DURATION_SECONDS.to_string()),
            instagram_graph::metrics::DURATION_BUCKETS,
        )
        .context("invalid histogram buckets")?
        .install_recorder()
        .context("failed to install Prometheus recorder")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use instagram_graph::ClientConfig;

    #[tokio::test]
    async fn metrics_are_rendered_when_the_command_fails() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let _guard = metrics::set_default_local_recorder(&recorder);

        // Port 9 (discard) on localhost is closed in test environments
        let config = ClientConfig::new("app-123", "secret", None)
            .with_graph_base_url("http://127.0.0.1:9")
            .with_access_token("IGQV-token")
            .with_timeout(Duration::from_secs(2));
        let client = InstagramClient::new(config).unwrap();

        let (result, rendered) = execute_and_render(&client, cli::Command::Me, Some(&handle)).await;

        assert!(result.is_err(), "request to a closed port must fail");
        let rendered = rendered.expect("metrics requested");
        assert!(
            rendered.contains("instagram_transport_errors_total"),
            "failed request must be counted, got:\n{rendered}"
        );
    }

    #[tokio::test]
    async fn nothing_rendered_without_metrics_flag() {
        let config = ClientConfig::new("app-123", "secret", None);
        let client = InstagramClient::new(config).unwrap();

        let (result, rendered) = execute_and_render(&client, cli::Command::AuthorizeUrl, None).await;
        assert!(result.is_ok());
        assert!(rendered.is_none());
    }
}
