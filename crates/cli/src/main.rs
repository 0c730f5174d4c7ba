//! Issue triager entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Load configuration** from the environment and validate it.
//! 2. **Wire observability**: `tracing-subscriber` with a JSON (or pretty) layer
//!    and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an OpenTelemetry OTLP
//!    exporter. All spans and events emitted by every crate in the workspace
//!    flow through this subscriber.
//! 3. **Construct infrastructure**: `GithubClient`, the optional
//!    `TextAnalyticsClient`, and the shared `ArtifactLabelTable`, injected into
//!    the `LabelDeriver` and `IssueEventHandler`.
//! 4. **Serve** the webhook router until Ctrl-C or SIGTERM.

mod config;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use config::AppConfig;
use github::GithubClient;
use handler::IssueEventHandler;
use listener::AppState;
use text_analytics::TextAnalyticsClient;
use triage::{ArtifactLabelTable, IssueTracker, KeyPhraseExtractor, LabelDeriver};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    let provider = telemetry::init(config.log_format, config.otlp_endpoint.as_deref())?;

    let result = run(config).await;
    if let Err(err) = &result {
        tracing::error!(error = %err, "Issue triager stopped with an error");
    }
    telemetry::shutdown(provider);
    result
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    // Install the rustls CryptoProvider before any TLS client is constructed.
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install default CryptoProvider"))?;

    let tracker: Arc<dyn IssueTracker> =
        Arc::new(GithubClient::from_config(&config.github).context("building GitHub client")?);

    let extractor: Option<Arc<dyn KeyPhraseExtractor>> = match &config.text_analytics {
        Some(ta) => {
            let client: Arc<dyn KeyPhraseExtractor> = Arc::new(
                TextAnalyticsClient::new(ta).context("building text-analytics client")?,
            );
            Some(client)
        }
        None => {
            info!("Text analytics not configured, key-phrase labels disabled");
            None
        }
    };

    let deriver = LabelDeriver::new(Arc::new(ArtifactLabelTable::default_table()), extractor);
    let handler = IssueEventHandler::new(deriver, tracker);
    let app = listener::router(AppState::new(handler, config.webhook_secret.into_bytes()));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(address = %config.bind, "Listening for GitHub webhooks");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("webhook server failed")?;
    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
