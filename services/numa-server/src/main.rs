//! Numa Server
//!
//! HTTP entry point: loads configuration, wires the Financial Intent Motor
//! and Ledger into an Orchestrator, and serves the API façade.
//!
//! # Usage
//!
//! ```bash
//! numa-server
//! numa-server --config /path/to/config.toml
//! NUMA__SERVER__PORT=8080 numa-server
//! ```

mod config;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use numa_api::{
    create_router,
    state::{ApiConfig, AppState},
};
use numa_guard::Guard;
use numa_intent::{
    DeterministicDocumentAnalyzer, DeterministicReasoning, DeterministicTranscription,
    FinancialIntentMotor, FimConfig, HttpReasoning, HttpTranscription, Reasoning, Transcription,
};
use numa_ledger::Ledger;
use numa_orchestrator::{FimCategoryClassifier, Orchestrator};

use crate::config::ServerConfig;

/// Numa Server - voice-first personal finance assistant API
#[derive(Parser, Debug)]
#[command(name = "numa-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "NUMA_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "NUMA_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "NUMA_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "NUMA_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, env = "NUMA_LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    /// Base URL of an OpenAI-compatible reasoning/completions endpoint.
    /// When unset, a deterministic echo stands in (suitable for local dev
    /// and demos, never for production).
    #[arg(long, env = "NUMA_REASONING_BASE_URL")]
    reasoning_base_url: Option<String>,

    /// API key for the reasoning endpoint.
    #[arg(long, env = "NUMA_REASONING_API_KEY")]
    reasoning_api_key: Option<String>,

    /// Base URL of an OpenAI-compatible speech-to-text endpoint. When
    /// unset, uploaded audio is treated as already-transcribed UTF-8 text.
    #[arg(long, env = "NUMA_STT_BASE_URL")]
    stt_base_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        server_config.server.host = host;
    }
    if let Some(port) = args.port {
        server_config.server.port = port;
    }
    server_config.logging.level = args.log_level;
    server_config.logging.format = args.log_format;

    init_logging(&server_config.logging)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Numa Server");

    validate_config(&server_config)?;

    let orchestrator = build_orchestrator(
        &server_config,
        args.reasoning_base_url,
        args.reasoning_api_key,
        args.stt_base_url,
    );
    let state = Arc::new(AppState::new(Arc::new(orchestrator)));
    let api_config = ApiConfig {
        enable_cors: server_config.api.enable_cors,
        cors_origins: server_config.api.cors_origins.clone(),
    };

    let app = create_router(state, api_config);

    let addr = server_config.server.socket_addr();
    tracing::info!(host = %server_config.server.host, port = %server_config.server.port, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(server_config.server.shutdown_timeout()))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber.with(fmt::layer().json().with_target(true)).init();
        }
        _ => {
            subscriber.with(fmt::layer().pretty().with_target(true)).init();
        }
    }
    Ok(())
}

fn validate_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.auth.secret == "change-me-in-production" {
        tracing::warn!("auth.secret is still the development default");
    }
    Ok(())
}

fn build_orchestrator(
    config: &ServerConfig,
    reasoning_base_url: Option<String>,
    reasoning_api_key: Option<String>,
    stt_base_url: Option<String>,
) -> Orchestrator {
    let fim_config = FimConfig {
        stt_language: config.fim.stt_language.clone(),
        stt_model: config.fim.stt_model.clone(),
        reasoning_model: config.fim.reasoning_model.clone(),
        confidence_threshold: config.ledger.confidence_threshold,
        ant_expense_threshold: rust_decimal::Decimal::try_from(config.ledger.ant_expense_threshold)
            .unwrap_or_else(|_| rust_decimal::Decimal::from(200)),
    };

    let transcription: Arc<dyn Transcription> = match stt_base_url {
        Some(base_url) => {
            tracing::info!("using HTTP speech-to-text provider");
            Arc::new(HttpTranscription::new(base_url))
        }
        None => {
            tracing::warn!("no STT provider configured, audio is treated as raw UTF-8 text");
            Arc::new(DeterministicTranscription)
        }
    };

    let reasoning: Arc<dyn Reasoning> = match reasoning_base_url {
        Some(base_url) => {
            tracing::info!("using HTTP reasoning provider");
            Arc::new(HttpReasoning::new(base_url, reasoning_api_key))
        }
        None => {
            tracing::warn!("no reasoning provider configured, responses echo precomputed context");
            Arc::new(DeterministicReasoning)
        }
    };

    let fim = Arc::new(FinancialIntentMotor::new(
        transcription,
        reasoning,
        Arc::new(DeterministicDocumentAnalyzer),
        fim_config,
    ));

    let ledger = Ledger::new(Arc::new(FimCategoryClassifier::new(fim.clone())))
        .with_confidence_threshold(config.ledger.confidence_threshold);

    Orchestrator::new(ledger, fim, Guard::new(), Duration::from_millis(config.request.deadline_ms))
}

async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => tracing::info!("received SIGTERM, initiating graceful shutdown"),
    }

    tracing::info!(timeout_secs = timeout.as_secs(), "waiting for in-flight requests to complete");
    tokio::time::sleep(timeout).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_port_override() {
        let args = Args::parse_from(["numa-server", "--port", "8080"]);
        assert_eq!(args.port, Some(8080));
    }

    #[test]
    fn default_config_has_expected_deadline() {
        let config = ServerConfig::default();
        assert_eq!(config.request.deadline_ms, 8000);
    }
}
