//! OCS-AI Server
//!
//! Local HTTP service that answers quiz questions through an
//! OpenAI-compatible chat-completion endpoint.

use anyhow::Context;
use clap::Parser;
use ocs_api::{create_router, server, state::AppState};
use ocs_core::{default_config_path, ensure_config_file, AppConfig, LoggingConfig};
use ocs_llm::OpenAiChatClient;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ocs-ai")]
#[command(about = "Local AI quiz-answering service")]
#[command(version)]
struct Cli {
    /// Config file (defaults to config.toml next to the executable)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);

    let created = ensure_config_file(&config_path).context("Failed to create default config")?;
    let config = AppConfig::from_file(&config_path)
        .and_then(AppConfig::with_env_override)
        .context("Failed to load config")?;

    init_tracing(&config.logging);

    tracing::info!("Starting OCS-AI service...");
    if created {
        tracing::info!(path = %config_path.display(), "Created default config file");
    }
    tracing::info!(path = %config_path.display(), "Using config file");

    let chat_client =
        OpenAiChatClient::from_config(&config.ai).context("Failed to create chat client")?;
    let addr = config.bind_addr();

    let state = Arc::new(AppState::new(config, Arc::new(chat_client)));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("HTTP server listening on {}", addr);
    print_usage(&addr);

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            server::shutdown_signal().await;
            tracing::info!("Received shutdown signal, shutting down...");
            shutdown.cancel();
        }
    });

    server::run(listener, app, shutdown, server::SHUTDOWN_GRACE).await
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter_directive()));

    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn print_usage(addr: &str) {
    let base = format!("http://{addr}");
    tracing::info!("API address: {}", base);
    tracing::info!("Set the question bank URL in your script to {}/query", base);
    tracing::info!("Health check: {}/health", base);
    tracing::info!("Press Ctrl+C to stop");
}
