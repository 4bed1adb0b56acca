mod cli;

use crate::cli::{LogFormatArg, CLI};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tunnel_core::SystemClock;
use tunnel_gateway::{App, AppState};
use tunnel_generator::RandomGenerator;
use tunnel_shortener::ShortenerService;
use tunnel_storage::{LinkLog, LogOptions, LogRepository, SyncMode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    init_tracing(config.log_format);

    info!(
        listen_addr = %config.listen_addr,
        log_path = %config.log_path.display(),
        base_url = %config.base_url,
        code_length = config.code_length,
        fsync = config.fsync,
        "starting gateway server"
    );

    let options = LogOptions {
        sync_mode: if config.fsync {
            SyncMode::Fsync
        } else {
            SyncMode::Flush
        },
    };
    let log = LinkLog::open_with(&config.log_path, options, SystemClock)
        .with_context(|| format!("failed to open link log {}", config.log_path.display()))?;

    let shortener = ShortenerService::new(
        LogRepository::new(log),
        RandomGenerator::with_length(config.code_length.into()),
    );
    let state = AppState::new(Arc::new(shortener), config.base_url);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

fn init_tracing(format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormatArg::Text => subscriber.init(),
        LogFormatArg::Json => subscriber.json().init(),
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
    }
}
