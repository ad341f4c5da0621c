//! rtr-bo - release-to-royalty back office service
//!
//! Loads configuration, opens the SQLite database and serves the HTTP API
//! until Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use rtr_bo::cli::Args;
use rtr_bo::{build_router, AppState};
use rtr_common::config::{default_config_path, load_config, write_toml_config, TomlConfig};
use rtr_common::db::init_database;
use std::sync::Mutex;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // A config file that does not exist yet is fine when it is about to be written
    let mut config = match args.config.as_deref() {
        Some(path) if args.write_config && !path.exists() => TomlConfig::default(),
        explicit => load_config(explicit).context("Failed to load configuration")?,
    };
    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    let default_directive = format!("rtr_bo={0},rtr_common={0},tower_http=info", config.logging.level);
    let file_layer = match &config.logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    if args.write_config {
        let path = args
            .config
            .clone()
            .or_else(default_config_path)
            .context("No configuration path available")?;
        write_toml_config(&config, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Configuration written to {}", path.display());
        return Ok(());
    }

    info!("Starting rtr-bo v{}", env!("CARGO_PKG_VERSION"));
    info!("Database path: {}", config.database_path.display());

    let pool = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    let addr = format!("{}:{}", config.bind_host, config.port);
    let state = AppState::new(pool, config).context("Failed to build application state")?;
    let shutdown = state.shutdown.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("rtr-bo listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM and cancels in-flight statement runs
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }

    shutdown.cancel();
}
