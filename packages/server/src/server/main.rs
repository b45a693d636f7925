// Main entry point for the reviewer assignment API server

use std::time::Duration;

use anyhow::{Context, Result};
use assignment::{AssignmentEngine, PostgresStore};
use review_server::{db, server::build_app, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,review_server=debug,assignment=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting reviewer assignment API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(env = %config.app_env, "Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = db::connect_with_retry(&config).await?;
    db::run_migrations(&pool).await?;

    // Build application
    let engine = AssignmentEngine::new(PostgresStore::from_pool(pool.clone()));
    let app = build_app(engine, config.request_timeout);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    let shutdown_timeout = config.shutdown_timeout;
    let (drained_tx, drained_rx) = tokio::sync::oneshot::channel::<()>();

    let server = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                tracing::info!(timeout_secs = shutdown_timeout.as_secs(), "Shutting down");
                let _ = drained_tx.send(());
            })
            .await
    };

    tokio::select! {
        result = server => result.context("Server error")?,
        _ = shutdown_deadline(drained_rx, shutdown_timeout) => {
            tracing::warn!("Shutdown timeout elapsed, dropping open connections");
        }
    }

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves once the shutdown signal fired and `timeout` has passed since.
async fn shutdown_deadline(started: tokio::sync::oneshot::Receiver<()>, timeout: Duration) {
    if started.await.is_err() {
        // Server finished without a signal
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(timeout).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
