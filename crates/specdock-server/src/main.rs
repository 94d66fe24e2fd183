//! `SpecDock` server entry point.
//!
//! Opens the configured storage backend, builds the router, and serves it
//! until SIGINT or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use specdock_storage::{MemoryBackend, SpecBackend};

use specdock_server::config::{ServerConfig, StorageBackendType};
use specdock_server::routes::build_router;
use specdock_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(storage = ?config.storage_backend, "SpecDock starting");

    let backend = open_backend(&config.storage_backend).await?;
    let state = Arc::new(AppState::new(backend));
    let app = build_router(state, &config);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "SpecDock server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("SpecDock server stopped");
    Ok(())
}

/// Open the storage backend named by the configuration.
async fn open_backend(kind: &StorageBackendType) -> anyhow::Result<Arc<dyn SpecBackend>> {
    let backend: Arc<dyn SpecBackend> = match kind {
        StorageBackendType::Memory => {
            info!("using in-memory storage (data will not persist)");
            Arc::new(MemoryBackend::new())
        }
        #[cfg(feature = "sqlite-backend")]
        StorageBackendType::Sqlite { path } => {
            info!(path = %path, "using SQLite storage");
            Arc::new(
                specdock_storage::SqliteBackend::open(path)
                    .await
                    .context("failed to open SQLite storage")?,
            )
        }
        #[cfg(not(feature = "sqlite-backend"))]
        StorageBackendType::Sqlite { .. } => {
            anyhow::bail!("SQLite backend requested but feature 'sqlite-backend' is not enabled");
        }
        #[cfg(feature = "postgres-backend")]
        StorageBackendType::Postgres { url } => {
            info!(url = %"[redacted]", "using PostgreSQL storage");
            Arc::new(
                specdock_storage::PostgresBackend::connect(url)
                    .await
                    .context("failed to connect to PostgreSQL storage")?,
            )
        }
        #[cfg(not(feature = "postgres-backend"))]
        StorageBackendType::Postgres { .. } => {
            anyhow::bail!(
                "PostgreSQL backend requested but feature 'postgres-backend' is not enabled"
            );
        }
    };
    Ok(backend)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
