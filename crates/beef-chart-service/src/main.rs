//! Beef Chart Service - HTTP API for the beef cut price map.
//!
//! This is the main entry point for the beef-chart service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use beef_chart_service::{create_router, AppState, ServiceConfig, StorageBackend};
use beef_chart_store::{MemoryStore, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,beef_chart=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Beef Chart Service");

    let config = ServiceConfig::from_env();
    let table_name = config.table_name()?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        backend = %config.storage_backend,
        table = %table_name,
        "Service configuration loaded"
    );

    let store = open_store(&config, table_name).await?;
    let state = AppState::new(store, config.clone());
    tracing::info!(admin_configured = state.has_admin_key(), "Application state built");

    // Later requests retry through the throttled check if this fails
    match state.provisioner.ensure_seeded().await {
        Ok(outcome) => tracing::info!(?outcome, "Catalog provisioned"),
        Err(e) => tracing::error!(error = %e, "Startup provisioning failed"),
    }

    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Open the configured record store.
async fn open_store(
    config: &ServiceConfig,
    table_name: String,
) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new(table_name)))
        }
        #[cfg(feature = "rocksdb-backend")]
        StorageBackend::RocksDb => {
            tracing::info!(path = %config.data_dir, "Opening RocksDB store");
            let store = beef_chart_store::RocksStore::open(&config.data_dir, table_name)?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "postgres-backend")]
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL is required for the postgres backend")?;
            tracing::info!("Connecting to PostgreSQL");
            let store = beef_chart_store::PgStore::connect(url, table_name).await?;
            Ok(Arc::new(store))
        }
        #[allow(unreachable_patterns)]
        other => Err(format!("storage backend {other} is not compiled in").into()),
    }
}
