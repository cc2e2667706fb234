//! TalentGate credit service entry point.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use talentgate_service::{create_router, AppState, ServiceConfig};
use talentgate_store::{NullStore, RocksStore, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,talentgate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TalentGate credit service");

    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = ?config.data_dir,
        webhook_configured = %config.payment_webhook_secret.is_some(),
        "Service configuration loaded"
    );

    let store: Arc<dyn Store> = match &config.data_dir {
        Some(path) => {
            tracing::info!(path = %path, "Opening RocksDB store");
            Arc::new(RocksStore::open(path)?)
        }
        None => {
            tracing::warn!("DATA_DIR not set - running on the null store, all credit operations will report 503");
            Arc::new(NullStore)
        }
    };

    let state = AppState::new(store, config.clone());
    let app = create_router(state);

    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
