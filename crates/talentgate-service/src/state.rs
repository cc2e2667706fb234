//! Application state.

use std::sync::Arc;

use talentgate_store::Store;

use crate::config::ServiceConfig;

/// Application state shared across handlers.
///
/// The store handle is constructed exactly once at process start and
/// injected here; handlers never reach for a global.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend (real or null, chosen at startup).
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        if config.service_api_key.is_none() {
            tracing::warn!("SERVICE_API_KEY not configured - internal routes will reject requests");
        }
        if config.payment_webhook_secret.is_none() {
            tracing::warn!(
                "PAYMENT_WEBHOOK_SECRET not configured - webhook deliveries will be refused"
            );
        }

        Self { store, config }
    }
}
