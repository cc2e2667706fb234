//! Router configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, consumption, credits, health, webhooks};
use crate::state::AppState;

/// Maximum concurrent requests for internal API endpoints. The consume route
/// sits on the hot path of every profile analysis, so the limit sheds load
/// before the store does.
const API_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Internal (service API key auth)
/// - `POST /v1/accounts` - Provision a credit account at signup
/// - `GET /v1/accounts/{account_id}/balance` - Current balance and plan
/// - `POST /v1/accounts/{account_id}/consume` - Consumption gate
/// - `POST /v1/accounts/{account_id}/credits` - Add purchased credits
/// - `POST /v1/accounts/{account_id}/subscription` - Upgrade to unlimited
/// - `GET /v1/accounts/{account_id}/ledger` - Ledger history
/// - `GET /v1/accounts/{account_id}/usage` - Usage history
///
/// ## Webhooks (signature verification)
/// - `POST /webhooks/payments` - Payment provider deliveries
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/accounts", post(accounts::create_account))
        .route("/accounts/:account_id/balance", get(accounts::get_balance))
        .route("/accounts/:account_id/consume", post(consumption::consume))
        .route("/accounts/:account_id/credits", post(credits::add_credits))
        .route(
            "/accounts/:account_id/subscription",
            post(credits::upgrade_subscription),
        )
        .route("/accounts/:account_id/ledger", get(credits::list_ledger))
        .route("/accounts/:account_id/usage", get(consumption::list_usage))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", api_routes)
        // Webhook retries are paced by the provider, not by us.
        .route("/webhooks/payments", post(webhooks::payment_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
