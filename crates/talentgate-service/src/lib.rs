//! TalentGate credit service HTTP API.
//!
//! Exposes the consumption gate, replenishment, and account provisioning
//! routes used by the rest of the recruiting platform, plus the
//! payment-provider webhook endpoint with verified, idempotent ingestion.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
