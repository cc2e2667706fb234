//! Payment-provider webhook handler.
//!
//! Deliveries are authenticated by signature, not API key, so the raw body
//! must be read before JSON parsing: the signature covers the exact bytes
//! on the wire. Every recognized event passes through the store's
//! single-transaction idempotency gate, so the provider may retry deliveries
//! freely.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use talentgate_core::{AccountId, ReplenishmentEffect};
use talentgate_store::EventOutcome;

use crate::crypto;
use crate::error::ApiError;
use crate::state::AppState;

/// Payment webhook envelope, as delivered by the provider.
#[derive(Debug, Deserialize)]
pub struct PaymentWebhook {
    /// Provider-assigned event id, the idempotency key.
    pub id: String,
    /// Event type, e.g. `checkout.completed`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload.
    pub data: serde_json::Value,
}

/// `checkout.completed` payload.
#[derive(Debug, Deserialize)]
struct CheckoutCompleted {
    account_id: AccountId,
    credits: i64,
    #[serde(default)]
    metadata: serde_json::Value,
}

/// `subscription.activated` payload.
#[derive(Debug, Deserialize)]
struct SubscriptionActivated {
    account_id: AccountId,
    #[serde(default)]
    metadata: serde_json::Value,
}

/// Webhook acknowledgement.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Always true on 2xx; the provider only needs the status code.
    pub received: bool,
    /// Whether this delivery was a retry of an already-processed event.
    pub deduplicated: bool,
}

/// Receive a payment-provider webhook delivery.
pub async fn payment_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    let secret = state
        .config
        .payment_webhook_secret
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("webhook secret is not configured".into()))?;

    let signature = headers
        .get("x-payment-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("missing x-payment-signature header".into()))?;

    crypto::verify_signature(
        secret,
        &body,
        signature,
        state.config.webhook_tolerance_seconds,
        chrono::Utc::now().timestamp(),
    )
    .map_err(|err| {
        tracing::warn!(error = %err, "Webhook signature verification failed");
        ApiError::InvalidSignature
    })?;

    let event: PaymentWebhook = serde_json::from_str(&body)
        .map_err(|err| ApiError::BadRequest(format!("invalid webhook payload: {err}")))?;

    let effect = match event.event_type.as_str() {
        "checkout.completed" => {
            let payload: CheckoutCompleted = serde_json::from_value(event.data)
                .map_err(|err| ApiError::BadRequest(format!("invalid checkout payload: {err}")))?;
            ReplenishmentEffect::AddCredits {
                account_id: payload.account_id,
                amount: payload.credits,
                metadata: payload.metadata,
            }
        }
        "subscription.activated" => {
            let payload: SubscriptionActivated = serde_json::from_value(event.data).map_err(
                |err| ApiError::BadRequest(format!("invalid subscription payload: {err}")),
            )?;
            ReplenishmentEffect::UpgradeToUnlimited {
                account_id: payload.account_id,
                metadata: payload.metadata,
            }
        }
        other => {
            // Acknowledge so the provider stops retrying. Unhandled types
            // are not recorded; a later handler for the type will see
            // fresh deliveries only.
            tracing::info!(event_id = %event.id, event_type = %other, "Ignoring unhandled webhook event type");
            return Ok(Json(WebhookResponse {
                received: true,
                deduplicated: false,
            }));
        }
    };

    let outcome = state
        .store
        .apply_event(&event.id, &event.event_type, &effect)?;

    let deduplicated = match outcome {
        EventOutcome::Applied { new_balance } => {
            tracing::info!(
                event_id = %event.id,
                event_type = %event.event_type,
                account_id = %effect.account_id(),
                new_balance = ?new_balance,
                "Webhook event applied"
            );
            false
        }
        EventOutcome::Deduplicated => {
            tracing::info!(
                event_id = %event.id,
                event_type = %event.event_type,
                "Webhook event already processed"
            );
            true
        }
    };

    Ok(Json(WebhookResponse {
        received: true,
        deduplicated,
    }))
}
