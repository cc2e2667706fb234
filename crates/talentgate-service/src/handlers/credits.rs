//! Replenishment and ledger handlers.
//!
//! The checkout-completion routes call these directly after a synchronous
//! purchase; the asynchronous path goes through the payment webhook instead.
//! Both paths end in the same store transactions.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use talentgate_core::{AccountId, LedgerEntry, LedgerReason, Plan};

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::handlers::consumption::Pagination;
use crate::state::AppState;

/// Add-credits request.
#[derive(Debug, Deserialize)]
pub struct AddCreditsRequest {
    /// Number of credits purchased. Must be a positive integer.
    pub amount: i64,
    /// Purchase metadata recorded on the ledger entry.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Add-credits response.
#[derive(Debug, Serialize)]
pub struct AddCreditsResponse {
    /// Balance after the grant.
    pub new_balance: i64,
}

/// Add purchased credits to an account.
pub async fn add_credits(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Path(account_id): Path<AccountId>,
    Json(body): Json<AddCreditsRequest>,
) -> Result<Json<AddCreditsResponse>, ApiError> {
    let new_balance = state
        .store
        .add_credits(&account_id, body.amount, body.metadata)?;

    tracing::info!(
        account_id = %account_id,
        amount = %body.amount,
        new_balance = %new_balance,
        caller = %auth.service_name,
        "Credits added"
    );

    Ok(Json(AddCreditsResponse { new_balance }))
}

/// Subscription upgrade request.
#[derive(Debug, Deserialize)]
pub struct UpgradeRequest {
    /// Subscription metadata recorded on the ledger entry.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Subscription upgrade response.
#[derive(Debug, Serialize)]
pub struct UpgradeResponse {
    /// The plan after the upgrade.
    pub plan: Plan,
}

/// Move an account to the unlimited plan.
pub async fn upgrade_subscription(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Path(account_id): Path<AccountId>,
    Json(body): Json<UpgradeRequest>,
) -> Result<Json<UpgradeResponse>, ApiError> {
    state
        .store
        .upgrade_to_unlimited(&account_id, body.metadata)?;

    tracing::info!(
        account_id = %account_id,
        caller = %auth.service_name,
        "Account upgraded to unlimited"
    );

    Ok(Json(UpgradeResponse {
        plan: Plan::Unlimited,
    }))
}

/// Ledger entry response.
#[derive(Debug, Serialize)]
pub struct LedgerEntryResponse {
    /// Entry ID.
    pub id: String,
    /// Signed credit delta.
    pub delta: i64,
    /// Why the balance changed.
    pub reason: LedgerReason,
    /// Balance after this entry was committed.
    pub balance_after: i64,
    /// Entry metadata.
    pub metadata: serde_json::Value,
    /// Created timestamp.
    pub created_at: String,
}

impl From<LedgerEntry> for LedgerEntryResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            delta: entry.delta,
            reason: entry.reason,
            balance_after: entry.balance_after,
            metadata: entry.metadata,
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

/// List an account's ledger entries, newest first.
pub async fn list_ledger(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(account_id): Path<AccountId>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<LedgerEntryResponse>>, ApiError> {
    let entries = state
        .store
        .list_ledger(&account_id, page.limit, page.offset)?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
