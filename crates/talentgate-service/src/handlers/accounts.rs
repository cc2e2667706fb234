//! Account provisioning and balance handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use talentgate_core::{Account, AccountId, Plan};

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Account response.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub account_id: String,
    /// Current credit balance.
    pub credits: i64,
    /// Current plan tier.
    pub plan: Plan,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.account_id.to_string(),
            credits: account.credits,
            plan: account.plan,
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

/// Create account request, sent by the identity subsystem at signup.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// The account id minted by the identity subsystem.
    pub account_id: AccountId,
}

/// Provision a credit account with the signup bonus.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Json(body): Json<CreateAccountRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.store.create_account(&body.account_id)?;

    tracing::info!(
        account_id = %account.account_id,
        credits = %account.credits,
        caller = %auth.service_name,
        "Account provisioned"
    );

    Ok(Json(AccountResponse::from(&account)))
}

/// Balance response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Current credit balance.
    pub credits: i64,
    /// Current plan tier.
    pub plan: Plan,
}

/// Get an account's current balance and plan.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(account_id): Path<AccountId>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let account = state
        .store
        .get_account(&account_id)?
        .ok_or_else(|| ApiError::NotFound(format!("account not found: {account_id}")))?;

    Ok(Json(BalanceResponse {
        credits: account.credits,
        plan: account.plan,
    }))
}
