//! Consumption gate handlers.
//!
//! The AI-analysis routes call `POST /v1/accounts/{id}/consume` before
//! running a profile analysis and proceed only on 2xx. The deduction, its
//! ledger entry, and the usage record commit in one store transaction.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use talentgate_core::{AccountId, UsageRecord};

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Consume request.
#[derive(Debug, Deserialize)]
pub struct ConsumeRequest {
    /// Identifier of the resource being analyzed (e.g. a profile login).
    pub resource_key: String,
}

/// Consume response.
#[derive(Debug, Serialize)]
pub struct ConsumeResponse {
    /// Balance after the call.
    pub new_balance: i64,
    /// The ledger entry recorded for this consumption.
    pub ledger_entry_id: String,
    /// Whether this call deducted a credit.
    pub credit_charged: bool,
    /// Whether the resource had already been consumed by this account.
    pub deduplicated: bool,
}

/// Consume one credit for a named resource.
pub async fn consume(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Path(account_id): Path<AccountId>,
    Json(body): Json<ConsumeRequest>,
) -> Result<Json<ConsumeResponse>, ApiError> {
    if body.resource_key.is_empty() {
        return Err(ApiError::BadRequest("resource_key must not be empty".into()));
    }

    let outcome = state.store.consume(&account_id, &body.resource_key)?;

    tracing::info!(
        account_id = %account_id,
        resource_key = %body.resource_key,
        new_balance = %outcome.new_balance,
        credit_charged = %outcome.credit_charged,
        deduplicated = %outcome.deduplicated,
        caller = %auth.service_name,
        "Consumption gate passed"
    );

    Ok(Json(ConsumeResponse {
        new_balance: outcome.new_balance,
        ledger_entry_id: outcome.ledger_entry_id.to_string(),
        credit_charged: outcome.credit_charged,
        deduplicated: outcome.deduplicated,
    }))
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    /// Maximum records to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Records to skip.
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Usage record response.
#[derive(Debug, Serialize)]
pub struct UsageRecordResponse {
    /// Record ID.
    pub id: String,
    /// Consumed resource identifier.
    pub resource_key: String,
    /// Whether a credit was deducted.
    pub credit_charged: bool,
    /// The ledger entry committed alongside this record.
    pub ledger_entry_id: String,
    /// Created timestamp.
    pub created_at: String,
}

impl From<UsageRecord> for UsageRecordResponse {
    fn from(record: UsageRecord) -> Self {
        Self {
            id: record.id.to_string(),
            resource_key: record.resource_key,
            credit_charged: record.credit_charged,
            ledger_entry_id: record.ledger_entry_id.to_string(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// List an account's usage records, newest first.
pub async fn list_usage(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(account_id): Path<AccountId>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<UsageRecordResponse>>, ApiError> {
    let records = state
        .store
        .list_usage(&account_id, page.limit, page.offset)?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}
