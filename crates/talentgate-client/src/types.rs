//! Request and response types for the TalentGate client.

use serde::{Deserialize, Serialize};

/// Account provisioning request.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAccountRequest {
    /// The account id minted by the identity subsystem.
    pub account_id: String,
}

/// Account response.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    /// Account ID.
    pub account_id: String,
    /// Credit balance.
    pub credits: i64,
    /// Plan tier ("metered" or "unlimited").
    pub plan: String,
    /// Created timestamp (RFC 3339).
    pub created_at: String,
}

/// Balance response.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    /// Credit balance.
    pub credits: i64,
    /// Plan tier ("metered" or "unlimited").
    pub plan: String,
}

/// Consume request.
#[derive(Debug, Clone, Serialize)]
pub struct ConsumeRequest {
    /// Identifier of the resource being analyzed.
    pub resource_key: String,
}

/// Consume response.
#[derive(Debug, Clone, Deserialize)]
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

/// Add-credits request.
#[derive(Debug, Clone, Serialize)]
pub struct AddCreditsRequest {
    /// Number of credits purchased.
    pub amount: i64,
    /// Purchase metadata recorded on the ledger entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Add-credits response.
#[derive(Debug, Clone, Deserialize)]
pub struct AddCreditsResponse {
    /// Balance after the grant.
    pub new_balance: i64,
}

/// Subscription upgrade request.
#[derive(Debug, Clone, Serialize)]
pub struct UpgradeRequest {
    /// Subscription metadata recorded on the ledger entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Subscription upgrade response.
#[derive(Debug, Clone, Deserialize)]
pub struct UpgradeResponse {
    /// The plan after the upgrade.
    pub plan: String,
}

/// API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorBody,
}

/// API error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
    /// Additional details.
    pub details: Option<serde_json::Value>,
}
