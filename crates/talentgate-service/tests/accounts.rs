//! Account provisioning and balance integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

// ============================================================================
// Provisioning
// ============================================================================

#[tokio::test]
async fn provision_account_grants_signup_bonus() {
    let harness = TestHarness::new();
    let account_id = TestHarness::new_account_id();

    let response = harness
        .server
        .post("/v1/accounts")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({ "account_id": account_id.to_string() }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["account_id"], account_id.to_string());
    assert_eq!(body["credits"], 5);
    assert_eq!(body["plan"], "metered");
}

#[tokio::test]
async fn provision_records_signup_bonus_ledger_entry() {
    let harness = TestHarness::new();
    let account_id = harness.provision_account().await;

    let response = harness
        .server
        .get(&format!("/v1/accounts/{account_id}/ledger"))
        .add_header("x-api-key", harness.service_api_key.clone())
        .await;

    response.assert_status_ok();
    let entries: serde_json::Value = response.json();
    let entries = entries.as_array().expect("ledger array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["reason"], "signup_bonus");
    assert_eq!(entries[0]["delta"], 5);
    assert_eq!(entries[0]["balance_after"], 5);
}

#[tokio::test]
async fn provision_duplicate_account_conflicts() {
    let harness = TestHarness::new();
    let account_id = harness.provision_account().await;

    let response = harness
        .server
        .post("/v1/accounts")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({ "account_id": account_id.to_string() }))
        .await;

    assert_eq!(response.status_code(), 409);

    // The duplicate attempt must not re-grant the bonus.
    assert_eq!(harness.balance(&account_id).await, 5);
}

#[tokio::test]
async fn provision_without_api_key_fails() {
    let harness = TestHarness::new();
    let account_id = TestHarness::new_account_id();

    let response = harness
        .server
        .post("/v1/accounts")
        .json(&json!({ "account_id": account_id.to_string() }))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn provision_with_wrong_api_key_fails() {
    let harness = TestHarness::new();
    let account_id = TestHarness::new_account_id();

    let response = harness
        .server
        .post("/v1/accounts")
        .add_header("x-api-key", "wrong-key")
        .json(&json!({ "account_id": account_id.to_string() }))
        .await;

    response.assert_status_unauthorized();
}

// ============================================================================
// Balance
// ============================================================================

#[tokio::test]
async fn get_balance_for_unknown_account_fails() {
    let harness = TestHarness::new();
    let account_id = TestHarness::new_account_id();

    let response = harness
        .server
        .get(&format!("/v1/accounts/{account_id}/balance"))
        .add_header("x-api-key", harness.service_api_key.clone())
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn get_balance_reports_plan() {
    let harness = TestHarness::new();
    let account_id = harness.provision_account().await;

    let response = harness
        .server
        .get(&format!("/v1/accounts/{account_id}/balance"))
        .add_header("x-api-key", harness.service_api_key.clone())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["credits"], 5);
    assert_eq!(body["plan"], "metered");
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn health_is_public() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}
