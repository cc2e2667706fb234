//! Replenishment integration tests: credit purchases and plan upgrades.

mod common;

use common::TestHarness;
use serde_json::json;

// ============================================================================
// Credit purchase
// ============================================================================

#[tokio::test]
async fn add_credits_increases_balance_and_ledger() {
    let harness = TestHarness::new();
    let account_id = harness.provision_account().await;

    let response = harness
        .server
        .post(&format!("/v1/accounts/{account_id}/credits"))
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({ "amount": 50, "metadata": { "pack": "recruiter-50" } }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["new_balance"], 55);

    let response = harness
        .server
        .get(&format!("/v1/accounts/{account_id}/ledger"))
        .add_header("x-api-key", harness.service_api_key.clone())
        .await;

    response.assert_status_ok();
    let entries: serde_json::Value = response.json();
    let entries = entries.as_array().expect("ledger array");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["reason"], "purchase");
    assert_eq!(entries[0]["delta"], 50);
    assert_eq!(entries[0]["balance_after"], 55);
    assert_eq!(entries[0]["metadata"]["pack"], "recruiter-50");
}

#[tokio::test]
async fn add_zero_credits_fails() {
    let harness = TestHarness::new();
    let account_id = harness.provision_account().await;

    let response = harness
        .server
        .post(&format!("/v1/accounts/{account_id}/credits"))
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({ "amount": 0 }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(harness.balance(&account_id).await, 5);
}

#[tokio::test]
async fn add_negative_credits_fails() {
    let harness = TestHarness::new();
    let account_id = harness.provision_account().await;

    let response = harness
        .server
        .post(&format!("/v1/accounts/{account_id}/credits"))
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({ "amount": -10 }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(harness.balance(&account_id).await, 5);
}

#[tokio::test]
async fn add_credits_to_unknown_account_fails() {
    let harness = TestHarness::new();
    let account_id = TestHarness::new_account_id();

    let response = harness
        .server
        .post(&format!("/v1/accounts/{account_id}/credits"))
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({ "amount": 50 }))
        .await;

    response.assert_status_not_found();
}

// ============================================================================
// Subscription upgrade
// ============================================================================

#[tokio::test]
async fn upgrade_switches_plan_and_preserves_balance() {
    let harness = TestHarness::new();
    let account_id = harness.provision_account().await;

    let response = harness
        .server
        .post(&format!("/v1/accounts/{account_id}/subscription"))
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({ "metadata": { "provider_subscription": "sub_123" } }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["plan"], "unlimited");

    let response = harness
        .server
        .get(&format!("/v1/accounts/{account_id}/balance"))
        .add_header("x-api-key", harness.service_api_key.clone())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["plan"], "unlimited");
    assert_eq!(body["credits"], 5);
}

#[tokio::test]
async fn upgrade_records_zero_delta_ledger_entry() {
    let harness = TestHarness::new();
    let account_id = harness.provision_account().await;

    harness
        .server
        .post(&format!("/v1/accounts/{account_id}/subscription"))
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({}))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .get(&format!("/v1/accounts/{account_id}/ledger"))
        .add_header("x-api-key", harness.service_api_key.clone())
        .await;

    let entries: serde_json::Value = response.json();
    let entries = entries.as_array().expect("ledger array");
    assert_eq!(entries[0]["reason"], "subscription");
    assert_eq!(entries[0]["delta"], 0);
    assert_eq!(entries[0]["balance_after"], 5);
}
