//! Common test utilities for talentgate integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;

use talentgate_core::AccountId;
use talentgate_service::{create_router, AppState, ServiceConfig};
use talentgate_store::RocksStore;

/// Shared webhook secret used by the harness config and test signers.
pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// The service API key for service-to-service requests.
    pub service_api_key: String,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RocksStore::open(temp_dir.path()).expect("Failed to open store");

        let service_api_key = "test-service-key".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: Some(temp_dir.path().to_string_lossy().to_string()),
            service_api_key: Some(service_api_key.clone()),
            payment_webhook_secret: Some(WEBHOOK_SECRET.into()),
            webhook_tolerance_seconds: 300,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(Arc::new(store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
            service_api_key,
        }
    }

    /// Generate a fresh account id.
    pub fn new_account_id() -> AccountId {
        AccountId::generate()
    }

    /// Provision an account and return its id. Panics on failure.
    pub async fn provision_account(&self) -> AccountId {
        let account_id = Self::new_account_id();

        self.server
            .post("/v1/accounts")
            .add_header("x-api-key", self.service_api_key.clone())
            .add_header("x-service-name", "test-suite")
            .json(&serde_json::json!({ "account_id": account_id.to_string() }))
            .await
            .assert_status_ok();

        account_id
    }

    /// Fetch the current balance for an account.
    pub async fn balance(&self, account_id: &AccountId) -> i64 {
        let response = self
            .server
            .get(&format!("/v1/accounts/{account_id}/balance"))
            .add_header("x-api-key", self.service_api_key.clone())
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["credits"].as_i64().expect("credits field")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
