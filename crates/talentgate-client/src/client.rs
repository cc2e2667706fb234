//! TalentGate HTTP client implementation.

use reqwest::Client;
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{
    AccountResponse, AddCreditsRequest, AddCreditsResponse, ApiErrorResponse, BalanceResponse,
    ConsumeRequest, ConsumeResponse, CreateAccountRequest, UpgradeRequest, UpgradeResponse,
};

/// TalentGate credit API client.
///
/// Provides methods for provisioning accounts, gating consumption, and
/// replenishing credits.
#[derive(Debug, Clone)]
pub struct TalentGateClient {
    client: Client,
    base_url: String,
    api_key: String,
    service_name: String,
}

impl TalentGateClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the credit service (e.g., `"http://talentgate:8080"`)
    /// * `api_key` - Service API key for authentication
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_options(base_url, api_key, ClientOptions::default())
    }

    /// Create a new client with custom options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with default settings).
    #[must_use]
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        options: ClientOptions,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            service_name: options.service_name,
        }
    }

    /// Provision a credit account with the signup bonus.
    ///
    /// Called by the identity subsystem after minting a new account id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AccountExists`] if the account was already
    /// provisioned, or another error if the request fails.
    pub async fn create_account(
        &self,
        account_id: impl Into<String>,
    ) -> Result<AccountResponse, ClientError> {
        let url = format!("{}/v1/accounts", self.base_url);
        let request = CreateAccountRequest {
            account_id: account_id.into(),
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get an account's current balance and plan.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AccountNotFound`] if the account doesn't exist,
    /// or another error if the request fails.
    pub async fn balance(&self, account_id: &str) -> Result<BalanceResponse, ClientError> {
        let url = format!("{}/v1/accounts/{account_id}/balance", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Consume one credit for a named resource.
    ///
    /// Call before running a profile analysis and proceed only on `Ok`.
    /// Repeating a `resource_key` the account has already consumed succeeds
    /// without charging again.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InsufficientCredits`] when a metered account
    /// is out of credits, or another error if the request fails.
    pub async fn consume(
        &self,
        account_id: &str,
        resource_key: impl Into<String>,
    ) -> Result<ConsumeResponse, ClientError> {
        let url = format!("{}/v1/accounts/{account_id}/consume", self.base_url);
        let request = ConsumeRequest {
            resource_key: resource_key.into(),
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Add purchased credits to an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn add_credits(
        &self,
        account_id: &str,
        amount: i64,
        metadata: Option<serde_json::Value>,
    ) -> Result<AddCreditsResponse, ClientError> {
        let url = format!("{}/v1/accounts/{account_id}/credits", self.base_url);
        let request = AddCreditsRequest { amount, metadata };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Move an account to the unlimited plan.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn upgrade_to_unlimited(
        &self,
        account_id: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<UpgradeResponse, ClientError> {
        let url = format!("{}/v1/accounts/{account_id}/subscription", self.base_url);
        let request = UpgradeRequest { metadata };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let code = api_error.error.code.as_str();
                let message = api_error.error.message;

                match code {
                    "insufficient_credits" => {
                        let balance = api_error
                            .error
                            .details
                            .as_ref()
                            .and_then(|d| d.get("balance"))
                            .and_then(serde_json::Value::as_i64)
                            .unwrap_or(0);

                        Err(ClientError::InsufficientCredits { balance })
                    }
                    "not_found" => Err(ClientError::AccountNotFound {
                        account_id: extract_id(&message),
                    }),
                    "conflict" => Err(ClientError::AccountExists {
                        account_id: extract_id(&message),
                    }),
                    _ => Err(ClientError::Api {
                        code: code.to_string(),
                        message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Pull the id out of messages like "account not found: <id>".
fn extract_id(message: &str) -> String {
    message
        .rsplit_once(": ")
        .map_or(message, |(_, id)| id)
        .to_string()
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// Service name to include in requests.
    pub service_name: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            service_name: "unknown".to_string(),
        }
    }
}

impl ClientOptions {
    /// Create options with a service name.
    #[must_use]
    pub fn with_service_name(name: impl Into<String>) -> Self {
        Self {
            service_name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = TalentGateClient::new("http://localhost:8080", "test-api-key");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = TalentGateClient::new("http://localhost:8080/", "test-api-key");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn client_options() {
        let options = ClientOptions::with_service_name("ai-analysis");
        let client = TalentGateClient::with_options("http://localhost:8080", "key", options);
        assert_eq!(client.service_name, "ai-analysis");
    }

    #[test]
    fn extract_id_from_message() {
        assert_eq!(
            extract_id("account not found: 550e8400-e29b-41d4-a716-446655440000"),
            "550e8400-e29b-41d4-a716-446655440000"
        );
        assert_eq!(extract_id("no separator"), "no separator");
    }
}
