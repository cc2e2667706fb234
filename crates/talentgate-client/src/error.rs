//! Client error types.

/// Errors that can occur when using the TalentGate client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Metered account has no credits left.
    #[error("insufficient credits: balance={balance}")]
    InsufficientCredits {
        /// Current balance.
        balance: i64,
    },

    /// Account not found.
    #[error("account not found: {account_id}")]
    AccountNotFound {
        /// The account ID.
        account_id: String,
    },

    /// Account already provisioned.
    #[error("account already exists: {account_id}")]
    AccountExists {
        /// The account ID.
        account_id: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
