//! Error types for the credit store.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record that was missing.
        entity: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// Account already provisioned.
    #[error("account already exists: {id}")]
    AlreadyExists {
        /// The account id.
        id: String,
    },

    /// Metered account has no credits left.
    #[error("insufficient credits: balance={balance}")]
    InsufficientCredits {
        /// Current balance.
        balance: i64,
    },

    /// Replenishment amount was zero, negative, or large enough to overflow
    /// the balance.
    #[error("invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount.
        amount: i64,
    },

    /// External event already applied (idempotency).
    #[error("duplicate event: {event_id}")]
    DuplicateEvent {
        /// The event id that was duplicated.
        event_id: String,
    },

    /// The store was constructed without a backing database.
    #[error("credit store is not configured")]
    Unavailable,
}
