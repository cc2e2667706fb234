//! External payment event types.
//!
//! Payment-provider webhooks are delivered at least once. A
//! `ProcessedExternalEvent` row keyed by the provider's event id is the sole
//! idempotency marker; the store inserts it in the same transaction as the
//! event's replenishment effect, so an event is applied exactly once or not
//! at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Idempotency marker for an applied payment-provider event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedExternalEvent {
    /// Provider-assigned, globally unique event id.
    pub event_id: String,

    /// Provider event type (e.g. `checkout.completed`).
    pub event_type: String,

    /// When the event's effect was committed.
    pub processed_at: DateTime<Utc>,
}

impl ProcessedExternalEvent {
    /// Create a marker for an event processed now.
    #[must_use]
    pub fn new(event_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Utc::now(),
        }
    }
}

/// The balance-affecting effect of a verified payment event.
///
/// The webhook endpoint parses provider payloads into one of these and hands
/// it to the store, which applies the effect and the idempotency marker in a
/// single transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReplenishmentEffect {
    /// A completed checkout grants purchased credits.
    AddCredits {
        /// The account to credit.
        account_id: AccountId,
        /// Number of credits purchased. Must be positive.
        amount: i64,
        /// Purchase metadata recorded on the ledger entry.
        metadata: serde_json::Value,
    },

    /// An activated subscription moves the account to the unlimited plan.
    UpgradeToUnlimited {
        /// The account to upgrade.
        account_id: AccountId,
        /// Subscription metadata recorded on the ledger entry.
        metadata: serde_json::Value,
    },
}

impl ReplenishmentEffect {
    /// The account this effect targets.
    #[must_use]
    pub const fn account_id(&self) -> &AccountId {
        match self {
            Self::AddCredits { account_id, .. } | Self::UpgradeToUnlimited { account_id, .. } => {
                account_id
            }
        }
    }
}
