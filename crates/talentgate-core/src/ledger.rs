//! Ledger entry types for the credit service.
//!
//! Every balance-affecting event appends exactly one immutable entry. The
//! ledger is the source of truth for billing reconciliation: for a metered
//! account, the sum of deltas always equals the current balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, EntryId};

/// An immutable, append-only record of a balance-affecting event.
///
/// `balance_after` captures the account's credits at the instant the entry
/// was committed; an entry is never written outside the transaction that
/// performed the matching balance mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique entry ID (ULID for time-ordering).
    pub id: EntryId,

    /// The account whose balance was affected.
    pub account_id: AccountId,

    /// Signed credit delta. Negative for consumption, positive for grants,
    /// zero for audit-only entries (unlimited consumption, plan changes).
    pub delta: i64,

    /// Why the balance changed.
    pub reason: LedgerReason,

    /// Balance after this entry was committed.
    pub balance_after: i64,

    /// Opaque metadata (resource key, package id, subscription id, ...).
    pub metadata: serde_json::Value,

    /// When the entry was committed.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Create a consumption entry.
    ///
    /// `delta` is `-1` for a metered charge and `0` for an unlimited-plan
    /// consumption recorded purely for audit continuity.
    #[must_use]
    pub fn consumption(
        account_id: AccountId,
        delta: i64,
        balance_after: i64,
        resource_key: &str,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            account_id,
            delta,
            reason: LedgerReason::Consumption,
            balance_after,
            metadata: serde_json::json!({ "resource_key": resource_key }),
            created_at: Utc::now(),
        }
    }

    /// Create a purchase entry for a credit pack.
    #[must_use]
    pub fn purchase(
        account_id: AccountId,
        amount: i64,
        balance_after: i64,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            account_id,
            delta: amount,
            reason: LedgerReason::Purchase,
            balance_after,
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Create a zero-delta subscription entry.
    ///
    /// Plan changes leave the balance untouched; the entry exists so the
    /// audit trail shows when the account moved to the unlimited plan.
    #[must_use]
    pub fn subscription(
        account_id: AccountId,
        balance_after: i64,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            account_id,
            delta: 0,
            reason: LedgerReason::Subscription,
            balance_after,
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Create a signup bonus entry for a freshly provisioned account.
    #[must_use]
    pub fn signup_bonus(account_id: AccountId, amount: i64) -> Self {
        Self {
            id: EntryId::generate(),
            account_id,
            delta: amount,
            reason: LedgerReason::SignupBonus,
            balance_after: amount,
            metadata: serde_json::Value::Null,
            created_at: Utc::now(),
        }
    }
}

/// Why a ledger entry was appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerReason {
    /// A profile analysis consumed (or, on unlimited, recorded) a credit.
    Consumption,

    /// Credits purchased through the payment provider.
    Purchase,

    /// Plan change from a subscription upgrade (always zero delta).
    Subscription,

    /// Credits granted at account creation.
    SignupBonus,
}

impl LedgerReason {
    /// Whether entries with this reason may carry a negative delta.
    #[must_use]
    pub const fn is_debit(self) -> bool {
        matches!(self, Self::Consumption)
    }
}
