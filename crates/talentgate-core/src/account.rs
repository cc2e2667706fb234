//! Account types for the credit service.
//!
//! An account holds the authoritative credit balance and plan tier. The
//! account row itself is owned by the identity subsystem; the credit service
//! only ever mutates `credits` and `plan`, and only inside consumption or
//! replenishment transactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Credits granted to every new account at signup.
pub const SIGNUP_BONUS_CREDITS: i64 = 5;

/// A credit account for a recruiting workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// The account ID (from the identity subsystem).
    pub account_id: AccountId,

    /// Current credit balance. Never negative for metered accounts;
    /// ignored for gating purposes on unlimited accounts.
    pub credits: i64,

    /// Current plan tier.
    pub plan: Plan,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new metered account with zero balance.
    ///
    /// The signup bonus is applied by the store when the account is
    /// provisioned, so the bonus and its ledger entry commit together.
    #[must_use]
    pub fn new(account_id: AccountId) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            credits: 0,
            plan: Plan::Metered,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether a paid action may proceed on this account.
    #[must_use]
    pub const fn can_consume(&self) -> bool {
        match self.plan {
            Plan::Unlimited => true,
            Plan::Metered => self.credits > 0,
        }
    }
}

/// Plan tier for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    /// Each profile analysis consumes one credit from a finite balance.
    Metered,

    /// Analyses always succeed; usage is recorded with zero-delta ledger
    /// entries for audit continuity.
    Unlimited,
}
