//! Usage record types.
//!
//! A usage record is written for every consumption attempt that succeeds,
//! including unlimited-plan consumptions where no credit was charged. The
//! `(account_id, resource_key)` pair is unique: analyzing the same profile
//! twice never charges twice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, EntryId};

/// A record of one resource consumption (one analyzed profile).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Unique record ID (ULID for time-ordering).
    pub id: EntryId,

    /// The account that consumed the resource.
    pub account_id: AccountId,

    /// Identifier of the consumed resource (e.g. a profile login).
    pub resource_key: String,

    /// Whether a credit was actually deducted. `false` for unlimited-plan
    /// consumptions and never anything else.
    pub credit_charged: bool,

    /// The ledger entry committed alongside this record.
    pub ledger_entry_id: EntryId,

    /// When the record was committed.
    pub created_at: DateTime<Utc>,
}

impl UsageRecord {
    /// Create a usage record tied to its ledger entry.
    #[must_use]
    pub fn new(
        account_id: AccountId,
        resource_key: impl Into<String>,
        credit_charged: bool,
        ledger_entry_id: EntryId,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            account_id,
            resource_key: resource_key.into(),
            credit_charged,
            ledger_entry_id,
            created_at: Utc::now(),
        }
    }
}
