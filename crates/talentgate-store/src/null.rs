//! Null storage implementation.
//!
//! Selected at construction time when the service runs without a data
//! directory (e.g. a preview deployment with no database attached). Every
//! operation fails with [`StoreError::Unavailable`], which the API surfaces
//! as 503, so the failure mode is an explicit typed variant instead of a
//! crash at first use.

use talentgate_core::{
    Account, AccountId, EntryId, LedgerEntry, ReplenishmentEffect, UsageRecord,
};

use crate::error::{Result, StoreError};
use crate::{Consumption, EventOutcome, Store};

/// Store stub for unconfigured deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl NullStore {
    /// Create a null store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Store for NullStore {
    fn create_account(&self, _account_id: &AccountId) -> Result<Account> {
        Err(StoreError::Unavailable)
    }

    fn get_account(&self, _account_id: &AccountId) -> Result<Option<Account>> {
        Err(StoreError::Unavailable)
    }

    fn consume(&self, _account_id: &AccountId, _resource_key: &str) -> Result<Consumption> {
        Err(StoreError::Unavailable)
    }

    fn add_credits(
        &self,
        _account_id: &AccountId,
        _amount: i64,
        _metadata: serde_json::Value,
    ) -> Result<i64> {
        Err(StoreError::Unavailable)
    }

    fn upgrade_to_unlimited(
        &self,
        _account_id: &AccountId,
        _metadata: serde_json::Value,
    ) -> Result<()> {
        Err(StoreError::Unavailable)
    }

    fn apply_event(
        &self,
        _event_id: &str,
        _event_type: &str,
        _effect: &ReplenishmentEffect,
    ) -> Result<EventOutcome> {
        Err(StoreError::Unavailable)
    }

    fn get_ledger_entry(&self, _entry_id: &EntryId) -> Result<Option<LedgerEntry>> {
        Err(StoreError::Unavailable)
    }

    fn list_ledger(
        &self,
        _account_id: &AccountId,
        _limit: usize,
        _offset: usize,
    ) -> Result<Vec<LedgerEntry>> {
        Err(StoreError::Unavailable)
    }

    fn list_usage(
        &self,
        _account_id: &AccountId,
        _limit: usize,
        _offset: usize,
    ) -> Result<Vec<UsageRecord>> {
        Err(StoreError::Unavailable)
    }
}
