//! Transactional storage layer for the TalentGate credit service.
//!
//! This crate owns every balance mutation. The consumption gate and the
//! replenishment paths are compound operations that run inside a single
//! pessimistic `RocksDB` transaction: the account row is locked for the
//! duration, and the ledger entry, usage record, and idempotency marker
//! commit together with the balance change or not at all.
//!
//! # Column families
//!
//! - `accounts`: account records, keyed by `account_id`
//! - `ledger`: ledger entries, keyed by `entry_id` (ULID)
//! - `ledger_by_account`: index for listing an account's ledger
//! - `usage`: usage records, keyed by `account_id || record_id`
//! - `usage_by_resource`: natural-key index, one charge per resource
//! - `processed_events`: idempotency markers for payment-provider events
//!
//! # Example
//!
//! ```no_run
//! use talentgate_store::{RocksStore, Store};
//! use talentgate_core::AccountId;
//!
//! let store = RocksStore::open("/tmp/talentgate-db").unwrap();
//!
//! let account_id = AccountId::generate();
//! let account = store.create_account(&account_id).unwrap();
//! assert_eq!(account.credits, 5);
//!
//! let outcome = store.consume(&account_id, "octocat").unwrap();
//! assert_eq!(outcome.new_balance, 4);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod null;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use null::NullStore;
pub use rocks::RocksStore;

use talentgate_core::{
    Account, AccountId, EntryId, LedgerEntry, ReplenishmentEffect, UsageRecord,
};

/// Outcome of a consumption-gate call.
#[derive(Debug, Clone)]
pub struct Consumption {
    /// Balance after the call (unchanged for unlimited or deduplicated
    /// consumptions).
    pub new_balance: i64,

    /// The ledger entry recorded for this consumption. For a deduplicated
    /// call this is the entry from the original charge.
    pub ledger_entry_id: EntryId,

    /// Whether this call deducted a credit.
    pub credit_charged: bool,

    /// Whether the resource had already been consumed by this account, in
    /// which case no rows were written.
    pub deduplicated: bool,
}

/// Outcome of applying an external payment event.
#[derive(Debug, Clone)]
pub enum EventOutcome {
    /// The event's effect was committed together with its idempotency marker.
    Applied {
        /// Balance after the effect, when the effect changes the balance.
        new_balance: Option<i64>,
    },

    /// The event id had already been processed; nothing was written.
    Deduplicated,
}

/// The storage trait defining all credit operations.
///
/// This trait abstracts the storage layer so the service can run against the
/// real `RocksDB` backend or the [`NullStore`] stub selected when no data
/// directory is configured.
pub trait Store: Send + Sync {
    // =========================================================================
    // Accounts
    // =========================================================================

    /// Provision an account with the signup bonus and its ledger entry,
    /// atomically.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the account was provisioned
    /// before.
    fn create_account(&self, account_id: &AccountId) -> Result<Account>;

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_account(&self, account_id: &AccountId) -> Result<Option<Account>>;

    // =========================================================================
    // Consumption gate
    // =========================================================================

    /// Consume one credit for a named resource.
    ///
    /// Runs as one transaction: lock the account row, check the plan and
    /// balance, decrement, and append the ledger entry and usage record. A
    /// repeat call for the same `(account, resource)` pair returns the
    /// original outcome without charging again.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the account doesn't exist.
    /// - `StoreError::InsufficientCredits` if a metered balance is empty
    ///   (nothing is written).
    fn consume(&self, account_id: &AccountId, resource_key: &str) -> Result<Consumption>;

    // =========================================================================
    // Replenishment
    // =========================================================================

    /// Add purchased credits and record the ledger entry atomically.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the account doesn't exist.
    /// - `StoreError::InvalidAmount` if `amount` is not positive or would
    ///   overflow the balance.
    fn add_credits(
        &self,
        account_id: &AccountId,
        amount: i64,
        metadata: serde_json::Value,
    ) -> Result<i64>;

    /// Move the account to the unlimited plan, recording a zero-delta ledger
    /// entry. Idempotent in effect: re-upgrading records another entry but
    /// changes no state.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn upgrade_to_unlimited(
        &self,
        account_id: &AccountId,
        metadata: serde_json::Value,
    ) -> Result<()>;

    /// Apply a verified payment event exactly once.
    ///
    /// The idempotency marker and the effect commit in the same transaction.
    /// If the event id was seen before, returns `EventOutcome::Deduplicated`
    /// and writes nothing. If the effect fails, the marker is not written and
    /// the event stays eligible for redelivery.
    ///
    /// # Errors
    ///
    /// Propagates the effect's errors (`NotFound`, `InvalidAmount`, ...).
    fn apply_event(
        &self,
        event_id: &str,
        event_type: &str,
        effect: &ReplenishmentEffect,
    ) -> Result<EventOutcome>;

    // =========================================================================
    // History
    // =========================================================================

    /// Get a ledger entry by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_ledger_entry(&self, entry_id: &EntryId) -> Result<Option<LedgerEntry>>;

    /// List ledger entries for an account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_ledger(
        &self,
        account_id: &AccountId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LedgerEntry>>;

    /// List usage records for an account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_usage(
        &self,
        account_id: &AccountId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<UsageRecord>>;
}
