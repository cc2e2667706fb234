//! Key encoding utilities for `RocksDB`.
//!
//! Account ids are 16-byte UUIDs and entry ids are 16-byte ULIDs, so
//! composite keys are fixed-prefix concatenations. ULID suffixes keep
//! per-account ranges in commit order.

use talentgate_core::{AccountId, EntryId};

/// Create an account key from an account ID.
#[must_use]
pub fn account_key(account_id: &AccountId) -> Vec<u8> {
    account_id.as_bytes().to_vec()
}

/// Create a ledger key from an entry ID.
#[must_use]
pub fn ledger_key(entry_id: &EntryId) -> Vec<u8> {
    entry_id.to_bytes().to_vec()
}

/// Create an account-ledger index key.
///
/// Format: `account_id (16 bytes) || entry_id (16 bytes)`.
#[must_use]
pub fn account_ledger_key(account_id: &AccountId, entry_id: &EntryId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(account_id.as_bytes());
    key.extend_from_slice(&entry_id.to_bytes());
    key
}

/// Create a prefix for iterating all ledger entries (or usage records) of an
/// account.
#[must_use]
pub fn account_prefix(account_id: &AccountId) -> Vec<u8> {
    account_id.as_bytes().to_vec()
}

/// Extract the entry ID from an `account_id || entry_id` composite key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_entry_id(key: &[u8]) -> EntryId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    EntryId::from_bytes(bytes).expect("valid ULID bytes")
}

/// Create a usage record key.
///
/// Format: `account_id (16 bytes) || record_id (16 bytes)`.
#[must_use]
pub fn usage_key(account_id: &AccountId, record_id: &EntryId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(account_id.as_bytes());
    key.extend_from_slice(&record_id.to_bytes());
    key
}

/// Create the natural-key index entry for one consumed resource.
///
/// Format: `account_id (16 bytes) || resource_key (utf-8 bytes)`.
#[must_use]
pub fn resource_key(account_id: &AccountId, resource: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(16 + resource.len());
    key.extend_from_slice(account_id.as_bytes());
    key.extend_from_slice(resource.as_bytes());
    key
}

/// Create a processed-event key from a provider event ID.
#[must_use]
pub fn event_key(event_id: &str) -> Vec<u8> {
    event_id.as_bytes().to_vec()
}
