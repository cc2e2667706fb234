//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Primary account records, keyed by `account_id`.
    pub const ACCOUNTS: &str = "accounts";

    /// Ledger entries, keyed by `entry_id` (ULID).
    pub const LEDGER: &str = "ledger";

    /// Index: ledger entries by account, keyed by `account_id || entry_id`.
    /// Value is empty (index only).
    pub const LEDGER_BY_ACCOUNT: &str = "ledger_by_account";

    /// Usage records, keyed by `account_id || record_id` (ULID, time-ordered).
    pub const USAGE: &str = "usage";

    /// Natural-key index enforcing one charge per resource, keyed by
    /// `account_id || resource_key`. Value is the usage record id.
    pub const USAGE_BY_RESOURCE: &str = "usage_by_resource";

    /// Idempotency markers for payment-provider events, keyed by `event_id`.
    pub const PROCESSED_EVENTS: &str = "processed_events";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::ACCOUNTS,
        cf::LEDGER,
        cf::LEDGER_BY_ACCOUNT,
        cf::USAGE,
        cf::USAGE_BY_RESOURCE,
        cf::PROCESSED_EVENTS,
    ]
}
