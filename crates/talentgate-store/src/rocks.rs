//! `RocksDB` storage implementation.
//!
//! Uses a pessimistic [`TransactionDB`]: every compound operation locks the
//! account row with `get_for_update` for the duration of its transaction, so
//! concurrent consumes serialize on the row and never observe a stale
//! balance. Commit is all-or-nothing; an error path drops the transaction
//! and nothing becomes visible.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, MultiThreaded, Options,
    Transaction, TransactionDB, TransactionDBOptions,
};

use talentgate_core::{
    Account, AccountId, EntryId, LedgerEntry, Plan, ProcessedExternalEvent, ReplenishmentEffect,
    UsageRecord, SIGNUP_BONUS_CREDITS,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{Consumption, EventOutcome, Store};

type Txn<'a> = Transaction<'a, TransactionDB<MultiThreaded>>;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: TransactionDB<MultiThreaded>,
}

impl RocksStore {
    /// Open or create a `RocksDB` transaction database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let txn_opts = TransactionDBOptions::default();

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = TransactionDB::open_cf_descriptors(&opts, &txn_opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Read the account row under an exclusive lock.
    ///
    /// The lock is held until the transaction commits or is dropped; every
    /// compound operation takes it first, so operations on one account
    /// serialize here.
    fn account_for_update(&self, txn: &Txn<'_>, account_id: &AccountId) -> Result<Account> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(account_id);

        txn.get_for_update_cf(&cf, key, true)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()?
            .ok_or_else(|| StoreError::NotFound {
                entity: "account",
                id: account_id.to_string(),
            })
    }

    /// Write the account row inside a transaction, refreshing `updated_at`.
    fn put_account_in_txn(&self, txn: &Txn<'_>, account: &mut Account) -> Result<()> {
        account.updated_at = chrono::Utc::now();

        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(&account.account_id);
        let value = Self::serialize(account)?;

        txn.put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Append a ledger entry and its account index inside a transaction.
    fn append_entry_in_txn(&self, txn: &Txn<'_>, entry: &LedgerEntry) -> Result<()> {
        let cf_ledger = self.cf(cf::LEDGER)?;
        let cf_by_account = self.cf(cf::LEDGER_BY_ACCOUNT)?;

        let entry_key = keys::ledger_key(&entry.id);
        let index_key = keys::account_ledger_key(&entry.account_id, &entry.id);
        let value = Self::serialize(entry)?;

        txn.put_cf(&cf_ledger, entry_key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        txn.put_cf(&cf_by_account, index_key, [])
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Credit an account inside an open transaction. Shared by the direct
    /// purchase path and the webhook event path.
    fn add_credits_in_txn(
        &self,
        txn: &Txn<'_>,
        account_id: &AccountId,
        amount: i64,
        metadata: serde_json::Value,
    ) -> Result<i64> {
        if amount <= 0 {
            return Err(StoreError::InvalidAmount { amount });
        }

        let mut account = self.account_for_update(txn, account_id)?;
        account.credits = account
            .credits
            .checked_add(amount)
            .ok_or(StoreError::InvalidAmount { amount })?;

        let entry = LedgerEntry::purchase(*account_id, amount, account.credits, metadata);
        self.append_entry_in_txn(txn, &entry)?;
        self.put_account_in_txn(txn, &mut account)?;

        Ok(account.credits)
    }

    /// Move an account to the unlimited plan inside an open transaction.
    fn upgrade_in_txn(
        &self,
        txn: &Txn<'_>,
        account_id: &AccountId,
        metadata: serde_json::Value,
    ) -> Result<()> {
        let mut account = self.account_for_update(txn, account_id)?;
        account.plan = Plan::Unlimited;

        let entry = LedgerEntry::subscription(*account_id, account.credits, metadata);
        self.append_entry_in_txn(txn, &entry)?;
        self.put_account_in_txn(txn, &mut account)
    }

    fn commit(txn: Txn<'_>) -> Result<()> {
        txn.commit().map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Check whether a payment event has already been applied.
    ///
    /// Diagnostic accessor for tests and operational tooling; the webhook
    /// path relies on `apply_event`'s in-transaction check instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn has_processed_event(&self, event_id: &str) -> Result<bool> {
        let cf = self.cf(cf::PROCESSED_EVENTS)?;
        let key = keys::event_key(event_id);

        let exists = self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();

        Ok(exists)
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Accounts
    // =========================================================================

    fn create_account(&self, account_id: &AccountId) -> Result<Account> {
        let txn = self.db.transaction();
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(account_id);

        // The exclusive lock makes two racing provisioning calls serialize;
        // the loser observes the committed row and fails.
        let existing = txn
            .get_for_update_cf(&cf, &key, true)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        if existing.is_some() {
            return Err(StoreError::AlreadyExists {
                id: account_id.to_string(),
            });
        }

        let mut account = Account::new(*account_id);
        account.credits = SIGNUP_BONUS_CREDITS;

        let entry = LedgerEntry::signup_bonus(*account_id, SIGNUP_BONUS_CREDITS);
        self.append_entry_in_txn(&txn, &entry)?;
        self.put_account_in_txn(&txn, &mut account)?;
        Self::commit(txn)?;

        tracing::debug!(account_id = %account_id, "account provisioned with signup bonus");
        Ok(account)
    }

    fn get_account(&self, account_id: &AccountId) -> Result<Option<Account>> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(account_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    // =========================================================================
    // Consumption gate
    // =========================================================================

    fn consume(&self, account_id: &AccountId, resource_key: &str) -> Result<Consumption> {
        let txn = self.db.transaction();

        // Lock order: account row first, then the resource natural key.
        let mut account = self.account_for_update(&txn, account_id)?;

        let cf_by_resource = self.cf(cf::USAGE_BY_RESOURCE)?;
        let resource_index_key = keys::resource_key(account_id, resource_key);

        let prior = txn
            .get_for_update_cf(&cf_by_resource, &resource_index_key, true)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if let Some(record_id_bytes) = prior {
            // Already consumed: return the original outcome, write nothing.
            let mut bytes = [0u8; 16];
            bytes.copy_from_slice(&record_id_bytes);
            let record_id = EntryId::from_bytes(bytes).map_err(|e| {
                StoreError::Serialization(format!("bad usage index value: {e}"))
            })?;

            let cf_usage = self.cf(cf::USAGE)?;
            let record: UsageRecord = txn
                .get_cf(&cf_usage, keys::usage_key(account_id, &record_id))
                .map_err(|e| StoreError::Database(e.to_string()))?
                .map(|data| Self::deserialize(&data))
                .transpose()?
                .ok_or_else(|| StoreError::NotFound {
                    entity: "usage record",
                    id: record_id.to_string(),
                })?;

            return Ok(Consumption {
                new_balance: account.credits,
                ledger_entry_id: record.ledger_entry_id,
                credit_charged: false,
                deduplicated: true,
            });
        }

        let credit_charged = match account.plan {
            Plan::Unlimited => false,
            Plan::Metered => {
                if account.credits <= 0 {
                    // Abort: the dropped transaction leaves no trace.
                    return Err(StoreError::InsufficientCredits {
                        balance: account.credits,
                    });
                }
                account.credits -= 1;
                true
            }
        };

        let delta = if credit_charged { -1 } else { 0 };
        let entry = LedgerEntry::consumption(*account_id, delta, account.credits, resource_key);
        let record = UsageRecord::new(*account_id, resource_key, credit_charged, entry.id);

        self.append_entry_in_txn(&txn, &entry)?;

        let cf_usage = self.cf(cf::USAGE)?;
        txn.put_cf(
            &cf_usage,
            keys::usage_key(account_id, &record.id),
            Self::serialize(&record)?,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        txn.put_cf(&cf_by_resource, resource_index_key, record.id.to_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))?;

        self.put_account_in_txn(&txn, &mut account)?;
        Self::commit(txn)?;

        Ok(Consumption {
            new_balance: account.credits,
            ledger_entry_id: entry.id,
            credit_charged,
            deduplicated: false,
        })
    }

    // =========================================================================
    // Replenishment
    // =========================================================================

    fn add_credits(
        &self,
        account_id: &AccountId,
        amount: i64,
        metadata: serde_json::Value,
    ) -> Result<i64> {
        let txn = self.db.transaction();
        let new_balance = self.add_credits_in_txn(&txn, account_id, amount, metadata)?;
        Self::commit(txn)?;
        Ok(new_balance)
    }

    fn upgrade_to_unlimited(
        &self,
        account_id: &AccountId,
        metadata: serde_json::Value,
    ) -> Result<()> {
        let txn = self.db.transaction();
        self.upgrade_in_txn(&txn, account_id, metadata)?;
        Self::commit(txn)
    }

    fn apply_event(
        &self,
        event_id: &str,
        event_type: &str,
        effect: &ReplenishmentEffect,
    ) -> Result<EventOutcome> {
        let txn = self.db.transaction();
        let cf_events = self.cf(cf::PROCESSED_EVENTS)?;
        let key = keys::event_key(event_id);

        // The event key is the idempotency constraint. Locking it here means
        // two racing deliveries of the same id serialize: the second sees the
        // first's committed marker and becomes a no-op instead of a double
        // application.
        let existing = txn
            .get_for_update_cf(&cf_events, &key, true)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        if existing.is_some() {
            return Ok(EventOutcome::Deduplicated);
        }

        let new_balance = match effect {
            ReplenishmentEffect::AddCredits {
                account_id,
                amount,
                metadata,
            } => Some(self.add_credits_in_txn(&txn, account_id, *amount, metadata.clone())?),
            ReplenishmentEffect::UpgradeToUnlimited {
                account_id,
                metadata,
            } => {
                self.upgrade_in_txn(&txn, account_id, metadata.clone())?;
                None
            }
        };

        let marker = ProcessedExternalEvent::new(event_id, event_type);
        txn.put_cf(&cf_events, key, Self::serialize(&marker)?)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Self::commit(txn)?;

        Ok(EventOutcome::Applied { new_balance })
    }

    // =========================================================================
    // History
    // =========================================================================

    fn get_ledger_entry(&self, entry_id: &EntryId) -> Result<Option<LedgerEntry>> {
        let cf = self.cf(cf::LEDGER)?;
        let key = keys::ledger_key(entry_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_ledger(
        &self,
        account_id: &AccountId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LedgerEntry>> {
        let cf_by_account = self.cf(cf::LEDGER_BY_ACCOUNT)?;
        let prefix = keys::account_prefix(account_id);

        // Collect the account's index keys; ULID suffixes make them
        // time-ordered, so reversing gives newest first.
        let iter = self.db.iterator_cf(
            &cf_by_account,
            IteratorMode::From(&prefix, Direction::Forward),
        );

        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            all_keys.push(key.to_vec());
        }
        all_keys.reverse();

        let mut entries = Vec::new();
        for key in all_keys.into_iter().skip(offset) {
            if entries.len() >= limit {
                break;
            }
            let entry_id = keys::extract_entry_id(&key);
            if let Some(entry) = self.get_ledger_entry(&entry_id)? {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    fn list_usage(
        &self,
        account_id: &AccountId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<UsageRecord>> {
        let cf_usage = self.cf(cf::USAGE)?;
        let prefix = keys::account_prefix(account_id);

        let iter = self
            .db
            .iterator_cf(&cf_usage, IteratorMode::From(&prefix, Direction::Forward));

        let mut all: Vec<UsageRecord> = Vec::new();
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            all.push(Self::deserialize(&value)?);
        }
        all.reverse();

        Ok(all.into_iter().skip(offset).take(limit).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use talentgate_core::LedgerReason;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn ledger_sum(store: &RocksStore, account_id: &AccountId) -> i64 {
        store
            .list_ledger(account_id, 1000, 0)
            .unwrap()
            .iter()
            .map(|e| e.delta)
            .sum()
    }

    #[test]
    fn provisioned_account_has_signup_bonus() {
        let (store, _dir) = create_test_store();
        let account_id = AccountId::generate();

        let account = store.create_account(&account_id).unwrap();
        assert_eq!(account.credits, 5);
        assert_eq!(account.plan, Plan::Metered);

        let ledger = store.list_ledger(&account_id, 10, 0).unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].delta, 5);
        assert_eq!(ledger[0].balance_after, 5);
        assert_eq!(ledger[0].reason, LedgerReason::SignupBonus);
    }

    #[test]
    fn provisioning_twice_fails() {
        let (store, _dir) = create_test_store();
        let account_id = AccountId::generate();

        store.create_account(&account_id).unwrap();
        let result = store.create_account(&account_id);
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));

        // The failed call must not have touched the ledger.
        assert_eq!(store.list_ledger(&account_id, 10, 0).unwrap().len(), 1);
    }

    #[test]
    fn consume_decrements_and_records() {
        let (store, _dir) = create_test_store();
        let account_id = AccountId::generate();
        store.create_account(&account_id).unwrap();

        let outcome = store.consume(&account_id, "octocat").unwrap();
        assert_eq!(outcome.new_balance, 4);
        assert!(outcome.credit_charged);
        assert!(!outcome.deduplicated);

        let entry = store
            .get_ledger_entry(&outcome.ledger_entry_id)
            .unwrap()
            .unwrap();
        assert_eq!(entry.delta, -1);
        assert_eq!(entry.balance_after, 4);
        assert_eq!(entry.reason, LedgerReason::Consumption);

        let usage = store.list_usage(&account_id, 10, 0).unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].resource_key, "octocat");
        assert!(usage[0].credit_charged);
        assert_eq!(usage[0].ledger_entry_id, outcome.ledger_entry_id);
    }

    #[test]
    fn consume_same_resource_charges_once() {
        let (store, _dir) = create_test_store();
        let account_id = AccountId::generate();
        store.create_account(&account_id).unwrap();

        let first = store.consume(&account_id, "octocat").unwrap();
        let second = store.consume(&account_id, "octocat").unwrap();

        assert_eq!(second.new_balance, 4);
        assert!(!second.credit_charged);
        assert!(second.deduplicated);
        assert_eq!(second.ledger_entry_id, first.ledger_entry_id);

        assert_eq!(store.list_usage(&account_id, 10, 0).unwrap().len(), 1);
        assert_eq!(ledger_sum(&store, &account_id), 4);
    }

    #[test]
    fn consume_at_zero_fails_and_writes_nothing() {
        let (store, _dir) = create_test_store();
        let account_id = AccountId::generate();
        store.create_account(&account_id).unwrap();

        for i in 0..5 {
            store.consume(&account_id, &format!("profile-{i}")).unwrap();
        }

        let result = store.consume(&account_id, "one-too-many");
        assert!(matches!(
            result,
            Err(StoreError::InsufficientCredits { balance: 0 })
        ));

        let account = store.get_account(&account_id).unwrap().unwrap();
        assert_eq!(account.credits, 0);
        // Ledger: signup bonus plus exactly five consumptions.
        assert_eq!(store.list_ledger(&account_id, 100, 0).unwrap().len(), 6);
        assert_eq!(store.list_usage(&account_id, 100, 0).unwrap().len(), 5);
    }

    #[test]
    fn consume_unknown_account_fails() {
        let (store, _dir) = create_test_store();
        let result = store.consume(&AccountId::generate(), "octocat");
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn unlimited_consume_is_balance_neutral() {
        let (store, _dir) = create_test_store();
        let account_id = AccountId::generate();
        store.create_account(&account_id).unwrap();
        store
            .upgrade_to_unlimited(&account_id, serde_json::json!({ "sub_id": "sub_1" }))
            .unwrap();

        let outcome = store.consume(&account_id, "octocat").unwrap();
        assert_eq!(outcome.new_balance, 5);
        assert!(!outcome.credit_charged);

        let entry = store
            .get_ledger_entry(&outcome.ledger_entry_id)
            .unwrap()
            .unwrap();
        assert_eq!(entry.delta, 0);
        assert_eq!(entry.balance_after, 5);

        let usage = store.list_usage(&account_id, 10, 0).unwrap();
        assert!(!usage[0].credit_charged);
    }

    #[test]
    fn add_credits_appends_purchase_entry() {
        let (store, _dir) = create_test_store();
        let account_id = AccountId::generate();
        store.create_account(&account_id).unwrap();

        let balance = store
            .add_credits(
                &account_id,
                50,
                serde_json::json!({ "package_id": "pack-50" }),
            )
            .unwrap();
        assert_eq!(balance, 55);

        let ledger = store.list_ledger(&account_id, 10, 0).unwrap();
        assert_eq!(ledger[0].delta, 50);
        assert_eq!(ledger[0].balance_after, 55);
        assert_eq!(ledger[0].reason, LedgerReason::Purchase);
        assert_eq!(ledger[0].metadata["package_id"], "pack-50");
    }

    #[test]
    fn add_credits_rejects_non_positive_amounts() {
        let (store, _dir) = create_test_store();
        let account_id = AccountId::generate();
        store.create_account(&account_id).unwrap();

        for amount in [0, -10] {
            let result = store.add_credits(&account_id, amount, serde_json::Value::Null);
            assert!(matches!(result, Err(StoreError::InvalidAmount { .. })));
        }

        let account = store.get_account(&account_id).unwrap().unwrap();
        assert_eq!(account.credits, 5);
    }

    #[test]
    fn add_credits_rejects_overflowing_amount() {
        let (store, _dir) = create_test_store();
        let account_id = AccountId::generate();
        store.create_account(&account_id).unwrap();

        // Balance is 5, so i64::MAX would wrap past the top.
        let result = store.add_credits(&account_id, i64::MAX, serde_json::Value::Null);
        assert!(matches!(result, Err(StoreError::InvalidAmount { .. })));

        let account = store.get_account(&account_id).unwrap().unwrap();
        assert_eq!(account.credits, 5);
        assert_eq!(store.list_ledger(&account_id, 10, 0).unwrap().len(), 1);
    }

    #[test]
    fn upgrade_records_zero_delta_entry() {
        let (store, _dir) = create_test_store();
        let account_id = AccountId::generate();
        store.create_account(&account_id).unwrap();

        store
            .upgrade_to_unlimited(&account_id, serde_json::json!({ "sub_id": "sub_1" }))
            .unwrap();

        let account = store.get_account(&account_id).unwrap().unwrap();
        assert_eq!(account.plan, Plan::Unlimited);
        assert_eq!(account.credits, 5);

        let ledger = store.list_ledger(&account_id, 10, 0).unwrap();
        assert_eq!(ledger[0].delta, 0);
        assert_eq!(ledger[0].reason, LedgerReason::Subscription);

        // Re-upgrading changes no state, only appends another audit entry.
        store
            .upgrade_to_unlimited(&account_id, serde_json::json!({ "sub_id": "sub_1" }))
            .unwrap();
        let account = store.get_account(&account_id).unwrap().unwrap();
        assert_eq!(account.plan, Plan::Unlimited);
        assert_eq!(ledger_sum(&store, &account_id), account.credits);
    }

    #[test]
    fn apply_event_is_idempotent() {
        let (store, _dir) = create_test_store();
        let account_id = AccountId::generate();
        store.create_account(&account_id).unwrap();

        let effect = ReplenishmentEffect::AddCredits {
            account_id,
            amount: 50,
            metadata: serde_json::json!({ "package_id": "pack-50" }),
        };

        let first = store
            .apply_event("evt_1", "checkout.completed", &effect)
            .unwrap();
        assert!(matches!(
            first,
            EventOutcome::Applied {
                new_balance: Some(55)
            }
        ));
        assert!(store.has_processed_event("evt_1").unwrap());

        let second = store
            .apply_event("evt_1", "checkout.completed", &effect)
            .unwrap();
        assert!(matches!(second, EventOutcome::Deduplicated));

        let account = store.get_account(&account_id).unwrap().unwrap();
        assert_eq!(account.credits, 55);
        // Exactly one purchase entry despite two deliveries.
        let purchases = store
            .list_ledger(&account_id, 100, 0)
            .unwrap()
            .into_iter()
            .filter(|e| e.reason == LedgerReason::Purchase)
            .count();
        assert_eq!(purchases, 1);
    }

    #[test]
    fn failed_event_effect_leaves_event_retriable() {
        let (store, _dir) = create_test_store();
        let account_id = AccountId::generate();

        let effect = ReplenishmentEffect::AddCredits {
            account_id,
            amount: 50,
            metadata: serde_json::Value::Null,
        };

        // Account does not exist yet: the effect fails and the marker must
        // not be written.
        let result = store.apply_event("evt_retry", "checkout.completed", &effect);
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert!(!store.has_processed_event("evt_retry").unwrap());

        // Redelivery after the account appears applies the event.
        store.create_account(&account_id).unwrap();
        let outcome = store
            .apply_event("evt_retry", "checkout.completed", &effect)
            .unwrap();
        assert!(matches!(outcome, EventOutcome::Applied { .. }));
        assert!(store.has_processed_event("evt_retry").unwrap());
    }

    #[test]
    fn concurrent_consumes_never_overdraw() {
        let (store, _dir) = create_test_store();
        let store = Arc::new(store);
        let account_id = AccountId::generate();
        store.create_account(&account_id).unwrap();

        // Burn down to a balance of 3.
        store.consume(&account_id, "warmup-1").unwrap();
        store.consume(&account_id, "warmup-2").unwrap();

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.consume(&account_id, &format!("profile-{i}"))
            }));
        }

        let mut successes = 0;
        let mut insufficient = 0;
        for handle in handles {
            match handle.join().unwrap() {
                Ok(outcome) => {
                    assert!(outcome.credit_charged);
                    successes += 1;
                }
                Err(StoreError::InsufficientCredits { .. }) => insufficient += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(successes, 3);
        assert_eq!(insufficient, 7);

        let account = store.get_account(&account_id).unwrap().unwrap();
        assert_eq!(account.credits, 0);
        assert_eq!(ledger_sum(&store, &account_id), 0);
    }

    #[test]
    fn conservation_holds_across_mixed_operations() {
        let (store, _dir) = create_test_store();
        let account_id = AccountId::generate();
        store.create_account(&account_id).unwrap();

        store.consume(&account_id, "octocat").unwrap();
        store
            .add_credits(&account_id, 50, serde_json::json!({ "package_id": "pack-50" }))
            .unwrap();
        store.consume(&account_id, "torvalds").unwrap();
        store
            .upgrade_to_unlimited(&account_id, serde_json::Value::Null)
            .unwrap();
        store.consume(&account_id, "gaearon").unwrap();

        let account = store.get_account(&account_id).unwrap().unwrap();
        assert_eq!(ledger_sum(&store, &account_id), account.credits);
    }

    #[test]
    fn listings_are_newest_first_and_paginated() {
        let (store, _dir) = create_test_store();
        let account_id = AccountId::generate();
        store.create_account(&account_id).unwrap();

        store.consume(&account_id, "first").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        store.consume(&account_id, "second").unwrap();

        let usage = store.list_usage(&account_id, 10, 0).unwrap();
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[0].resource_key, "second");
        assert_eq!(usage[1].resource_key, "first");

        let page = store.list_usage(&account_id, 1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].resource_key, "first");

        let ledger = store.list_ledger(&account_id, 2, 0).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].metadata["resource_key"], "second");
    }
}
