use crate::domain::account::{Account, Balance, NotificationPreference};
use crate::domain::fund::FundDefinition;
use crate::domain::ledger::LedgerEntry;
use crate::domain::ports::{
    AccountStore, CatalogStore, StoreResult, SubscriptionLedger, TransactionLedger,
};
use crate::domain::subscription::Subscription;
use crate::error::StoreError;
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column family for account records.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column family for fund definitions.
pub const CF_FUNDS: &str = "funds";
/// Column family for live subscriptions, keyed by (account, fund).
pub const CF_SUBSCRIPTIONS: &str = "subscriptions";
/// Column family for ledger entries, keyed by transaction id.
pub const CF_TRANSACTIONS: &str = "transactions";
/// Secondary index: (account, timestamp, transaction id) -> transaction id.
pub const CF_TRANSACTIONS_BY_ACCOUNT: &str = "transactions_by_account";

/// Separator byte for composite keys. Account and fund ids are plain
/// identifiers and never contain it.
const KEY_SEP: u8 = 0;

/// A persistent store implementation backing all four ports with RocksDB.
///
/// Values are serde_json; each table lives in its own column family.
/// RocksDB has no native compare-and-swap, so the conditional writes
/// (`update_balance`, `create_if_absent`) serialize their read-check-write
/// pair behind an internal mutex. `Clone` shares the underlying handle.
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

fn unavailable(err: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at the given path, ensuring all
    /// column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [
            CF_ACCOUNTS,
            CF_FUNDS,
            CF_SUBSCRIPTIONS,
            CF_TRANSACTIONS,
            CF_TRANSACTIONS_BY_ACCOUNT,
        ]
        .into_iter()
        .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
        .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, cfs).map_err(unavailable)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> StoreResult<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Unavailable(format!("column family {name} missing")))
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        cf_name: &str,
        key: &[u8],
    ) -> StoreResult<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key).map_err(unavailable)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_json<T: serde::Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> StoreResult<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key, bytes).map_err(unavailable)
    }
}

fn subscription_key(account_id: &str, fund_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(account_id.len() + 1 + fund_id.len());
    key.extend_from_slice(account_id.as_bytes());
    key.push(KEY_SEP);
    key.extend_from_slice(fund_id.as_bytes());
    key
}

fn account_prefix(account_id: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(account_id.len() + 1);
    prefix.extend_from_slice(account_id.as_bytes());
    prefix.push(KEY_SEP);
    prefix
}

fn index_key(entry: &LedgerEntry) -> Vec<u8> {
    let mut key = account_prefix(&entry.account_id);
    // Big-endian nanos keep the index chronological at the full precision
    // the timestamps carry; the id disambiguates exact ties.
    let nanos = entry.timestamp.timestamp_nanos_opt().unwrap_or(i64::MAX);
    key.extend_from_slice(&nanos.to_be_bytes());
    key.extend_from_slice(entry.transaction_id.as_bytes());
    key
}

#[async_trait]
impl AccountStore for RocksDbStore {
    async fn get(&self, account_id: &str) -> StoreResult<Option<Account>> {
        self.get_json(CF_ACCOUNTS, account_id.as_bytes())
    }

    async fn update_balance(
        &self,
        account_id: &str,
        expected: Balance,
        new: Balance,
    ) -> StoreResult<Account> {
        let _guard = self.write_lock.lock().await;
        let mut account: Account = self
            .get_json(CF_ACCOUNTS, account_id.as_bytes())?
            .ok_or(StoreError::ConditionFailed)?;
        if account.balance != expected {
            return Err(StoreError::ConditionFailed);
        }
        account.balance = new;
        self.put_json(CF_ACCOUNTS, account_id.as_bytes(), &account)?;
        Ok(account)
    }

    async fn update_preference(
        &self,
        account_id: &str,
        preference: NotificationPreference,
    ) -> StoreResult<Option<Account>> {
        let _guard = self.write_lock.lock().await;
        let Some(mut account) = self.get_json::<Account>(CF_ACCOUNTS, account_id.as_bytes())?
        else {
            return Ok(None);
        };
        account.notification_preference = preference;
        self.put_json(CF_ACCOUNTS, account_id.as_bytes(), &account)?;
        Ok(Some(account))
    }

    async fn put(&self, account: Account) -> StoreResult<()> {
        self.put_json(CF_ACCOUNTS, account.account_id.as_bytes(), &account)
    }
}

#[async_trait]
impl CatalogStore for RocksDbStore {
    async fn get(&self, fund_id: &str) -> StoreResult<Option<FundDefinition>> {
        self.get_json(CF_FUNDS, fund_id.as_bytes())
    }

    async fn list(&self) -> StoreResult<Vec<FundDefinition>> {
        let cf = self.cf(CF_FUNDS)?;
        let mut funds = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item.map_err(unavailable)?;
            funds.push(serde_json::from_slice(&value)?);
        }
        Ok(funds)
    }

    async fn put(&self, fund: FundDefinition) -> StoreResult<()> {
        self.put_json(CF_FUNDS, fund.fund_id.as_bytes(), &fund)
    }
}

#[async_trait]
impl SubscriptionLedger for RocksDbStore {
    async fn create_if_absent(&self, subscription: Subscription) -> StoreResult<Subscription> {
        let _guard = self.write_lock.lock().await;
        let key = subscription_key(&subscription.account_id, &subscription.fund_id);
        let existing: Option<Subscription> = self.get_json(CF_SUBSCRIPTIONS, &key)?;
        if existing.is_some() {
            return Err(StoreError::ConditionFailed);
        }
        self.put_json(CF_SUBSCRIPTIONS, &key, &subscription)?;
        Ok(subscription)
    }

    async fn get(&self, account_id: &str, fund_id: &str) -> StoreResult<Option<Subscription>> {
        self.get_json(CF_SUBSCRIPTIONS, &subscription_key(account_id, fund_id))
    }

    async fn delete(&self, account_id: &str, fund_id: &str) -> StoreResult<()> {
        let cf = self.cf(CF_SUBSCRIPTIONS)?;
        self.db
            .delete_cf(cf, subscription_key(account_id, fund_id))
            .map_err(unavailable)
    }

    async fn list_by_account(&self, account_id: &str) -> StoreResult<Vec<Subscription>> {
        let cf = self.cf(CF_SUBSCRIPTIONS)?;
        let prefix = account_prefix(account_id);
        let mut subscriptions: Vec<Subscription> = Vec::new();
        for item in self
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix, rocksdb::Direction::Forward))
        {
            let (key, value) = item.map_err(unavailable)?;
            if !key.starts_with(&prefix) {
                break;
            }
            subscriptions.push(serde_json::from_slice(&value)?);
        }
        subscriptions.sort_by(|a, b| b.subscribed_at.cmp(&a.subscribed_at));
        Ok(subscriptions)
    }
}

#[async_trait]
impl TransactionLedger for RocksDbStore {
    async fn append(&self, entry: LedgerEntry) -> StoreResult<()> {
        let transactions = self.cf(CF_TRANSACTIONS)?;
        let index = self.cf(CF_TRANSACTIONS_BY_ACCOUNT)?;

        // Record and index entry land atomically.
        let mut batch = WriteBatch::default();
        batch.put_cf(
            transactions,
            entry.transaction_id.as_bytes(),
            serde_json::to_vec(&entry)?,
        );
        batch.put_cf(index, index_key(&entry), entry.transaction_id.as_bytes());
        self.db.write(batch).map_err(unavailable)
    }

    async fn list_by_account(&self, account_id: &str) -> StoreResult<Vec<LedgerEntry>> {
        let index = self.cf(CF_TRANSACTIONS_BY_ACCOUNT)?;
        let prefix = account_prefix(account_id);

        let mut ids = Vec::new();
        for item in self
            .db
            .iterator_cf(index, IteratorMode::From(&prefix, rocksdb::Direction::Forward))
        {
            let (key, value) = item.map_err(unavailable)?;
            if !key.starts_with(&prefix) {
                break;
            }
            ids.push(value.to_vec());
        }

        // The index is chronological; the contract wants newest first.
        let mut entries = Vec::with_capacity(ids.len());
        for id in ids.into_iter().rev() {
            let entry: LedgerEntry = self.get_json(CF_TRANSACTIONS, &id)?.ok_or_else(|| {
                StoreError::Unavailable("ledger index points at a missing entry".into())
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }
}
