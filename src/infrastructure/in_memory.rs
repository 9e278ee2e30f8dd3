use crate::domain::account::{Account, Balance, NotificationPreference};
use crate::domain::fund::FundDefinition;
use crate::domain::ledger::LedgerEntry;
use crate::domain::ports::{
    AccountStore, CatalogStore, StoreResult, SubscriptionLedger, TransactionLedger,
};
use crate::domain::subscription::Subscription;
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe in-memory account store.
///
/// `Arc<RwLock<HashMap>>` interior; `Clone` shares the underlying map, which
/// lets tests keep a handle to a store that has been boxed into the engine.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get(&self, account_id: &str) -> StoreResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(account_id).cloned())
    }

    async fn update_balance(
        &self,
        account_id: &str,
        expected: Balance,
        new: Balance,
    ) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        // Check and write under the same lock: this is the per-key
        // compare-and-swap the engine relies on.
        let account = accounts
            .get_mut(account_id)
            .ok_or(StoreError::ConditionFailed)?;
        if account.balance != expected {
            return Err(StoreError::ConditionFailed);
        }
        account.balance = new;
        Ok(account.clone())
    }

    async fn update_preference(
        &self,
        account_id: &str,
        preference: NotificationPreference,
    ) -> StoreResult<Option<Account>> {
        let mut accounts = self.accounts.write().await;
        Ok(accounts.get_mut(account_id).map(|account| {
            account.notification_preference = preference;
            account.clone()
        }))
    }

    async fn put(&self, account: Account) -> StoreResult<()> {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.account_id.clone(), account);
        Ok(())
    }
}

/// Thread-safe in-memory fund catalog.
#[derive(Default, Clone)]
pub struct InMemoryCatalogStore {
    funds: Arc<RwLock<HashMap<String, FundDefinition>>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn get(&self, fund_id: &str) -> StoreResult<Option<FundDefinition>> {
        let funds = self.funds.read().await;
        Ok(funds.get(fund_id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<FundDefinition>> {
        let funds = self.funds.read().await;
        let mut all: Vec<_> = funds.values().cloned().collect();
        all.sort_by(|a, b| a.fund_id.cmp(&b.fund_id));
        Ok(all)
    }

    async fn put(&self, fund: FundDefinition) -> StoreResult<()> {
        let mut funds = self.funds.write().await;
        funds.insert(fund.fund_id.clone(), fund);
        Ok(())
    }
}

/// Thread-safe in-memory subscription ledger keyed by (account, fund).
#[derive(Default, Clone)]
pub struct InMemorySubscriptionLedger {
    subscriptions: Arc<RwLock<HashMap<(String, String), Subscription>>>,
}

impl InMemorySubscriptionLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionLedger for InMemorySubscriptionLedger {
    async fn create_if_absent(&self, subscription: Subscription) -> StoreResult<Subscription> {
        let mut subscriptions = self.subscriptions.write().await;
        let key = (
            subscription.account_id.clone(),
            subscription.fund_id.clone(),
        );
        if subscriptions.contains_key(&key) {
            return Err(StoreError::ConditionFailed);
        }
        subscriptions.insert(key, subscription.clone());
        Ok(subscription)
    }

    async fn get(&self, account_id: &str, fund_id: &str) -> StoreResult<Option<Subscription>> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions
            .get(&(account_id.to_owned(), fund_id.to_owned()))
            .cloned())
    }

    async fn delete(&self, account_id: &str, fund_id: &str) -> StoreResult<()> {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.remove(&(account_id.to_owned(), fund_id.to_owned()));
        Ok(())
    }

    async fn list_by_account(&self, account_id: &str) -> StoreResult<Vec<Subscription>> {
        let subscriptions = self.subscriptions.read().await;
        let mut result: Vec<_> = subscriptions
            .values()
            .filter(|s| s.account_id == account_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.subscribed_at.cmp(&a.subscribed_at));
        Ok(result)
    }
}

/// Thread-safe in-memory transaction ledger.
///
/// Backed by an append-only `Vec`; ordering is applied on read, so listing
/// is independent of insertion order.
#[derive(Default, Clone)]
pub struct InMemoryTransactionLedger {
    entries: Arc<RwLock<Vec<LedgerEntry>>>,
}

impl InMemoryTransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionLedger for InMemoryTransactionLedger {
    async fn append(&self, entry: LedgerEntry) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        entries.push(entry);
        Ok(())
    }

    async fn list_by_account(&self, account_id: &str) -> StoreResult<Vec<LedgerEntry>> {
        let entries = self.entries.read().await;
        let mut result: Vec<_> = entries
            .iter()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(result)
    }
}
