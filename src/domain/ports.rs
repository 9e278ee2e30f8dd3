use super::account::{Account, Balance, NotificationPreference};
use super::fund::FundDefinition;
use super::ledger::LedgerEntry;
use super::subscription::Subscription;
use crate::error::StoreError;
use async_trait::async_trait;

pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value access to accounts.
///
/// `update_balance` is a compare-and-swap: it applies only if the stored
/// balance still equals `expected`, otherwise it fails with
/// `StoreError::ConditionFailed` and writes nothing. This is what makes
/// concurrent debits against the same account safe without in-process locks.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get(&self, account_id: &str) -> StoreResult<Option<Account>>;
    async fn update_balance(
        &self,
        account_id: &str,
        expected: Balance,
        new: Balance,
    ) -> StoreResult<Account>;
    /// Switches the account's notification channel, returning the updated
    /// account, or `None` if the account does not exist.
    async fn update_preference(
        &self,
        account_id: &str,
        preference: NotificationPreference,
    ) -> StoreResult<Option<Account>>;
    /// Provisioning only; the workflow never creates accounts.
    async fn put(&self, account: Account) -> StoreResult<()>;
}

/// Read-only fund catalog. Definitions are immutable after provisioning.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get(&self, fund_id: &str) -> StoreResult<Option<FundDefinition>>;
    async fn list(&self) -> StoreResult<Vec<FundDefinition>>;
    /// Provisioning only.
    async fn put(&self, fund: FundDefinition) -> StoreResult<()>;
}

/// Active subscriptions keyed by `(account_id, fund_id)`.
#[async_trait]
pub trait SubscriptionLedger: Send + Sync {
    /// Creates the record only if the pair has no live subscription;
    /// fails with `StoreError::ConditionFailed` otherwise. The loser of a
    /// concurrent double-subscribe lands here.
    async fn create_if_absent(&self, subscription: Subscription) -> StoreResult<Subscription>;
    async fn get(&self, account_id: &str, fund_id: &str) -> StoreResult<Option<Subscription>>;
    /// Idempotent: deleting an absent pair is not an error.
    async fn delete(&self, account_id: &str, fund_id: &str) -> StoreResult<()>;
    /// All live subscriptions for the account, newest first.
    async fn list_by_account(&self, account_id: &str) -> StoreResult<Vec<Subscription>>;
}

/// Append-only audit trail, queryable per account.
#[async_trait]
pub trait TransactionLedger: Send + Sync {
    async fn append(&self, entry: LedgerEntry) -> StoreResult<()>;
    /// All entries for the account, newest first.
    async fn list_by_account(&self, account_id: &str) -> StoreResult<Vec<LedgerEntry>>;
}

/// Best-effort notification dispatch. The boolean result only colors the
/// response message; it never gates the workflow outcome and is not retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        preference: NotificationPreference,
        recipient: &str,
        message: &str,
    ) -> bool;
}

pub type AccountStoreBox = Box<dyn AccountStore>;
pub type CatalogStoreBox = Box<dyn CatalogStore>;
pub type SubscriptionLedgerBox = Box<dyn SubscriptionLedger>;
pub type TransactionLedgerBox = Box<dyn TransactionLedger>;
pub type NotifierBox = Box<dyn Notifier>;
