use fundsub::application::engine::WorkflowEngine;
use fundsub::bootstrap;
use fundsub::domain::account::{Account, Balance, NotificationPreference};
use fundsub::domain::ports::AccountStore;
use fundsub::infrastructure::in_memory::{
    InMemoryAccountStore, InMemoryCatalogStore, InMemorySubscriptionLedger,
    InMemoryTransactionLedger,
};
use fundsub::infrastructure::notifier::LogNotifier;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Engine wired to in-memory stores, with handles kept for inspection.
pub struct Harness {
    pub engine: Arc<WorkflowEngine>,
    pub accounts: InMemoryAccountStore,
    pub catalog: InMemoryCatalogStore,
    pub subscriptions: InMemorySubscriptionLedger,
    pub ledger: InMemoryTransactionLedger,
}

/// Builds a harness seeded with the stock catalog and the `user123` demo
/// account (balance 500 000, email notifications).
pub async fn seeded() -> Harness {
    let accounts = InMemoryAccountStore::new();
    let catalog = InMemoryCatalogStore::new();
    let subscriptions = InMemorySubscriptionLedger::new();
    let ledger = InMemoryTransactionLedger::new();

    bootstrap::provision(&accounts, &catalog, bootstrap::default_catalog())
        .await
        .unwrap();

    let engine = WorkflowEngine::new(
        Box::new(accounts.clone()),
        Box::new(catalog.clone()),
        Box::new(subscriptions.clone()),
        Box::new(ledger.clone()),
        Box::new(LogNotifier),
    );

    Harness {
        engine: Arc::new(engine),
        accounts,
        catalog,
        subscriptions,
        ledger,
    }
}

#[allow(dead_code)]
pub async fn add_account(harness: &Harness, account_id: &str, balance: Decimal) {
    harness
        .accounts
        .put(Account::new(
            account_id,
            Balance::new(balance).unwrap(),
            NotificationPreference::Sms,
        ))
        .await
        .unwrap();
}

#[allow(dead_code)]
pub async fn balance_of(harness: &Harness, account_id: &str) -> Decimal {
    harness
        .accounts
        .get(account_id)
        .await
        .unwrap()
        .unwrap()
        .balance
        .value()
}
