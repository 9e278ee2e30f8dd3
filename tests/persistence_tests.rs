#![cfg(feature = "storage-rocksdb")]

use fundsub::application::engine::WorkflowEngine;
use fundsub::bootstrap;
use fundsub::domain::ports::{AccountStore, SubscriptionLedger, TransactionLedger};
use fundsub::infrastructure::notifier::LogNotifier;
use fundsub::infrastructure::rocksdb::RocksDbStore;
use rust_decimal_macros::dec;
use tempfile::tempdir;

fn engine_on(store: &RocksDbStore) -> WorkflowEngine {
    WorkflowEngine::new(
        Box::new(store.clone()),
        Box::new(store.clone()),
        Box::new(store.clone()),
        Box::new(store.clone()),
        Box::new(LogNotifier),
    )
}

#[tokio::test]
async fn full_workflow_against_rocksdb() {
    let dir = tempdir().unwrap();
    let store = RocksDbStore::open(dir.path()).unwrap();
    bootstrap::provision(&store, &store, bootstrap::default_catalog())
        .await
        .unwrap();

    let engine = engine_on(&store);
    engine.subscribe("user123", "FPV_BTG_PACTUAL").await.unwrap();
    engine.subscribe("user123", "FPV_DEUDAPRIVADA").await.unwrap();
    engine.unsubscribe("user123", "FPV_DEUDAPRIVADA").await.unwrap();

    let account = AccountStore::get(&store, "user123").await.unwrap().unwrap();
    assert_eq!(account.balance.value(), dec!(375000));

    let live = SubscriptionLedger::list_by_account(&store, "user123")
        .await
        .unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].fund_id, "FPV_BTG_PACTUAL");

    let entries = TransactionLedger::list_by_account(&store, "user123")
        .await
        .unwrap();
    assert_eq!(entries.len(), 3);
}

#[tokio::test]
async fn state_survives_reopen() {
    let dir = tempdir().unwrap();

    {
        let store = RocksDbStore::open(dir.path()).unwrap();
        bootstrap::provision(&store, &store, bootstrap::default_catalog())
            .await
            .unwrap();
        let engine = engine_on(&store);
        engine.subscribe("user123", "FIC_ACCIONES").await.unwrap();
    }

    let store = RocksDbStore::open(dir.path()).unwrap();
    let account = AccountStore::get(&store, "user123").await.unwrap().unwrap();
    assert_eq!(account.balance.value(), dec!(250000));
    assert!(
        SubscriptionLedger::get(&store, "user123", "FIC_ACCIONES")
            .await
            .unwrap()
            .is_some()
    );
    let entries = TransactionLedger::list_by_account(&store, "user123")
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, dec!(250000));
}
