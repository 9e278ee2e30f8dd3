mod common;

use fundsub::domain::account::NotificationPreference;
use fundsub::error::WorkflowError;
use rust_decimal_macros::dec;

#[tokio::test]
async fn preference_update_switches_the_notification_channel() {
    let h = common::seeded().await;

    let account = h
        .engine
        .update_preference("user123", NotificationPreference::Sms)
        .await
        .unwrap();
    assert_eq!(account.notification_preference, NotificationPreference::Sms);

    // Later workflow notifications go out on the new channel.
    let receipt = h.engine.subscribe("user123", "FPV_BTG_PACTUAL").await.unwrap();
    assert!(receipt.message.contains("Notification sent via sms"));
}

#[tokio::test]
async fn preference_update_for_unknown_account_404s() {
    let h = common::seeded().await;

    let err = h
        .engine
        .update_preference("ghost", NotificationPreference::Email)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::AccountNotFound { .. }));
    assert_eq!(err.status(), 404);
}

#[tokio::test]
async fn preference_update_leaves_the_balance_alone() {
    let h = common::seeded().await;

    h.engine
        .update_preference("user123", NotificationPreference::Sms)
        .await
        .unwrap();
    assert_eq!(common::balance_of(&h, "user123").await, dec!(500000));
    assert!(h.engine.ledger("user123").await.unwrap().is_empty());
}
