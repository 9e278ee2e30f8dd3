use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A live link between an account and a fund.
///
/// At most one record exists per `(account_id, fund_id)` pair; its existence
/// implies the corresponding debit was applied when it was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub account_id: String,
    pub fund_id: String,
    pub subscribed_at: DateTime<Utc>,
}

impl Subscription {
    /// Creates a subscription record stamped with the current time.
    pub fn now(account_id: impl Into<String>, fund_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            fund_id: fund_id.into(),
            subscribed_at: Utc::now(),
        }
    }
}
