use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Subscribe,
    Unsubscribe,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subscribe => f.write_str("subscribe"),
            Self::Unsubscribe => f.write_str("unsubscribe"),
        }
    }
}

/// An immutable audit record of one successful workflow execution.
///
/// Append-only: entries are never updated or deleted once written. The id
/// and timestamp are generated at construction time, so the store only ever
/// sees a fully formed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub transaction_id: Uuid,
    pub account_id: String,
    pub fund_id: String,
    pub kind: EntryKind,
    /// Debited amount for subscribe entries, zero for unsubscribe entries.
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn subscribe(
        account_id: impl Into<String>,
        fund_id: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self::new(account_id, fund_id, EntryKind::Subscribe, amount)
    }

    pub fn unsubscribe(account_id: impl Into<String>, fund_id: impl Into<String>) -> Self {
        Self::new(account_id, fund_id, EntryKind::Unsubscribe, Decimal::ZERO)
    }

    fn new(
        account_id: impl Into<String>,
        fund_id: impl Into<String>,
        kind: EntryKind,
        amount: Decimal,
    ) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            account_id: account_id.into(),
            fund_id: fund_id.into(),
            kind,
            amount,
            timestamp: Utc::now(),
        }
    }
}
