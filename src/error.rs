use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Failure of a single store operation, as seen by the workflow engine.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A conditional write found the stored value did not satisfy the stated
    /// precondition. Nothing was written.
    #[error("conditional write precondition not met")]
    ConditionFailed,
    /// Transport or backend failure.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A stored value could not be (de)serialized.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// The mutation step at which a partially completed workflow stopped.
///
/// Once the subscription record is committed there is no rollback; the step
/// name is surfaced so an out-of-band reconciliation can pick up the pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    BalanceDebit,
    LedgerAppend,
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BalanceDebit => f.write_str("balance-debit"),
            Self::LedgerAppend => f.write_str("ledger-append"),
        }
    }
}

/// Every way a workflow invocation can fail.
///
/// Precondition violations are ordinary values of this type; no panic or
/// raw store error crosses the engine boundary.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("account {account_id} not found")]
    AccountNotFound { account_id: String },

    #[error("fund {fund_id} not found")]
    FundNotFound { fund_id: String },

    #[error("account {account_id} is already subscribed to fund {fund_id}")]
    AlreadySubscribed { account_id: String, fund_id: String },

    #[error("account {account_id} is not subscribed to fund {fund_id}")]
    NotSubscribed { account_id: String, fund_id: String },

    #[error("insufficient balance: fund requires a minimum of {required}, current balance is {current}")]
    InsufficientBalance {
        account_id: String,
        fund_id: String,
        required: Decimal,
        current: Decimal,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The subscription record was committed but a later step could not
    /// complete. The stores are in an inconsistent intermediate state.
    #[error("workflow for account {account_id} and fund {fund_id} stopped at {step}: {source}")]
    Incomplete {
        account_id: String,
        fund_id: String,
        step: WorkflowStep,
        source: StoreError,
    },
}

impl WorkflowError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            Self::FundNotFound { .. } => "FUND_NOT_FOUND",
            Self::AlreadySubscribed { .. } => "ALREADY_SUBSCRIBED",
            Self::NotSubscribed { .. } => "NOT_SUBSCRIBED",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::Store(StoreError::ConditionFailed) => "CONDITION_FAILED",
            Self::Store(StoreError::Unavailable(_)) => "STORE_UNAVAILABLE",
            Self::Store(_) | Self::Incomplete { .. } => "INTERNAL_ERROR",
        }
    }

    /// HTTP status the caller-facing layer maps this error to.
    pub fn status(&self) -> u16 {
        match self {
            Self::AccountNotFound { .. } | Self::FundNotFound { .. } => 404,
            Self::AlreadySubscribed { .. } => 409,
            Self::NotSubscribed { .. } | Self::InsufficientBalance { .. } => 400,
            // A surfaced conditional-write loss is a conflict the caller may
            // retry, same as AlreadySubscribed.
            Self::Store(StoreError::ConditionFailed) => 409,
            Self::Store(_) | Self::Incomplete { .. } => 500,
        }
    }

    /// Structured detail map echoed verbatim to the caller.
    pub fn details(&self) -> Map<String, Value> {
        let mut details = Map::new();
        match self {
            Self::AccountNotFound { account_id } => {
                details.insert("accountId".into(), account_id.as_str().into());
            }
            Self::FundNotFound { fund_id } => {
                details.insert("fundId".into(), fund_id.as_str().into());
            }
            Self::AlreadySubscribed {
                account_id,
                fund_id,
            }
            | Self::NotSubscribed {
                account_id,
                fund_id,
            } => {
                details.insert("accountId".into(), account_id.as_str().into());
                details.insert("fundId".into(), fund_id.as_str().into());
            }
            Self::InsufficientBalance {
                account_id,
                fund_id,
                required,
                current,
            } => {
                details.insert("accountId".into(), account_id.as_str().into());
                details.insert("fundId".into(), fund_id.as_str().into());
                details.insert("requiredAmount".into(), required.to_string().into());
                details.insert("currentBalance".into(), current.to_string().into());
            }
            Self::Store(source) => {
                details.insert("cause".into(), source.to_string().into());
            }
            Self::Incomplete {
                account_id,
                fund_id,
                step,
                source,
            } => {
                details.insert("accountId".into(), account_id.as_str().into());
                details.insert("fundId".into(), fund_id.as_str().into());
                details.insert("step".into(), step.to_string().into());
                details.insert("cause".into(), source.to_string().into());
            }
        }
        details
    }
}
