use crate::domain::account::{Account, Amount, NotificationPreference};
use crate::domain::ledger::LedgerEntry;
use crate::domain::ports::{
    AccountStoreBox, CatalogStoreBox, NotifierBox, SubscriptionLedgerBox, TransactionLedgerBox,
};
use crate::domain::subscription::Subscription;
use crate::error::{Result, StoreError, WorkflowError, WorkflowStep};
use serde::Serialize;
use tracing::{info, warn};

/// How often the balance debit re-reads and retries after losing a
/// compare-and-swap race.
const MAX_DEBIT_ATTEMPTS: usize = 3;

/// Success envelope for a completed subscribe workflow.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeReceipt {
    pub subscription: Subscription,
    pub message: String,
}

/// Success envelope for a completed unsubscribe workflow.
#[derive(Debug, Clone, Serialize)]
pub struct UnsubscribeReceipt {
    pub message: String,
}

/// Orchestrates subscribe/unsubscribe across the four stores.
///
/// The engine holds no mutable state of its own; all shared state lives in
/// the stores, and all serialization between concurrent invocations is
/// pushed down to the stores' per-key conditional writes. Invocations for
/// different accounts never block each other.
pub struct WorkflowEngine {
    accounts: AccountStoreBox,
    catalog: CatalogStoreBox,
    subscriptions: SubscriptionLedgerBox,
    ledger: TransactionLedgerBox,
    notifier: NotifierBox,
}

impl WorkflowEngine {
    pub fn new(
        accounts: AccountStoreBox,
        catalog: CatalogStoreBox,
        subscriptions: SubscriptionLedgerBox,
        ledger: TransactionLedgerBox,
        notifier: NotifierBox,
    ) -> Self {
        Self {
            accounts,
            catalog,
            subscriptions,
            ledger,
            notifier,
        }
    }

    /// Subscribes an account to a fund, debiting the fund's minimum amount.
    ///
    /// Preconditions are checked in a fixed order, each short-circuiting
    /// with its own error: account exists, fund exists, no live
    /// subscription, sufficient balance. Mutations then run in a fixed
    /// order too: subscription create, balance debit, ledger append,
    /// notification. Only the create is guarded against concurrent
    /// duplicates; once it commits there is no rollback.
    pub async fn subscribe(&self, account_id: &str, fund_id: &str) -> Result<SubscribeReceipt> {
        match self.run_subscribe(account_id, fund_id).await {
            Ok(receipt) => {
                info!(account_id, fund_id, "subscribe completed");
                Ok(receipt)
            }
            Err(err) => {
                warn!(account_id, fund_id, code = err.code(), %err, "subscribe failed");
                Err(err)
            }
        }
    }

    async fn run_subscribe(&self, account_id: &str, fund_id: &str) -> Result<SubscribeReceipt> {
        let account =
            self.accounts
                .get(account_id)
                .await?
                .ok_or_else(|| WorkflowError::AccountNotFound {
                    account_id: account_id.to_owned(),
                })?;

        let fund = self
            .catalog
            .get(fund_id)
            .await?
            .ok_or_else(|| WorkflowError::FundNotFound {
                fund_id: fund_id.to_owned(),
            })?;

        if self.subscriptions.get(account_id, fund_id).await?.is_some() {
            return Err(WorkflowError::AlreadySubscribed {
                account_id: account_id.to_owned(),
                fund_id: fund_id.to_owned(),
            });
        }

        let minimum = fund.minimum_subscription;
        if !account.balance.covers(minimum) {
            return Err(WorkflowError::InsufficientBalance {
                account_id: account_id.to_owned(),
                fund_id: fund_id.to_owned(),
                required: minimum.value(),
                current: account.balance.value(),
            });
        }

        // Point of no return. A concurrent subscribe for the same pair loses
        // here and is reported as AlreadySubscribed.
        let subscription = match self
            .subscriptions
            .create_if_absent(Subscription::now(account_id, fund_id))
            .await
        {
            Ok(subscription) => subscription,
            Err(StoreError::ConditionFailed) => {
                return Err(WorkflowError::AlreadySubscribed {
                    account_id: account_id.to_owned(),
                    fund_id: fund_id.to_owned(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        let account = self.debit(account, minimum, fund_id).await?;

        let entry = LedgerEntry::subscribe(account_id, fund_id, minimum.value());
        if let Err(err) = self.ledger.append(entry).await {
            return Err(WorkflowError::Incomplete {
                account_id: account_id.to_owned(),
                fund_id: fund_id.to_owned(),
                step: WorkflowStep::LedgerAppend,
                source: err,
            });
        }

        let mut message = format!(
            "Successfully subscribed to fund {}. Amount debited: {}.",
            fund.name, minimum
        );
        let preference = account.notification_preference;
        let notified = self
            .notifier
            .send(preference, account_id, &message)
            .await;
        if notified {
            message.push_str(&format!(" Notification sent via {preference}."));
        }

        Ok(SubscribeReceipt {
            subscription,
            message,
        })
    }

    /// Removes a live subscription. No balance check and no refund.
    pub async fn unsubscribe(&self, account_id: &str, fund_id: &str) -> Result<UnsubscribeReceipt> {
        match self.run_unsubscribe(account_id, fund_id).await {
            Ok(receipt) => {
                info!(account_id, fund_id, "unsubscribe completed");
                Ok(receipt)
            }
            Err(err) => {
                warn!(account_id, fund_id, code = err.code(), %err, "unsubscribe failed");
                Err(err)
            }
        }
    }

    async fn run_unsubscribe(&self, account_id: &str, fund_id: &str) -> Result<UnsubscribeReceipt> {
        let account =
            self.accounts
                .get(account_id)
                .await?
                .ok_or_else(|| WorkflowError::AccountNotFound {
                    account_id: account_id.to_owned(),
                })?;

        let fund = self
            .catalog
            .get(fund_id)
            .await?
            .ok_or_else(|| WorkflowError::FundNotFound {
                fund_id: fund_id.to_owned(),
            })?;

        if self.subscriptions.get(account_id, fund_id).await?.is_none() {
            return Err(WorkflowError::NotSubscribed {
                account_id: account_id.to_owned(),
                fund_id: fund_id.to_owned(),
            });
        }

        self.subscriptions.delete(account_id, fund_id).await?;

        let entry = LedgerEntry::unsubscribe(account_id, fund_id);
        if let Err(err) = self.ledger.append(entry).await {
            return Err(WorkflowError::Incomplete {
                account_id: account_id.to_owned(),
                fund_id: fund_id.to_owned(),
                step: WorkflowStep::LedgerAppend,
                source: err,
            });
        }

        let mut message = format!("Successfully unsubscribed from fund {}.", fund.name);
        let preference = account.notification_preference;
        let notified = self
            .notifier
            .send(preference, account_id, &message)
            .await;
        if notified {
            message.push_str(&format!(" Notification sent via {preference}."));
        }

        Ok(UnsubscribeReceipt { message })
    }

    /// Switches the account's notification preference.
    ///
    /// Takes effect for every later workflow notification; in-flight
    /// invocations keep the preference they read.
    pub async fn update_preference(
        &self,
        account_id: &str,
        preference: NotificationPreference,
    ) -> Result<Account> {
        match self.accounts.update_preference(account_id, preference).await? {
            Some(account) => {
                info!(account_id, %preference, "notification preference updated");
                Ok(account)
            }
            None => {
                let err = WorkflowError::AccountNotFound {
                    account_id: account_id.to_owned(),
                };
                warn!(account_id, code = err.code(), %err, "preference update failed");
                Err(err)
            }
        }
    }

    /// Lists the account's live subscriptions, newest first. An unknown
    /// account simply yields an empty list.
    pub async fn subscriptions(&self, account_id: &str) -> Result<Vec<Subscription>> {
        Ok(self.subscriptions.list_by_account(account_id).await?)
    }

    /// Lists the account's audit trail, newest first.
    pub async fn ledger(&self, account_id: &str) -> Result<Vec<LedgerEntry>> {
        Ok(self.ledger.list_by_account(account_id).await?)
    }

    /// Applies the debit via compare-and-swap, re-reading on contention.
    ///
    /// The subscription record is already committed when this runs, so a
    /// debit that cannot complete leaves the stores inconsistent and is
    /// surfaced as `Incomplete` for out-of-band reconciliation.
    async fn debit(&self, mut account: Account, amount: Amount, fund_id: &str) -> Result<Account> {
        let incomplete = |source: StoreError, account_id: &str| WorkflowError::Incomplete {
            account_id: account_id.to_owned(),
            fund_id: fund_id.to_owned(),
            step: WorkflowStep::BalanceDebit,
            source,
        };

        for _ in 0..MAX_DEBIT_ATTEMPTS {
            let Some(new_balance) = account.balance.debit(amount) else {
                // A concurrent debit drained the balance after our
                // sufficiency check passed.
                break;
            };
            match self
                .accounts
                .update_balance(&account.account_id, account.balance, new_balance)
                .await
            {
                Ok(updated) => return Ok(updated),
                Err(StoreError::ConditionFailed) => {
                    match self.accounts.get(&account.account_id).await {
                        Ok(Some(current)) => account = current,
                        Ok(None) => break,
                        Err(err) => return Err(incomplete(err, &account.account_id)),
                    }
                }
                Err(err) => return Err(incomplete(err, &account.account_id)),
            }
        }

        Err(incomplete(StoreError::ConditionFailed, &account.account_id))
    }
}
