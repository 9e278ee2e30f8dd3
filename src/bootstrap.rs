//! Initial data provisioning.
//!
//! The workflow never creates accounts or funds; an external bootstrap is
//! expected to do so. This module carries the stock catalog and demo
//! account used by the CLI and tests.

use crate::domain::account::{Account, Amount, Balance, NotificationPreference};
use crate::domain::fund::{FundCategory, FundDefinition};
use crate::domain::ports::{AccountStore, CatalogStore};
use crate::error::StoreError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn fund(id: &str, category: FundCategory, minimum: Decimal) -> FundDefinition {
    // Seed minimums are static positive literals.
    let minimum = Amount::new(minimum).expect("seed minimum must be positive");
    FundDefinition::new(id, id, category, minimum)
}

/// The stock fund catalog.
pub fn default_catalog() -> Vec<FundDefinition> {
    vec![
        fund("FPV_BTG_PACTUAL", FundCategory::Fpv, dec!(75000)),
        fund("FPV_RECAUDADORA", FundCategory::Fpv, dec!(125000)),
        fund("FIC_MANDATO", FundCategory::Fic, dec!(500000)),
        fund("FPV_DEUDAPRIVADA", FundCategory::Fpv, dec!(50000)),
        fund("FIC_ACCIONES", FundCategory::Fic, dec!(250000)),
    ]
}

/// The demo account provisioned alongside the catalog.
pub fn demo_account() -> Account {
    Account::new(
        "user123",
        Balance::new(dec!(500000)).expect("seed balance is non-negative"),
        NotificationPreference::Email,
    )
}

/// Writes the given funds and the demo account into the stores.
pub async fn provision(
    accounts: &dyn AccountStore,
    catalog: &dyn CatalogStore,
    funds: Vec<FundDefinition>,
) -> Result<(), StoreError> {
    for fund in funds {
        catalog.put(fund).await?;
    }
    accounts.put(demo_account()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_five_funds() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 5);
        assert!(catalog.iter().any(|f| f.fund_id == "FPV_BTG_PACTUAL"
            && f.minimum_subscription.value() == dec!(75000)));
    }

    #[test]
    fn demo_account_starts_with_full_balance() {
        let account = demo_account();
        assert_eq!(account.account_id, "user123");
        assert_eq!(account.balance.value(), dec!(500000));
    }
}
