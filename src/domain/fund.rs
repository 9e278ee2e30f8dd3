use super::account::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Regulatory category of an investment fund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FundCategory {
    /// Voluntary pension fund.
    Fpv,
    /// Collective investment fund.
    Fic,
}

impl fmt::Display for FundCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fpv => f.write_str("FPV"),
            Self::Fic => f.write_str("FIC"),
        }
    }
}

/// A catalog entry describing a subscribable fund.
///
/// Fund definitions are provisioned by the bootstrap process and are
/// immutable afterwards; the workflow only ever reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundDefinition {
    pub fund_id: String,
    pub name: String,
    pub category: FundCategory,
    pub minimum_subscription: Amount,
}

impl FundDefinition {
    pub fn new(
        fund_id: impl Into<String>,
        name: impl Into<String>,
        category: FundCategory,
        minimum_subscription: Amount,
    ) -> Self {
        Self {
            fund_id: fund_id.into(),
            name: name.into(),
            category,
            minimum_subscription,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn category_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&FundCategory::Fpv).unwrap(), "\"FPV\"");
        let back: FundCategory = serde_json::from_str("\"FIC\"").unwrap();
        assert_eq!(back, FundCategory::Fic);
    }

    #[test]
    fn fund_roundtrips_through_json() {
        let fund = FundDefinition::new(
            "FPV_BTG_PACTUAL",
            "FPV_BTG_PACTUAL",
            FundCategory::Fpv,
            Amount::new(dec!(75000)).unwrap(),
        );
        let json = serde_json::to_vec(&fund).unwrap();
        let back: FundDefinition = serde_json::from_slice(&json).unwrap();
        assert_eq!(back, fund);
    }
}
