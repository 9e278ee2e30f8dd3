use crate::domain::account::Amount;
use crate::domain::fund::{FundCategory, FundDefinition};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogReadError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid minimum for fund {fund_id}: {reason}")]
    InvalidMinimum { fund_id: String, reason: String },
}

#[derive(Debug, Deserialize)]
struct FundRow {
    fund_id: String,
    name: String,
    category: FundCategory,
    minimum_subscription: Decimal,
}

/// Reads fund definitions from a CSV seed file.
///
/// Expected header: `fund_id,name,category,minimum_subscription`, with
/// `category` one of `FPV`/`FIC`. Wraps `csv::Reader` and yields lazily so
/// large seed files stream instead of loading into memory.
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    pub fn funds(self) -> impl Iterator<Item = Result<FundDefinition, CatalogReadError>> {
        self.reader.into_deserialize().map(|row| {
            let row: FundRow = row?;
            let minimum = Amount::new(row.minimum_subscription).map_err(|reason| {
                CatalogReadError::InvalidMinimum {
                    fund_id: row.fund_id.clone(),
                    reason,
                }
            })?;
            Ok(FundDefinition::new(
                row.fund_id,
                row.name,
                row.category,
                minimum,
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn reads_valid_seed_file() {
        let data = "fund_id,name,category,minimum_subscription\n\
                    FPV_BTG_PACTUAL,FPV_BTG_PACTUAL,FPV,75000\n\
                    FIC_MANDATO,FIC_MANDATO,FIC,500000";
        let funds: Vec<_> = CatalogReader::new(data.as_bytes())
            .funds()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(funds.len(), 2);
        assert_eq!(funds[0].fund_id, "FPV_BTG_PACTUAL");
        assert_eq!(funds[0].category, FundCategory::Fpv);
        assert_eq!(funds[0].minimum_subscription.value(), dec!(75000));
    }

    #[test]
    fn rejects_non_positive_minimum() {
        let data = "fund_id,name,category,minimum_subscription\n\
                    FIC_BROKEN,FIC_BROKEN,FIC,0";
        let results: Vec<_> = CatalogReader::new(data.as_bytes()).funds().collect();
        assert!(matches!(
            results[0],
            Err(CatalogReadError::InvalidMinimum { .. })
        ));
    }

    #[test]
    fn rejects_unknown_category() {
        let data = "fund_id,name,category,minimum_subscription\n\
                    X,X,ETF,1000";
        let results: Vec<_> = CatalogReader::new(data.as_bytes()).funds().collect();
        assert!(matches!(results[0], Err(CatalogReadError::Csv(_))));
    }
}
