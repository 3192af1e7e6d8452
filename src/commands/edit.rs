use crate::commands::{open_store, Out};
use crate::engine::compute_ending_balance;
use crate::model::{Amount, AmountFormat, Field, Month, Row};
use crate::store::LedgerStore;
use crate::{Config, Result};
use anyhow::{anyhow, Context};
use rust_decimal::Decimal;
use serde::Serialize;

/// The row a command changed, as it now is, and where the month now ends.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edited {
    month: Month,
    row: Row,
    ending_balance: Decimal,
}

impl Edited {
    fn new(store: &LedgerStore, month: Month, index: usize) -> Result<Self> {
        let row = store
            .ledger()
            .period(month)
            .row(index)
            .cloned()
            .ok_or_else(|| anyhow!("{month} has no row {}", index + 1))?;
        Ok(Self {
            month,
            row,
            ending_balance: compute_ending_balance(store.ledger(), month),
        })
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn row(&self) -> &Row {
        &self.row
    }

    pub fn ending_balance(&self) -> Decimal {
        self.ending_balance
    }
}

/// Sets one field of row number `row` (starting at 1) in `month` and saves the ledger.
pub async fn set(
    config: Config,
    month: Month,
    row: u32,
    field: Field,
    value: &str,
) -> Result<Out<Edited>> {
    let index = row_index(row)?;
    let (file, mut store) = open_store(&config).await;
    store.set_field(month, index, field, value)?;
    file.save(store.ledger()).await?;

    let edited = Edited::new(&store, month, index)?;
    let message = if field.is_numeric() && !value.trim().is_empty() {
        let parsed = Amount::lenient(value);
        if parsed.is_zero() && value.trim().parse::<Amount>().is_err() {
            format!(
                "Set {field} of {month} row {row} to '{value}', which is not a number and counts as 0"
            )
        } else {
            format!(
                "Set {field} of {month} row {row} to {}",
                Amount::new_with_format(parsed, AmountFormat::CURRENCY)
            )
        }
    } else {
        format!("Set {field} of {month} row {row} to '{value}'")
    };
    Ok(Out::new(message, edited))
}

/// Empties row number `row` (starting at 1) of `month`. The row keeps its place and number.
pub async fn clear(config: Config, month: Month, row: u32) -> Result<Out<Edited>> {
    let index = row_index(row)?;
    let (file, mut store) = open_store(&config).await;
    store.clear_row(month, index)?;
    file.save(store.ledger()).await?;

    let edited = Edited::new(&store, month, index)?;
    Ok(Out::new(format!("Cleared {month} row {row}"), edited))
}

/// Appends an empty row to `month`.
pub async fn add_row(config: Config, month: Month) -> Result<Out<Edited>> {
    let (file, mut store) = open_store(&config).await;
    let id = store.append_row(month);
    file.save(store.ledger()).await?;

    let edited = Edited::new(&store, month, id as usize - 1)?;
    Ok(Out::new(format!("Added row {id} to {month}"), edited))
}

/// Converts a row number shown to the user into a position.
fn row_index(row: u32) -> Result<usize> {
    let index = row
        .checked_sub(1)
        .context("Rows are numbered starting at 1")?;
    Ok(index as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::model::Category;
    use crate::test::TestEnv;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_set_saves_the_ledger() {
        let env = TestEnv::new().await;
        let out = set(env.config(), Month::March, 2, Field::Amount(Category::Food), "42.50")
            .await
            .unwrap();
        assert_eq!(out.message(), "Set food of March row 2 to $42.50");
        let edited = out.structure().unwrap();
        assert_eq!(edited.row().id(), 2);
        assert_eq!(edited.ending_balance(), Decimal::from_str("-42.50").unwrap());

        let ledger = env.load_ledger().await;
        let row = ledger.period(Month::March).row(1).unwrap();
        assert_eq!(row.amount_text(Category::Food), "42.50");
    }

    #[tokio::test]
    async fn test_set_keeps_non_numeric_text() {
        let env = TestEnv::new().await;
        let out = set(env.config(), Month::May, 1, Field::Deposit, "lots")
            .await
            .unwrap();
        assert!(out.message().contains("not a number"));
        let ledger = env.load_ledger().await;
        assert_eq!(ledger.period(Month::May).row(0).unwrap().deposit_text(), "lots");
    }

    #[tokio::test]
    async fn test_set_out_of_bounds() {
        let env = TestEnv::new().await;
        let err = set(env.config(), Month::May, 26, Field::Receiver, "Shop")
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<LedgerError>(),
            Some(&LedgerError::RowOutOfBounds {
                month: Month::May,
                index: 25,
                len: 25
            })
        );
        assert_eq!(env.load_ledger().await.active_row_count(), 0);
    }

    #[tokio::test]
    async fn test_row_zero_is_an_error() {
        let env = TestEnv::new().await;
        assert!(clear(env.config(), Month::May, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_clear() {
        let env = TestEnv::with_sample().await;
        let out = clear(env.config(), Month::February, 4).await.unwrap();
        let edited = out.structure().unwrap();
        assert!(!edited.row().is_active());
        assert_eq!(edited.row().id(), 4);
        assert_eq!(edited.ending_balance(), Decimal::from_str("3520.51").unwrap());

        let ledger = env.load_ledger().await;
        assert_eq!(ledger.period(Month::February).len(), 25);
        assert_eq!(ledger.period(Month::February).active_rows().count(), 3);
    }

    #[tokio::test]
    async fn test_add_row() {
        let env = TestEnv::new().await;
        let out = add_row(env.config(), Month::December).await.unwrap();
        assert_eq!(out.message(), "Added row 26 to December");

        let ledger = env.load_ledger().await;
        assert_eq!(ledger.period(Month::December).len(), 26);
        assert_eq!(ledger.period(Month::November).len(), 25);
        ledger.validate().unwrap();
    }
}
