use crate::model::{Amount, Category, PerCategory};
use anyhow::bail;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One transaction line of a monthly sheet.
///
/// Every value is kept exactly as it was entered. An empty string means the cell is absent, which
/// is not the same as `"0"`: only absent cells leave a row inactive. Numeric interpretation happens
/// in the aggregation functions via [`Amount::lenient`].
///
/// Keys that are neither a text field nor a category are rejected when deserializing, by the
/// flattened category map.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Row {
    /// 1-based position of the row within its month.
    id: u32,
    #[serde(default)]
    date: String,
    #[serde(default)]
    receiver: String,
    #[serde(default)]
    purpose: String,
    #[serde(default)]
    deposit: String,
    #[serde(flatten)]
    amounts: PerCategory<String>,
}

impl Row {
    /// Creates a row with every field absent.
    pub fn empty(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    /// The raw text of the deposit cell.
    pub fn deposit_text(&self) -> &str {
        &self.deposit
    }

    /// The raw text of a category cell.
    pub fn amount_text(&self, category: Category) -> &str {
        &self.amounts[category]
    }

    /// A row is active when at least one of its cells holds anything at all.
    pub fn is_active(&self) -> bool {
        Field::ALL_TEXT
            .iter()
            .chain(Field::ALL_NUMERIC.iter())
            .any(|field| !self.get(*field).is_empty())
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Date => &self.date,
            Field::Receiver => &self.receiver,
            Field::Purpose => &self.purpose,
            Field::Deposit => &self.deposit,
            Field::Amount(category) => &self.amounts[category],
        }
    }

    /// Replaces one cell. The value is stored verbatim.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Date => self.date = value,
            Field::Receiver => self.receiver = value,
            Field::Purpose => self.purpose = value,
            Field::Deposit => self.deposit = value,
            Field::Amount(category) => self.amounts[category] = value,
        }
    }

    /// Builder form of [`Row::set`].
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn deposit(&self) -> Decimal {
        Amount::lenient(&self.deposit)
    }

    pub fn amount(&self, category: Category) -> Decimal {
        Amount::lenient(&self.amounts[category])
    }

    /// The row's category amounts, parsed leniently.
    pub fn amounts(&self) -> PerCategory<Decimal> {
        self.amounts.map(|_, text| Amount::lenient(text))
    }

    /// Sum of every category amount on this row.
    pub fn expenses(&self) -> Decimal {
        self.amounts.values().map(|text| Amount::lenient(text)).sum()
    }

    /// `deposit - expenses` for this row.
    pub fn net(&self) -> Decimal {
        self.deposit() - self.expenses()
    }
}

/// Addresses one cell of a [`Row`]. Parsed from, and displayed as, its snapshot key, e.g.
/// `receiver` or `food`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Field {
    Date,
    Receiver,
    Purpose,
    Deposit,
    Amount(Category),
}

impl Field {
    pub const ALL_TEXT: [Field; 3] = [Field::Date, Field::Receiver, Field::Purpose];

    pub const ALL_NUMERIC: [Field; 1 + Category::COUNT] = [
        Field::Deposit,
        Field::Amount(Category::Transport),
        Field::Amount(Category::Food),
        Field::Amount(Category::Medication),
        Field::Amount(Category::House),
        Field::Amount(Category::Car),
        Field::Amount(Category::School),
        Field::Amount(Category::Diverse),
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Receiver => "receiver",
            Field::Purpose => "purpose",
            Field::Deposit => "deposit",
            Field::Amount(category) => category.key(),
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Field::Deposit | Field::Amount(_))
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "date" => Ok(Field::Date),
            "receiver" => Ok(Field::Receiver),
            "purpose" => Ok(Field::Purpose),
            "deposit" => Ok(Field::Deposit),
            other => match Category::from_str(other) {
                Ok(category) => Ok(Field::Amount(category)),
                Err(_) => bail!(
                    "Invalid field '{s}', expected one of date, receiver, purpose, deposit or an \
                    expense category"
                ),
            },
        }
    }
}
