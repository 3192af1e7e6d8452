//! The full year of expense rows.

use crate::error::LedgerError;
use crate::model::{Field, Month, Row};
use crate::Result;
use anyhow::Context;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

/// The number of row slots each month gets in a new ledger.
pub const DEFAULT_ROWS_PER_MONTH: usize = 25;

/// The rows of a single month, in display order.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period {
    rows: Vec<Row>,
}

impl Period {
    /// A period of `len` empty rows numbered from 1.
    pub fn new(len: usize) -> Self {
        Self {
            rows: (1..=len).map(|id| Row::empty(id as u32)).collect(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn active_rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.rows.iter().filter(|row| row.is_active())
    }

    pub(crate) fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    /// Appends an empty row and returns its id.
    pub(crate) fn push_empty(&mut self) -> u32 {
        let id = self.rows.len() as u32 + 1;
        self.rows.push(Row::empty(id));
        id
    }

    pub(crate) fn validate(&self, month: Month) -> std::result::Result<(), LedgerError> {
        for (position, row) in self.rows.iter().enumerate() {
            let expected = position as u32 + 1;
            if row.id() != expected {
                return Err(LedgerError::RowIdMismatch {
                    month,
                    position,
                    id: row.id(),
                    expected,
                });
            }
        }
        Ok(())
    }
}

/// Rows are taken as they are; use [`Ledger::validate`] to check their ids.
impl From<Vec<Row>> for Period {
    fn from(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

/// Every month of the year with its rows. All twelve months always exist.
///
/// Serializes as an object keyed by month name, in calendar order:
///
/// ```json
/// {
///   "January": [{"id": 1, "date": "2024-01-02", "receiver": "City Transit", "transport": "85.00", ...}],
///   "February": [...],
///   ...
/// }
/// ```
///
/// Deserializing rejects a document that is missing a month, names an unknown month, holds a row
/// with an unknown key, or numbers its rows out of sequence.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Ledger {
    periods: [Period; Month::COUNT],
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS_PER_MONTH)
    }
}

impl Ledger {
    /// A ledger where every month holds `rows_per_month` empty rows.
    pub fn new(rows_per_month: usize) -> Self {
        Self {
            periods: std::array::from_fn(|_| Period::new(rows_per_month)),
        }
    }

    /// A ledger with demonstration rows in January and February. Months are padded so they hold
    /// at least `rows_per_month` rows.
    pub fn sample(rows_per_month: usize) -> Result<Self> {
        let mut ledger = Self::new(rows_per_month);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(Cursor::new(SAMPLE_DATA));

        let headers = reader
            .headers()
            .context("Unable to read sample data headers")?
            .clone();
        let fields = headers
            .iter()
            .skip(2)
            .map(Field::from_str)
            .collect::<Result<Vec<Field>>>()?;

        for record in reader.records() {
            let record = record.context("Unable to read sample data record")?;
            let month = Month::from_str(record.get(0).unwrap_or_default())?;
            let id: usize = record
                .get(1)
                .unwrap_or_default()
                .parse()
                .context("Invalid row id in sample data")?;
            anyhow::ensure!(id > 0, "Row ids in sample data start at 1");
            let period = ledger.period_mut(month);
            while period.len() < id {
                period.push_empty();
            }
            let row = &mut period.rows[id - 1];
            for (field, value) in fields.iter().zip(record.iter().skip(2)) {
                row.set(*field, value);
            }
        }
        Ok(ledger)
    }

    pub fn period(&self, month: Month) -> &Period {
        &self.periods[month.index()]
    }

    pub(crate) fn period_mut(&mut self, month: Month) -> &mut Period {
        &mut self.periods[month.index()]
    }

    /// Iterates every month with its period, January first.
    pub fn periods(&self) -> impl Iterator<Item = (Month, &Period)> + '_ {
        Month::ALL.iter().copied().zip(self.periods.iter())
    }

    pub(crate) fn set_period(&mut self, month: Month, period: Period) {
        self.periods[month.index()] = period;
    }

    /// Checks that each row's id matches its position.
    pub fn validate(&self) -> std::result::Result<(), LedgerError> {
        for (month, period) in self.periods() {
            period.validate(month)?;
        }
        Ok(())
    }

    /// The number of rows holding any data, across the whole year.
    pub fn active_row_count(&self) -> usize {
        self.periods.iter().map(|p| p.active_rows().count()).sum()
    }
}

impl Serialize for Ledger {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(Month::COUNT))?;
        for (month, period) in self.periods() {
            map.serialize_entry(&month, period)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Ledger {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(LedgerVisitor)
    }
}

struct LedgerVisitor;

impl<'de> Visitor<'de> for LedgerVisitor {
    type Value = Ledger;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from each of the twelve month names to its rows")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut periods: [Option<Period>; Month::COUNT] = Default::default();
        while let Some(month) = access.next_key::<Month>()? {
            let slot = &mut periods[month.index()];
            if slot.is_some() {
                return Err(serde::de::Error::custom(format!("duplicate month {month}")));
            }
            *slot = Some(access.next_value()?);
        }

        let mut ledger = Ledger::new(0);
        for (month, period) in Month::ALL.iter().zip(periods) {
            match period {
                Some(period) => ledger.set_period(*month, period),
                None => return Err(serde::de::Error::custom(format!("missing month {month}"))),
            }
        }
        ledger
            .validate()
            .map_err(<A::Error as serde::de::Error>::custom)?;
        Ok(ledger)
    }
}

/// Demonstration rows: month, row id, then one column per row field.
const SAMPLE_DATA: &str = r##"month,id,date,receiver,purpose,deposit,transport,food,medication,house,car,school,diverse
January,1,2024-01-02,City Transit,Monthly bus pass,,85.00,,,,,,
January,2,,Fresh Mart,Weekly groceries,,,156.50,,,,,
January,3,2024-01-05,Employer Inc.,January salary,3500.00,,,,,,,
January,4,,Landlord,Monthly rent,,,,,1200.00,,,
January,5,2024-01-10,Pharmacy Plus,Prescription refill,,,,45.00,,,,
January,6,,Gas Station,Fuel,,,,,,65.00,,
January,7,2024-01-15,University,Tuition payment,,,,,,,500.00,
January,8,,Coffee Shop,Work meetings,,,32.00,,,,,
January,9,2024-01-20,Netflix,Monthly subscription,,,,,,,,15.99
January,10,,Electric Co.,Electric bill,,,,,95.00,,,
February,1,2024-02-01,City Transit,Monthly bus pass,,85.00,,,,,,
February,2,2024-02-05,Employer Inc.,February salary,3500.00,,,,,,,
February,3,,Landlord,Monthly rent,,,,,1200.00,,,
February,4,2024-02-14,Restaurant,Valentine dinner,,,120.00,,,,,
"##;
