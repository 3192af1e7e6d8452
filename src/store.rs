//! The single owner of the in-memory `Ledger`.
//!
//! Every mutation goes through `LedgerStore`. After a mutation is committed each registered
//! `Observer` is told about it exactly once. A call that fails leaves the ledger untouched and
//! notifies nobody.

use crate::error::LedgerError;
use crate::model::{Field, Ledger, Month, Row};
use crate::Result;
use serde::Serialize;
use std::fmt::{Debug, Display, Formatter};
use tracing::debug;

/// Describes a committed mutation.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum Change {
    FieldSet {
        month: Month,
        index: usize,
        field: String,
    },
    RowCleared {
        month: Month,
        index: usize,
    },
    RowAppended {
        month: Month,
        id: u32,
    },
    Restored,
}

impl Display for Change {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::FieldSet {
                month,
                index,
                field,
            } => write!(f, "set {field} of {month} row {}", index + 1),
            Change::RowCleared { month, index } => write!(f, "cleared {month} row {}", index + 1),
            Change::RowAppended { month, id } => write!(f, "appended {month} row {id}"),
            Change::Restored => f.write_str("restored the whole ledger"),
        }
    }
}

/// Receives a notification after each committed mutation, along with the ledger as it now is.
pub trait Observer: Send {
    fn committed(&mut self, change: &Change, ledger: &Ledger);
}

/// Logs every committed change at `debug` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn committed(&mut self, change: &Change, ledger: &Ledger) {
        debug!(
            "Ledger change committed: {change} ({} active rows)",
            ledger.active_row_count()
        );
    }
}

pub struct LedgerStore {
    ledger: Ledger,
    observers: Vec<Box<dyn Observer>>,
}

impl Debug for LedgerStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerStore")
            .field("ledger", &self.ledger)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new(Ledger::default())
    }
}

impl LedgerStore {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            observers: Vec::new(),
        }
    }

    /// Registers an observer. It is only told about mutations made after this call.
    pub fn subscribe(&mut self, observer: impl Observer + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Read access to the current ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Replaces one cell of the row at `index` (0-based). The value is stored as given.
    ///
    /// # Errors
    /// - `LedgerError::RowOutOfBounds` when `index` is past the end of the month.
    pub fn set_field(
        &mut self,
        month: Month,
        index: usize,
        field: Field,
        value: impl Into<String>,
    ) -> Result<()> {
        self.row_mut(month, index)?.set(field, value);
        self.notify(Change::FieldSet {
            month,
            index,
            field: field.to_string(),
        });
        Ok(())
    }

    /// Resets the row at `index` to an empty row with the same id. The slot stays.
    ///
    /// # Errors
    /// - `LedgerError::RowOutOfBounds` when `index` is past the end of the month.
    pub fn clear_row(&mut self, month: Month, index: usize) -> Result<()> {
        let row = self.row_mut(month, index)?;
        *row = Row::empty(row.id());
        self.notify(Change::RowCleared { month, index });
        Ok(())
    }

    /// Appends an empty row to `month` and returns its id, which is the new row count.
    pub fn append_row(&mut self, month: Month) -> u32 {
        let id = self.ledger.period_mut(month).push_empty();
        self.notify(Change::RowAppended { month, id });
        id
    }

    /// A full copy of the ledger, suitable for persisting.
    pub fn snapshot(&self) -> Ledger {
        self.ledger.clone()
    }

    /// Replaces the whole ledger. A ledger that fails validation is rejected and the current one
    /// is kept.
    pub fn restore(&mut self, ledger: Ledger) -> Result<()> {
        ledger.validate()?;
        self.ledger = ledger;
        self.notify(Change::Restored);
        Ok(())
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    fn row_mut(&mut self, month: Month, index: usize) -> Result<&mut Row> {
        let period = self.ledger.period_mut(month);
        let len = period.len();
        period
            .row_mut(index)
            .ok_or_else(|| LedgerError::RowOutOfBounds { month, index, len }.into())
    }

    fn notify(&mut self, change: Change) {
        for observer in self.observers.iter_mut() {
            observer.committed(&change, &self.ledger);
        }
    }
}
