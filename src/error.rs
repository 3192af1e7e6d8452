use crate::model::Month;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by ledger mutation and snapshot validation. These travel inside `anyhow::Error`
/// and can be recovered with `downcast_ref::<LedgerError>()`.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("Row index {index} is out of bounds for {month}, which has {len} rows")]
    RowOutOfBounds {
        month: Month,
        index: usize,
        len: usize,
    },

    #[error("Row at position {position} of {month} has id {id}, expected {expected}")]
    RowIdMismatch {
        month: Month,
        position: usize,
        id: u32,
        expected: u32,
    },
}
