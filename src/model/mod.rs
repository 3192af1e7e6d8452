//! Types that represent the core data model, such as `Ledger`, `Row` and `Category`.
mod amount;
mod category;
mod ledger;
mod month;
mod row;

pub use amount::{Amount, AmountFormat};
pub use category::{Category, PerCategory};
pub use ledger::{Ledger, Period, DEFAULT_ROWS_PER_MONTH};
pub use month::Month;
pub use row::{Field, Row};
