//! A yearly expense tracker: twelve monthly sheets of rows, running balances that carry across
//! months, per-category breakdowns and a workbook export.

pub mod args;
mod backup;
pub mod commands;
mod config;
pub mod engine;
mod error;
pub mod export;
pub mod model;
mod persist;
pub mod remote;
pub mod store;
mod utils;


pub use backup::Backup;
pub use config::Config;
pub use error::{Error, LedgerError, Result};
pub use persist::LedgerFile;
