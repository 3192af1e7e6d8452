//! These structs provide the CLI interface for the expenses CLI.

use crate::export::ExportFormat;
use crate::model::{Field, Month};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expenses: A yearly expense tracker for the command line.
///
/// The year is split into twelve monthly sheets of rows. Each row can hold a date, a receiver, a
/// purpose, a deposit and an amount for each expense category (transport, food, medication,
/// house, car, school, diverse). Running balances carry over from one month to the next, and the
/// whole year can be exported as a workbook of CSV sheets or JSON.
///
/// Months can also be pushed to, and pulled from, a remote record service.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and its configuration file.
    ///
    /// This is the first command you should run. By default the home directory is
    /// $HOME/expenses; pass --home or set EXPENSES_HOME to put it somewhere else.
    Init(InitArgs),
    /// Print a month's rows with running balances, its totals and category percentages.
    Show(ShowArgs),
    /// Set one cell of a row, e.g. `expenses set march 3 food 42.50`.
    Set(SetArgs),
    /// Empty a row. The row stays in place with its number.
    Clear(ClearArgs),
    /// Append an empty row to a month.
    AddRow(AddRowArgs),
    /// Export one month, or the whole year with an annual summary.
    Export(ExportArgs),
    /// Replace the whole ledger with a ledger JSON file. The current ledger is backed up first.
    Import(ImportArgs),
    /// Upload months to the remote record service.
    Push(RemoteArgs),
    /// Download months from the remote record service, replacing the local ones. The current
    /// ledger is backed up first.
    Pull(RemoteArgs),
    /// Delete a month from the remote record service.
    DeleteRemote(DeleteRemoteArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger and configuration are held. Defaults to ~/expenses
    #[arg(long, env = "EXPENSES_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// Args for the `expenses init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The year to track. Defaults to the current year.
    #[arg(long)]
    year: Option<i32>,

    /// How many row slots each month starts with.
    #[arg(long, default_value_t = 25, value_parser = clap::value_parser!(u16).range(1..))]
    rows: u16,

    /// Base URL of the remote record service, e.g. http://localhost:8001/api
    #[arg(long)]
    remote_url: Option<String>,

    /// Fill January and February with demonstration data.
    #[arg(long)]
    sample: bool,
}

impl InitArgs {
    pub fn new(year: Option<i32>, rows: u16, remote_url: Option<String>, sample: bool) -> Self {
        Self {
            year,
            rows,
            remote_url,
            sample,
        }
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn rows(&self) -> usize {
        usize::from(self.rows)
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.remote_url.as_deref()
    }

    pub fn sample(&self) -> bool {
        self.sample
    }
}

/// Args for the `expenses show` command.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// The month: a name (March), an abbreviation (mar) or a number (3).
    month: Month,
}

impl ShowArgs {
    pub fn new(month: Month) -> Self {
        Self { month }
    }

    pub fn month(&self) -> Month {
        self.month
    }
}

/// Args for the `expenses set` command.
#[derive(Debug, Parser, Clone)]
pub struct SetArgs {
    /// The month: a name (March), an abbreviation (mar) or a number (3).
    month: Month,

    /// The row number, starting at 1.
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    row: u32,

    /// One of date, receiver, purpose, deposit, transport, food, medication, house, car, school,
    /// diverse.
    field: Field,

    /// The new value. An empty string clears the cell.
    #[arg(allow_hyphen_values = true)]
    value: String,
}

impl SetArgs {
    pub fn new(month: Month, row: u32, field: Field, value: impl Into<String>) -> Self {
        Self {
            month,
            row,
            field,
            value: value.into(),
        }
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Args for the `expenses clear` command.
#[derive(Debug, Parser, Clone)]
pub struct ClearArgs {
    /// The month: a name (March), an abbreviation (mar) or a number (3).
    month: Month,

    /// The row number, starting at 1.
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    row: u32,
}

impl ClearArgs {
    pub fn new(month: Month, row: u32) -> Self {
        Self { month, row }
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn row(&self) -> u32 {
        self.row
    }
}

/// Args for the `expenses add-row` command.
#[derive(Debug, Parser, Clone)]
pub struct AddRowArgs {
    /// The month: a name (March), an abbreviation (mar) or a number (3).
    month: Month,
}

impl AddRowArgs {
    pub fn new(month: Month) -> Self {
        Self { month }
    }

    pub fn month(&self) -> Month {
        self.month
    }
}

/// Args for the `expenses export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// Export only this month. Without it the whole year is exported.
    #[arg(long)]
    month: Option<Month>,

    /// `csv` writes one file per sheet into the OUT directory, `json` writes the OUT file.
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    format: ExportFormat,

    /// Output directory (csv) or file (json).
    out: PathBuf,
}

impl ExportArgs {
    pub fn new(month: Option<Month>, format: ExportFormat, out: impl Into<PathBuf>) -> Self {
        Self {
            month,
            format,
            out: out.into(),
        }
    }

    pub fn month(&self) -> Option<Month> {
        self.month
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn out(&self) -> &Path {
        &self.out
    }
}

/// Args for the `expenses import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// A ledger JSON file holding all twelve months.
    file: PathBuf,
}

impl ImportArgs {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Args for the `expenses push` and `expenses pull` commands.
#[derive(Debug, Parser, Clone)]
pub struct RemoteArgs {
    /// Only this month. Without it every month is transferred.
    #[arg(long)]
    month: Option<Month>,
}

impl RemoteArgs {
    pub fn new(month: Option<Month>) -> Self {
        Self { month }
    }

    pub fn month(&self) -> Option<Month> {
        self.month
    }
}

/// Args for the `expenses delete-remote` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteRemoteArgs {
    /// The month: a name (March), an abbreviation (mar) or a number (3).
    month: Month,
}

impl DeleteRemoteArgs {
    pub fn new(month: Month) -> Self {
        Self { month }
    }

    pub fn month(&self) -> Month {
        self.month
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or EXPENSES_HOME instead of relying on the default \
                expenses home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("expenses")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
