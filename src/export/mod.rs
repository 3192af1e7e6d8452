//! Shapes the ledger into sheets of cells for a workbook writer.
//!
//! Nothing here touches the filesystem. [`export_month`] and [`export_ledger`] are pure functions
//! of the ledger; [`write_workbook`] hands the result to a file writer.

mod writer;

pub use writer::{write_workbook, ExportFormat};

use crate::engine::{
    balanced_rows, compute_cumulative_totals, compute_percentages, compute_starting_balance,
    compute_totals, Percentages, Totals,
};
use crate::model::{Amount, AmountFormat, Category, Ledger, Month, Row};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Name of the last sheet of a full workbook.
pub const ANNUAL_SUMMARY: &str = "Annual Summary";

/// One cell of an exported sheet.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    Empty,
    Text(String),
    Number(Decimal),
    /// A percentage, e.g. `62.5` for 62.5%.
    Percent(Decimal),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// A number, or an empty cell when the value is zero.
    fn nonzero(value: Decimal) -> Self {
        if value.is_zero() {
            Cell::Empty
        } else {
            Cell::Number(value)
        }
    }

    /// The value of a numeric input cell. Text that is not a number is kept as text.
    fn entered(text: &str) -> Self {
        if text.trim().is_empty() {
            return Cell::Empty;
        }
        match Amount::from_str(text) {
            Ok(amount) => Cell::Number(amount.value()),
            Err(_) => Cell::text(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", Amount::new_with_format(*n, AmountFormat::RAW)),
            Cell::Percent(p) => write!(f, "{p:.1}%"),
        }
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// The length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or_default()
    }

    fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    fn blank(&mut self) {
        self.rows.push(Vec::new());
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// A workbook holding the single sheet of `month`, named by the full month name.
pub fn export_month(ledger: &Ledger, month: Month) -> Workbook {
    Workbook {
        sheets: vec![month_sheet(ledger, month, month.name())],
    }
}

/// Twelve month sheets named `Jan` through `Dec`, then the annual summary.
pub fn export_ledger(ledger: &Ledger) -> Workbook {
    let mut sheets: Vec<Sheet> = Month::ALL
        .iter()
        .map(|month| month_sheet(ledger, *month, month.abbreviation()))
        .collect();
    sheets.push(annual_summary(ledger));
    Workbook { sheets }
}

fn month_header() -> Vec<Cell> {
    let mut header = vec![
        Cell::text("Date"),
        Cell::text("Receiver"),
        Cell::text("Purpose"),
        Cell::text("Deposit (+)"),
    ];
    header.extend(
        Category::ALL
            .iter()
            .map(|c| Cell::text(format!("{} (-)", c.label()))),
    );
    header.push(Cell::text("Balance"));
    header
}

fn month_sheet(ledger: &Ledger, month: Month, name: &str) -> Sheet {
    let mut sheet = Sheet::new(name);
    sheet.push(vec![Cell::text(format!("{month} Expense Tracker"))]);
    sheet.blank();
    sheet.push(month_header());

    let period = ledger.period(month);
    let starting_balance = compute_starting_balance(ledger, month);
    for balanced in balanced_rows(period, starting_balance) {
        if balanced.row().is_active() {
            sheet.push(data_row(balanced.row(), balanced.balance()));
        }
    }
    sheet.blank();

    let totals = compute_totals(period);
    sheet.push(totals_row("SUBTOTAL", &totals));
    sheet.push(percentage_row(&totals, &compute_percentages(&totals)));
    sheet.blank();

    if month != Month::FIRST {
        let cumulative = compute_cumulative_totals(ledger, month);
        sheet.push(vec![Cell::text(format!(
            "CUMULATIVE ({} - {month})",
            Month::FIRST.abbreviation()
        ))]);
        sheet.push(totals_row("TOTAL", &cumulative));
        sheet.push(percentage_row(&cumulative, &compute_percentages(&cumulative)));
    }
    sheet
}

fn data_row(row: &Row, balance: Option<Decimal>) -> Vec<Cell> {
    let mut cells = vec![
        Cell::text(row.date()),
        Cell::text(row.receiver()),
        Cell::text(row.purpose()),
        Cell::entered(row.deposit_text()),
    ];
    cells.extend(Category::ALL.iter().map(|c| Cell::entered(row.amount_text(*c))));
    cells.push(balance.map_or(Cell::Empty, Cell::Number));
    cells
}

fn totals_row(label: &str, totals: &Totals) -> Vec<Cell> {
    let mut cells = vec![
        Cell::text(label),
        Cell::Empty,
        Cell::Empty,
        Cell::nonzero(totals.deposit()),
    ];
    cells.extend(totals.categories().values().map(|v| Cell::nonzero(*v)));
    cells.push(Cell::Empty);
    cells
}

fn percentage_row(totals: &Totals, percentages: &Percentages) -> Vec<Cell> {
    let mut cells = vec![Cell::text("PERCENTAGE"), Cell::Empty, Cell::Empty, Cell::Empty];
    let no_expenses = totals.total_expenses().is_zero();
    cells.extend(percentages.iter().map(|(_, p)| {
        if no_expenses {
            Cell::Empty
        } else {
            Cell::Percent(*p)
        }
    }));
    cells.push(Cell::Empty);
    cells
}

fn annual_summary(ledger: &Ledger) -> Sheet {
    let mut sheet = Sheet::new(ANNUAL_SUMMARY);
    sheet.push(vec![Cell::text("Annual Expense Summary")]);
    sheet.blank();

    let mut header = vec![Cell::text("Month"), Cell::text("Deposits")];
    header.extend(Category::ALL.iter().map(|c| Cell::text(c.label())));
    header.push(Cell::text("Total Expenses"));
    header.push(Cell::text("Net Balance"));
    sheet.push(header);

    let mut running = Decimal::ZERO;
    for (month, period) in ledger.periods() {
        let totals = compute_totals(period);
        running += totals.net();
        let mut cells = vec![Cell::text(month.name()), Cell::nonzero(totals.deposit())];
        cells.extend(totals.categories().values().map(|v| Cell::nonzero(*v)));
        cells.push(Cell::nonzero(totals.total_expenses()));
        cells.push(Cell::Number(running));
        sheet.push(cells);
    }
    sheet.blank();

    let annual = compute_cumulative_totals(ledger, Month::LAST);
    let mut total_row = vec![Cell::text("ANNUAL TOTAL"), Cell::nonzero(annual.deposit())];
    total_row.extend(annual.categories().values().map(|v| Cell::nonzero(*v)));
    total_row.push(Cell::nonzero(annual.total_expenses()));
    total_row.push(Cell::Number(annual.net()));
    sheet.push(total_row);

    let percentages = compute_percentages(&annual);
    let mut percent_row = vec![Cell::text("PERCENTAGE"), Cell::Empty];
    percent_row.extend(percentages.iter().map(|(_, p)| Cell::Percent(*p)));
    percent_row.push(if annual.total_expenses().is_zero() {
        Cell::Empty
    } else {
        Cell::text("100%")
    });
    percent_row.push(Cell::Empty);
    sheet.push(percent_row);
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Field;
    use crate::store::LedgerStore;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn strings(row: &[Cell]) -> Vec<String> {
        row.iter().map(|c| c.to_string()).collect()
    }

    /// Rows between the header and the first blank row.
    fn data_rows(sheet: &Sheet) -> &[Vec<Cell>] {
        let rows = &sheet.rows()[3..];
        let end = rows.iter().position(|r| r.is_empty()).unwrap();
        &rows[..end]
    }

    #[test]
    fn test_only_active_rows_are_exported() {
        let mut store = LedgerStore::new(Ledger::new(25));
        store
            .set_field(Month::March, 0, Field::Amount(Category::Food), "50")
            .unwrap();
        store.set_field(Month::March, 7, Field::Deposit, "100").unwrap();
        store
            .set_field(Month::March, 24, Field::Receiver, "Neighbor")
            .unwrap();

        let workbook = export_month(store.ledger(), Month::March);
        assert_eq!(workbook.sheets().len(), 1);
        let sheet = workbook.sheet("March").unwrap();
        assert_eq!(data_rows(sheet).len(), 3);
        assert_eq!(strings(&sheet.rows()[0]), vec!["March Expense Tracker"]);
    }

    #[test]
    fn test_month_header() {
        let workbook = export_month(&Ledger::default(), Month::January);
        let header = strings(&workbook.sheets()[0].rows()[2]);
        assert_eq!(
            header,
            vec![
                "Date",
                "Receiver",
                "Purpose",
                "Deposit (+)",
                "Transport (-)",
                "Food (-)",
                "Medication (-)",
                "House (-)",
                "Car (-)",
                "School (-)",
                "Diverse (-)",
                "Balance"
            ]
        );
    }

    #[test]
    fn test_january_sheet_layout() {
        let ledger = Ledger::sample(25).unwrap();
        let workbook = export_month(&ledger, Month::January);
        let sheet = &workbook.sheets()[0];
        let data = data_rows(sheet);
        assert_eq!(data.len(), 10);

        // First row is the bus pass.
        assert_eq!(
            strings(&data[0]),
            vec![
                "2024-01-02",
                "City Transit",
                "Monthly bus pass",
                "",
                "85.00",
                "",
                "",
                "",
                "",
                "",
                "",
                "-85.00"
            ]
        );
        assert_eq!(data[9][11], Cell::Number(dec("1305.51")));

        // blank, SUBTOTAL, PERCENTAGE, blank, and no cumulative block.
        let tail = &sheet.rows()[3 + data.len()..];
        assert_eq!(tail.len(), 4);
        assert!(tail[0].is_empty());
        assert_eq!(tail[1][0], Cell::text("SUBTOTAL"));
        assert_eq!(tail[1][3], Cell::Number(dec("3500")));
        assert_eq!(tail[1][5], Cell::Number(dec("188.50")));
        assert_eq!(tail[1].len(), 12);
        assert_eq!(tail[2][0], Cell::text("PERCENTAGE"));
        assert_eq!(tail[2][3], Cell::Empty);
        assert_eq!(tail[2][7].to_string(), "59.0%");
        assert!(tail[3].is_empty());
    }

    #[test]
    fn test_february_has_cumulative_block() {
        let ledger = Ledger::sample(25).unwrap();
        let workbook = export_month(&ledger, Month::February);
        let rows = workbook.sheets()[0].rows();
        let n = rows.len();
        assert_eq!(strings(&rows[n - 3]), vec!["CUMULATIVE (Jan - February)"]);
        assert_eq!(rows[n - 2][0], Cell::text("TOTAL"));
        assert_eq!(rows[n - 2][3], Cell::Number(dec("7000")));
        assert_eq!(rows[n - 1][0], Cell::text("PERCENTAGE"));

        // Balances continue from January.
        let data = data_rows(&workbook.sheets()[0]);
        assert_eq!(data[0][11], Cell::Number(dec("1220.51")));
        assert_eq!(data[3][11], Cell::Number(dec("3400.51")));
    }

    #[test]
    fn test_empty_month_renders_blank_totals() {
        let ledger = Ledger::sample(25).unwrap();
        let workbook = export_month(&ledger, Month::April);
        let sheet = &workbook.sheets()[0];
        assert!(data_rows(sheet).is_empty());
        let subtotal = &sheet.rows()[4];
        assert_eq!(subtotal[0], Cell::text("SUBTOTAL"));
        assert!(subtotal[1..].iter().all(Cell::is_empty));
        let percentage = &sheet.rows()[5];
        assert!(percentage[1..].iter().all(Cell::is_empty));
        // The cumulative block still covers January through April.
        let n = sheet.rows().len();
        assert_eq!(sheet.rows()[n - 2][3], Cell::Number(dec("7000")));
    }

    #[test]
    fn test_text_in_amount_cell_is_kept() {
        let mut store = LedgerStore::new(Ledger::new(2));
        store
            .set_field(Month::January, 0, Field::Amount(Category::Car), "tbd")
            .unwrap();
        let workbook = export_month(store.ledger(), Month::January);
        let data = data_rows(&workbook.sheets()[0]);
        assert_eq!(data[0][8], Cell::text("tbd"));
        assert_eq!(data[0][11], Cell::Number(Decimal::ZERO));
    }

    #[test]
    fn test_full_workbook_sheet_names() {
        let workbook = export_ledger(&Ledger::default());
        let names: Vec<&str> = workbook.sheets().iter().map(Sheet::name).collect();
        assert_eq!(
            names,
            vec![
                "Jan",
                "Feb",
                "Mar",
                "Apr",
                "May",
                "Jun",
                "Jul",
                "Aug",
                "Sep",
                "Oct",
                "Nov",
                "Dec",
                "Annual Summary"
            ]
        );
    }

    #[test]
    fn test_annual_summary() {
        let workbook = export_ledger(&Ledger::sample(25).unwrap());
        let sheet = workbook.sheet(ANNUAL_SUMMARY).unwrap();
        let rows = sheet.rows();
        assert_eq!(strings(&rows[0]), vec!["Annual Expense Summary"]);
        assert_eq!(rows[2].len(), 11);
        assert_eq!(rows[2][10], Cell::text("Net Balance"));

        let january = &rows[3];
        assert_eq!(january[0], Cell::text("January"));
        assert_eq!(january[9], Cell::Number(dec("2194.49")));
        assert_eq!(january[10], Cell::Number(dec("1305.51")));
        let march = &rows[5];
        assert_eq!(march[1], Cell::Empty);
        assert_eq!(march[10], Cell::Number(dec("3400.51")));
        assert_eq!(rows[14][10], Cell::Number(dec("3400.51")));

        assert!(rows[15].is_empty());
        let total = &rows[16];
        assert_eq!(total[0], Cell::text("ANNUAL TOTAL"));
        assert_eq!(total[1], Cell::Number(dec("7000")));
        assert_eq!(total[10], Cell::Number(dec("3400.51")));
        let percentage = &rows[17];
        assert_eq!(percentage[0], Cell::text("PERCENTAGE"));
        assert_eq!(percentage[9], Cell::text("100%"));
        assert_eq!(rows.len(), 18);
    }

    #[test]
    fn test_annual_summary_without_expenses() {
        let workbook = export_ledger(&Ledger::default());
        let sheet = workbook.sheet(ANNUAL_SUMMARY).unwrap();
        let percentage = sheet.rows().last().unwrap();
        assert_eq!(percentage[2], Cell::Percent(Decimal::ZERO));
        assert_eq!(percentage[9], Cell::Empty);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Number(dec("1234.5")).to_string(), "1234.50");
        assert_eq!(Cell::Percent(dec("62.5")).to_string(), "62.5%");
        assert_eq!(Cell::Percent(Decimal::ZERO).to_string(), "0.0%");
        assert_eq!(Cell::Empty.to_string(), "");
    }

    #[test]
    fn test_export_is_deterministic() {
        let ledger = Ledger::sample(25).unwrap();
        assert_eq!(export_ledger(&ledger), export_ledger(&ledger));
    }
}
