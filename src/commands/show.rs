use crate::commands::Out;
use crate::engine::{balanced_rows, MonthSummary};
use crate::model::{Amount, AmountFormat, Category, Month, Row};
use crate::persist::LedgerFile;
use crate::{Config, Result};
use rust_decimal::Decimal;
use serde::Serialize;

/// A month as the user sees it: its summary cards and its active rows with running balances.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MonthView {
    summary: MonthSummary,
    rows: Vec<RowView>,
}

impl MonthView {
    pub fn summary(&self) -> &MonthSummary {
        &self.summary
    }

    pub fn rows(&self) -> &[RowView] {
        &self.rows
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct RowView {
    #[serde(flatten)]
    row: Row,
    balance: Option<Decimal>,
}

impl RowView {
    pub fn row(&self) -> &Row {
        &self.row
    }

    pub fn balance(&self) -> Option<Decimal> {
        self.balance
    }
}

/// Shows the active rows of `month` with their balances, followed by the month's totals.
pub async fn show(config: Config, month: Month) -> Result<Out<MonthView>> {
    let ledger = LedgerFile::new(&config).load_or_default().await;
    let summary = MonthSummary::compute(&ledger, month);
    let rows: Vec<RowView> = balanced_rows(ledger.period(month), summary.starting_balance())
        .into_iter()
        .filter(|balanced| balanced.row().is_active())
        .map(|balanced| RowView {
            row: balanced.row().clone(),
            balance: balanced.balance(),
        })
        .collect();

    let view = MonthView { summary, rows };
    Ok(Out::new(render(config.year(), &view), view))
}

fn money(value: Decimal) -> String {
    Amount::new_with_format(value, AmountFormat::CURRENCY).to_string()
}

fn render(year: i32, view: &MonthView) -> String {
    let summary = view.summary();
    let totals = summary.totals();
    let mut lines = vec![
        format!("{} {year}", summary.month()),
        format!(
            "Starting balance {}, ending balance {}",
            money(summary.starting_balance()),
            money(summary.ending_balance())
        ),
    ];

    if view.rows().is_empty() {
        lines.push("No entries".to_string());
    }
    for rv in view.rows() {
        let row = rv.row();
        let spent: Vec<String> = Category::ALL
            .iter()
            .filter(|category| !row.amount(**category).is_zero())
            .map(|category| format!("{} {}", category.label(), money(row.amount(*category))))
            .collect();
        let deposit = if row.deposit().is_zero() {
            String::new()
        } else {
            format!("+{}", money(row.deposit()))
        };
        lines.push(format!(
            "{:>3}  {:<10}  {:<20}  {:<24}  {:>12}  {:<30}  {:>12}",
            row.id(),
            row.date(),
            row.receiver(),
            row.purpose(),
            deposit,
            spent.join(", "),
            rv.balance().map(money).unwrap_or_default(),
        ));
    }

    lines.push(format!(
        "Deposits {}, expenses {}, net change {}",
        money(totals.deposit()),
        money(totals.total_expenses()),
        money(summary.net_change())
    ));
    let shares: Vec<String> = summary
        .percentages()
        .iter()
        .filter(|(category, _)| !totals.category(*category).is_zero())
        .map(|(category, percent)| format!("{} {percent:.1}%", category.label()))
        .collect();
    if !shares.is_empty() {
        lines.push(shares.join(", "));
    }
    lines.join("\n")
}
