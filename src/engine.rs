//! Pure aggregation over a `Ledger`: totals, percentages, running balances and cumulative totals.
//!
//! Nothing here is cached. Every function recomputes from the rows it is given, so a result can
//! never be stale after an edit to an earlier month.

use crate::model::{Category, Ledger, Month, PerCategory, Period, Row};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Sums for one month (or a run of months): deposits, each category, and all expenses.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    deposit: Decimal,
    #[serde(flatten)]
    categories: PerCategory<Decimal>,
    total_expenses: Decimal,
}

impl Totals {
    pub fn deposit(&self) -> Decimal {
        self.deposit
    }

    pub fn category(&self, category: Category) -> Decimal {
        self.categories[category]
    }

    pub fn categories(&self) -> &PerCategory<Decimal> {
        &self.categories
    }

    /// Sum of every category, deposits excluded.
    pub fn total_expenses(&self) -> Decimal {
        self.total_expenses
    }

    /// `deposit - total_expenses`.
    pub fn net(&self) -> Decimal {
        self.deposit - self.total_expenses
    }

    fn add_row(&mut self, row: &Row) {
        self.deposit += row.deposit();
        for category in Category::ALL {
            let amount = row.amount(category);
            self.categories[category] += amount;
            self.total_expenses += amount;
        }
    }
}

impl AddAssign<&Totals> for Totals {
    fn add_assign(&mut self, rhs: &Totals) {
        self.deposit += rhs.deposit;
        for category in Category::ALL {
            self.categories[category] += rhs.categories[category];
        }
        self.total_expenses += rhs.total_expenses;
    }
}

impl Add for Totals {
    type Output = Totals;

    fn add(mut self, rhs: Totals) -> Self::Output {
        self += &rhs;
        self
    }
}

impl Sum for Totals {
    fn sum<I: Iterator<Item = Totals>>(iter: I) -> Self {
        iter.fold(Totals::default(), Add::add)
    }
}

/// Each category's share of total expenses, in percent with one decimal place.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Serialize)]
#[serde(transparent)]
pub struct Percentages(PerCategory<Decimal>);

impl Percentages {
    pub fn get(&self, category: Category) -> Decimal {
        self.0[category]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &Decimal)> + '_ {
        self.0.iter()
    }

    pub fn sum(&self) -> Decimal {
        self.0.values().sum()
    }
}

/// A row paired with the running balance after it. Inactive rows have no balance.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct BalancedRow<'a> {
    #[serde(flatten)]
    row: &'a Row,
    balance: Option<Decimal>,
}

impl<'a> BalancedRow<'a> {
    pub fn row(&self) -> &'a Row {
        self.row
    }

    pub fn balance(&self) -> Option<Decimal> {
        self.balance
    }
}

/// Sums every row of `period`. Inactive rows add zero.
pub fn compute_totals(period: &Period) -> Totals {
    let mut totals = Totals::default();
    for row in period.rows() {
        totals.add_row(row);
    }
    totals
}

/// Every entry is zero when there are no expenses.
pub fn compute_percentages(totals: &Totals) -> Percentages {
    if totals.total_expenses.is_zero() {
        return Percentages::default();
    }
    let hundred = Decimal::ONE_HUNDRED;
    Percentages(totals.categories.map(|_, amount| {
        (*amount / totals.total_expenses * hundred)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    }))
}

/// Walks the rows of `period` from `starting_balance`. Each active row gets the running balance
/// after applying its deposit and expenses; inactive rows get `None` and leave it unchanged.
pub fn compute_row_balances(period: &Period, starting_balance: Decimal) -> Vec<Option<Decimal>> {
    let mut running = starting_balance;
    period
        .rows()
        .iter()
        .map(|row| {
            if row.is_active() {
                running += row.net();
                Some(running)
            } else {
                None
            }
        })
        .collect()
}

/// Like [`compute_row_balances`] but keeps each row next to its balance.
pub fn balanced_rows(period: &Period, starting_balance: Decimal) -> Vec<BalancedRow<'_>> {
    period
        .rows()
        .iter()
        .zip(compute_row_balances(period, starting_balance))
        .map(|(row, balance)| BalancedRow { row, balance })
        .collect()
}

/// The balance after the last row of `month`, recomputed from the first row of January.
pub fn compute_ending_balance(ledger: &Ledger, month: Month) -> Decimal {
    let mut balance = Decimal::ZERO;
    for m in month.through() {
        let balances = compute_row_balances(ledger.period(m), balance);
        if let Some(last) = balances.into_iter().flatten().last() {
            balance = last;
        }
    }
    balance
}

/// Zero for January, otherwise the ending balance of the month before.
pub fn compute_starting_balance(ledger: &Ledger, month: Month) -> Decimal {
    match month.previous() {
        Some(previous) => compute_ending_balance(ledger, previous),
        None => Decimal::ZERO,
    }
}

/// Totals of January through `upto`, inclusive, summed field by field.
pub fn compute_cumulative_totals(ledger: &Ledger, upto: Month) -> Totals {
    upto.through()
        .map(|month| compute_totals(ledger.period(month)))
        .sum()
}

/// Everything the summary cards of a month show.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    month: Month,
    totals: Totals,
    percentages: Percentages,
    starting_balance: Decimal,
    ending_balance: Decimal,
    cumulative: Totals,
}

impl MonthSummary {
    pub fn compute(ledger: &Ledger, month: Month) -> Self {
        let totals = compute_totals(ledger.period(month));
        let percentages = compute_percentages(&totals);
        Self {
            month,
            totals,
            percentages,
            starting_balance: compute_starting_balance(ledger, month),
            ending_balance: compute_ending_balance(ledger, month),
            cumulative: compute_cumulative_totals(ledger, month),
        }
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn percentages(&self) -> &Percentages {
        &self.percentages
    }

    pub fn starting_balance(&self) -> Decimal {
        self.starting_balance
    }

    pub fn ending_balance(&self) -> Decimal {
        self.ending_balance
    }

    /// Deposits minus expenses for the month alone.
    pub fn net_change(&self) -> Decimal {
        self.totals.net()
    }

    /// Totals of January through this month.
    pub fn cumulative(&self) -> &Totals {
        &self.cumulative
    }
}
