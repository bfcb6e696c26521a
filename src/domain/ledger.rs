use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use super::{Cents, Transaction, TransactionType};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Sum of amounts over a set of transactions. Saturates instead of overflowing.
pub fn total_amount<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Cents {
    transactions
        .into_iter()
        .fold(0, |total: Cents, t| total.saturating_add(t.amount))
}

/// Category -> summed amount, built in a single pass.
/// Categories without transactions are absent rather than zero.
pub fn totals_by_category<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> BTreeMap<String, Cents> {
    let mut totals: BTreeMap<String, Cents> = BTreeMap::new();

    for transaction in transactions {
        let total = totals.entry(transaction.category.clone()).or_insert(0);
        *total = total.saturating_add(transaction.amount);
    }

    totals
}

/// Order a category breakdown by amount, largest first, and keep the top `limit`.
/// Ties are broken by category name so the output is stable.
pub fn rank_categories(totals: &BTreeMap<String, Cents>, limit: usize) -> Vec<(String, Cents)> {
    let mut ranked: Vec<(String, Cents)> = totals
        .iter()
        .map(|(category, total)| (category.clone(), *total))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// Income and expense for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthTotals {
    /// 1-based month number
    pub month: u32,
    pub label: &'static str,
    pub income: Cents,
    pub expense: Cents,
}

impl MonthTotals {
    fn empty(index: usize) -> Self {
        Self {
            month: index as u32 + 1,
            label: MONTH_LABELS[index],
            income: 0,
            expense: 0,
        }
    }

    pub fn balance(&self) -> Cents {
        self.income.saturating_sub(self.expense)
    }
}

/// Twelve months of totals for one year. Every month is present, zero-filled
/// when it has no transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySeries {
    pub year: i32,
    pub months: [MonthTotals; 12],
}

impl MonthlySeries {
    pub fn month(&self, month: u32) -> Option<&MonthTotals> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.months.get(index)
    }

    pub fn by_label(&self, label: &str) -> Option<&MonthTotals> {
        self.months.iter().find(|m| m.label == label)
    }

    pub fn total_income(&self) -> Cents {
        self.months.iter().fold(0, |total: Cents, m| total.saturating_add(m.income))
    }

    pub fn total_expense(&self) -> Cents {
        self.months.iter().fold(0, |total: Cents, m| total.saturating_add(m.expense))
    }
}

/// Bucket transactions dated in `year` by calendar month.
pub fn monthly_series<'a>(
    year: i32,
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> MonthlySeries {
    let mut months: [MonthTotals; 12] = std::array::from_fn(MonthTotals::empty);

    for transaction in transactions.into_iter().filter(|t| t.date.year() == year) {
        let bucket = &mut months[transaction.date.month0() as usize];
        match transaction.kind {
            TransactionType::Income => {
                bucket.income = bucket.income.saturating_add(transaction.amount)
            }
            TransactionType::Expense => {
                bucket.expense = bucket.expense.saturating_add(transaction.amount)
            }
        }
    }

    MonthlySeries { year, months }
}
