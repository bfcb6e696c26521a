use std::io::Write;

use crate::application::{AppError, LedgerStore};
use crate::domain::{format_cents, Transaction};

/// Which of the store's transaction arrays to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Income,
    Expense,
    All,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Income => "income",
            ExportKind::Expense => "expense",
            ExportKind::All => "all",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(ExportKind::Income),
            "expense" => Some(ExportKind::Expense),
            "all" => Some(ExportKind::All),
            _ => None,
        }
    }

    /// e.g. `income-transactions.csv`
    pub fn default_file_name(&self) -> String {
        format!("{}-transactions.csv", self.as_str())
    }

    fn select<'a>(&self, store: &'a LedgerStore) -> Vec<&'a Transaction> {
        match self {
            ExportKind::Income => store.income_of(),
            ExportKind::Expense => store.expense_of(),
            ExportKind::All => store.transactions(),
        }
    }
}

/// Formats the ledger store's transaction arrays for download.
pub struct Exporter<'a> {
    store: &'a LedgerStore,
}

impl<'a> Exporter<'a> {
    pub fn new(store: &'a LedgerStore) -> Self {
        Self { store }
    }

    /// Export one of the store's arrays as CSV. An empty selection is an error.
    pub fn export_csv<W: Write>(&self, kind: ExportKind, writer: W) -> Result<usize, AppError> {
        let transactions = kind.select(self.store);
        if transactions.is_empty() {
            return Err(AppError::NoDataToExport);
        }
        write_transactions_csv(transactions, writer)
    }
}

/// Write `Date,Title,Category,Amount,Type` rows, amounts with two decimals.
pub fn write_transactions_csv<'t, W: Write>(
    transactions: impl IntoIterator<Item = &'t Transaction>,
    writer: W,
) -> Result<usize, AppError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Date", "Title", "Category", "Amount", "Type"])?;

    let mut count = 0;
    for transaction in transactions {
        csv_writer.write_record([
            transaction.date.format("%Y-%m-%d").to_string(),
            transaction.title.clone(),
            transaction.category.clone(),
            format_cents(transaction.amount),
            transaction.kind.as_str().to_string(),
        ])?;
        count += 1;
    }

    csv_writer.flush()?;
    Ok(count)
}
