use thiserror::Error;

use crate::auth::AuthError;
use crate::domain::TransactionType;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Title is required")]
    TitleRequired,

    #[error("Please enter a valid amount: {0}")]
    InvalidAmount(String),

    #[error("Please select a category")]
    CategoryRequired,

    #[error("Unknown {kind} category: {category} (expected one of: {allowed})")]
    UnknownCategory {
        kind: TransactionType,
        category: String,
        allowed: String,
    },

    #[error("Date is required")]
    DateRequired,

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown transaction type: {0} (expected income or expense)")]
    InvalidTransactionType(String),

    #[error("Please log in first")]
    NotLoggedIn,

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("No data to export")]
    NoDataToExport,

    #[error("Unknown export type: {0} (expected income, expense or all)")]
    InvalidExportKind(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
