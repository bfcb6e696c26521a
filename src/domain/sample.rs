use chrono::NaiveDate;

use super::{Transaction, TransactionId, TransactionType};

const SAMPLE: &[(u64, &str, i64, TransactionType, &str, &str)] = &[
    (1, "Salary", 5000, TransactionType::Income, "Salary", "2023-06-01"),
    (2, "Rent", 1200, TransactionType::Expense, "Housing", "2023-06-05"),
    (3, "Groceries", 200, TransactionType::Expense, "Food", "2023-06-08"),
    (4, "Freelance Work", 800, TransactionType::Income, "Freelance", "2023-06-15"),
    (5, "Restaurant", 75, TransactionType::Expense, "Food", "2023-06-18"),
    (6, "Utilities", 150, TransactionType::Expense, "Utilities", "2023-06-20"),
    (7, "Salary", 5000, TransactionType::Income, "Salary", "2023-05-01"),
    (8, "Bonus", 1000, TransactionType::Income, "Salary", "2023-05-10"),
    (9, "Rent", 1200, TransactionType::Expense, "Housing", "2023-05-05"),
    (10, "Groceries", 250, TransactionType::Expense, "Food", "2023-05-12"),
    (11, "Salary", 5000, TransactionType::Income, "Salary", "2023-04-01"),
    (12, "Rent", 1200, TransactionType::Expense, "Housing", "2023-04-05"),
    (13, "Car Repair", 450, TransactionType::Expense, "Transportation", "2023-04-18"),
    (14, "Freelance Work", 1200, TransactionType::Income, "Freelance", "2023-04-22"),
];

/// Demo ledger spanning April to June 2023, without owners.
pub fn sample_transactions() -> Vec<Transaction> {
    SAMPLE
        .iter()
        .filter_map(|&(id, title, units, kind, category, date)| {
            Some(Transaction {
                id: TransactionId::Number(id),
                title: title.to_string(),
                amount: units * 100,
                kind,
                category: category.to_string(),
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?,
                user_id: None,
            })
        })
        .collect()
}
