use super::TransactionType;

pub const INCOME_CATEGORIES: &[&str] = &["Salary", "Freelance", "Investments", "Gift", "Other"];

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Food",
    "Housing",
    "Transportation",
    "Utilities",
    "Entertainment",
    "Healthcare",
    "Education",
    "Personal",
    "Other",
];

/// The fixed list of categories a transaction of the given type may use.
pub fn categories_for(kind: TransactionType) -> &'static [&'static str] {
    match kind {
        TransactionType::Income => INCOME_CATEGORIES,
        TransactionType::Expense => EXPENSE_CATEGORIES,
    }
}

/// Match user input against the allowed list, ignoring case.
/// Returns the canonical spelling.
pub fn canonical_category(kind: TransactionType, input: &str) -> Option<&'static str> {
    let input = input.trim();
    categories_for(kind)
        .iter()
        .copied()
        .find(|category| category.eq_ignore_ascii_case(input))
}
