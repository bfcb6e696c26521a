use serde::Serialize;

use crate::domain::Cents;

/// Headline figures for the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_income: Cents,
    pub total_expense: Cents,
    pub balance: Cents,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Cents,
}

impl From<(String, Cents)> for CategoryTotal {
    fn from((category, total): (String, Cents)) -> Self {
        Self { category, total }
    }
}

/// Summary plus the largest categories on each side, as shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub summary: Summary,
    pub top_income_categories: Vec<CategoryTotal>,
    pub top_expense_categories: Vec<CategoryTotal>,
}
