use chrono::NaiveDate;

use crate::domain::{
    canonical_category, parse_cents, NewTransaction, TransactionType, MAX_CENTS,
};

use super::AppError;

/// Transaction fields as typed by a user, before any checking.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub kind: TransactionType,
    pub title: String,
    pub amount: String,
    pub category: String,
    pub date: String,
}

impl TransactionDraft {
    pub fn new(kind: TransactionType) -> Self {
        Self {
            kind,
            title: String::new(),
            amount: String::new(),
            category: String::new(),
            date: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = amount.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Check every field and produce the record to hand to the ledger store.
    /// Fields are checked in form order; the first failure is returned.
    pub fn validate(&self) -> Result<NewTransaction, AppError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::TitleRequired);
        }

        let amount = parse_cents(&self.amount)
            .map_err(|e| AppError::InvalidAmount(e.to_string()))?;
        if amount <= 0 {
            return Err(AppError::InvalidAmount("amount must be positive".to_string()));
        }
        if amount > MAX_CENTS {
            return Err(AppError::InvalidAmount("amount is too large".to_string()));
        }

        if self.category.trim().is_empty() {
            return Err(AppError::CategoryRequired);
        }
        let category = canonical_category(self.kind, &self.category).ok_or_else(|| {
            AppError::UnknownCategory {
                kind: self.kind,
                category: self.category.trim().to_string(),
                allowed: self.kind.categories().join(", "),
            }
        })?;

        let date = self.date.trim();
        if date.is_empty() {
            return Err(AppError::DateRequired);
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| AppError::InvalidDate(date.to_string()))?;

        Ok(NewTransaction::new(title, amount, self.kind, category).with_date(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> TransactionDraft {
        TransactionDraft::new(TransactionType::Expense)
            .with_title("  Groceries ")
            .with_amount("42.5")
            .with_category("food")
            .with_date("2023-06-08")
    }

    #[test]
    fn test_valid_draft() {
        let new = valid().validate().unwrap();

        assert_eq!(new.title, "Groceries");
        assert_eq!(new.amount, 4250);
        assert_eq!(new.kind, TransactionType::Expense);
        assert_eq!(new.category, "Food");
        assert_eq!(new.date, NaiveDate::from_ymd_opt(2023, 6, 8));
    }

    #[test]
    fn test_title_required() {
        let result = valid().with_title("   ").validate();
        assert!(matches!(result, Err(AppError::TitleRequired)));
    }

    #[test]
    fn test_amount_must_be_positive_number() {
        for amount in ["", "abc", "0", "0.00", "-5", "99999999999999999"] {
            let result = valid().with_amount(amount).validate();
            assert!(
                matches!(result, Err(AppError::InvalidAmount(_))),
                "amount {amount:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_category_required_and_known() {
        let result = valid().with_category("").validate();
        assert!(matches!(result, Err(AppError::CategoryRequired)));

        // Income categories are not valid for expenses
        let result = valid().with_category("Salary").validate();
        assert!(matches!(result, Err(AppError::UnknownCategory { .. })));
    }

    #[test]
    fn test_date_required_and_iso() {
        let result = valid().with_date("").validate();
        assert!(matches!(result, Err(AppError::DateRequired)));

        let result = valid().with_date("08/06/2023").validate();
        assert!(matches!(result, Err(AppError::InvalidDate(_))));
    }

    #[test]
    fn test_messages_match_form_wording() {
        assert_eq!(AppError::TitleRequired.to_string(), "Title is required");
        assert_eq!(AppError::CategoryRequired.to_string(), "Please select a category");
        assert_eq!(AppError::DateRequired.to_string(), "Date is required");
    }
}
