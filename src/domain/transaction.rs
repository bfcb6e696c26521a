use std::fmt;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{amount_units, Cents, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }

    pub fn categories(&self) -> &'static [&'static str] {
        super::categories_for(*self)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifier of a transaction, unique within one user's ledger.
///
/// Ids minted by this crate are numeric. Persisted ledgers may also hold
/// string ids, which are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransactionId {
    Number(u64),
    Text(String),
}

impl TransactionId {
    /// Interpret user input: digits become a numeric id, anything else a text id.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        input
            .parse::<u64>()
            .map(TransactionId::Number)
            .unwrap_or_else(|_| TransactionId::Text(input.to_string()))
    }

    fn as_number(&self) -> Option<u64> {
        match self {
            TransactionId::Number(n) => Some(*n),
            TransactionId::Text(_) => None,
        }
    }
}

impl From<u64> for TransactionId {
    fn from(id: u64) -> Self {
        TransactionId::Number(id)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionId::Number(n) => write!(f, "{}", n),
            TransactionId::Text(s) => f.write_str(s),
        }
    }
}

/// A single income or expense record. Immutable once recorded; it can only be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub title: String,
    /// Always positive; the type carries the direction
    #[serde(with = "amount_units")]
    pub amount: Cents,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub date: NaiveDate,
    /// Owner. Records written before ledgers were per-user have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// True for records carrying no owner at all.
    pub fn is_legacy(&self) -> bool {
        self.user_id.is_none()
    }

    /// A record is visible to its owner, and untagged records to anyone.
    pub fn is_visible_to(&self, user: &UserId) -> bool {
        self.user_id.as_ref().is_none_or(|owner| owner == user)
    }
}

/// Input to `LedgerStore::add`: everything but the id and owner, which the store assigns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub title: String,
    pub amount: Cents,
    pub kind: TransactionType,
    pub category: String,
    /// Defaults to today when absent
    pub date: Option<NaiveDate>,
}

impl NewTransaction {
    pub fn new(
        title: impl Into<String>,
        amount: Cents,
        kind: TransactionType,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            amount,
            kind,
            category: category.into(),
            date: None,
        }
    }

    pub fn income(title: impl Into<String>, amount: Cents, category: impl Into<String>) -> Self {
        Self::new(title, amount, TransactionType::Income, category)
    }

    pub fn expense(title: impl Into<String>, amount: Cents, category: impl Into<String>) -> Self {
        Self::new(title, amount, TransactionType::Expense, category)
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Mints transaction ids for one ledger.
///
/// Ids are millisecond timestamps, bumped past the last id handed out so two
/// records created within the same millisecond never collide.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    /// Start above the largest numeric id already present.
    pub fn seeded<'a>(existing: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let last = existing
            .into_iter()
            .filter_map(|t| t.id.as_number())
            .max()
            .unwrap_or(0);
        Self { last }
    }

    pub fn next_id(&mut self) -> TransactionId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_at(now)
    }

    /// Once a stored id has reached `u64::MAX` no larger number exists, so
    /// further ids are random text ids.
    pub fn next_at(&mut self, now_millis: u64) -> TransactionId {
        let Some(floor) = self.last.checked_add(1) else {
            return TransactionId::Text(Uuid::new_v4().to_string());
        };
        let id = now_millis.max(floor);
        self.last = id;
        TransactionId::Number(id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample(id: u64, user: Option<&str>) -> Transaction {
        Transaction {
            id: TransactionId::Number(id),
            title: "Groceries".into(),
            amount: 20050,
            kind: TransactionType::Expense,
            category: "Food".into(),
            date: date("2023-06-08"),
            user_id: user.map(UserId::new),
        }
    }

    #[test]
    fn test_transaction_type_roundtrip() {
        for kind in [TransactionType::Income, TransactionType::Expense] {
            assert_eq!(TransactionType::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(TransactionType::from_str("INCOME"), Some(TransactionType::Income));
        assert_eq!(TransactionType::from_str("transfer"), None);
    }

    #[test]
    fn test_serializes_to_persisted_layout() {
        let value = serde_json::to_value(sample(3, Some("17"))).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 3,
                "title": "Groceries",
                "amount": 200.5,
                "type": "expense",
                "category": "Food",
                "date": "2023-06-08",
                "userId": "17"
            })
        );
    }

    #[test]
    fn test_legacy_record_omits_user_id() {
        let value = serde_json::to_value(sample(3, None)).unwrap();
        assert!(value.get("userId").is_none());
    }

    #[test]
    fn test_deserializes_string_ids_and_numeric_owner() {
        let parsed: Transaction = serde_json::from_value(json!({
            "id": "abc",
            "title": "Salary",
            "amount": 5000,
            "type": "income",
            "category": "Salary",
            "date": "2023-06-01",
            "userId": 1686000000000u64
        }))
        .unwrap();

        assert_eq!(parsed.id, TransactionId::Text("abc".into()));
        assert_eq!(parsed.amount, 500000);
        assert!(parsed.is_income());
        assert_eq!(parsed.user_id, Some(UserId::new("1686000000000")));
    }

    #[test]
    fn test_visibility() {
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        assert!(sample(1, Some("alice")).is_visible_to(&alice));
        assert!(!sample(1, Some("alice")).is_visible_to(&bob));
        assert!(sample(1, None).is_visible_to(&bob));
        assert!(sample(1, None).is_legacy());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(TransactionId::parse("42"), TransactionId::Number(42));
        assert_eq!(TransactionId::parse("x-1"), TransactionId::Text("x-1".into()));
        assert_eq!(TransactionId::Number(42).to_string(), "42");
    }

    #[test]
    fn test_id_generator_never_repeats_within_a_millisecond() {
        let mut ids = IdGenerator::default();
        let first = ids.next_at(1_000);
        let second = ids.next_at(1_000);
        let third = ids.next_at(999);

        assert_eq!(first, TransactionId::Number(1_000));
        assert_eq!(second, TransactionId::Number(1_001));
        assert_eq!(third, TransactionId::Number(1_002));
    }

    #[test]
    fn test_id_generator_seeds_past_existing_ids() {
        let existing = vec![sample(5_000, None), sample(9_000, None)];
        let mut ids = IdGenerator::seeded(&existing);
        assert_eq!(ids.next_at(10), TransactionId::Number(9_001));
    }

    #[test]
    fn test_id_generator_past_largest_number_switches_to_text() {
        let existing = vec![sample(u64::MAX, None)];
        let mut ids = IdGenerator::seeded(&existing);

        let first = ids.next_at(1_000);
        let second = ids.next_at(1_000);

        assert!(matches!(first, TransactionId::Text(_)));
        assert!(matches!(second, TransactionId::Text(_)));
        assert_ne!(first, second);
    }
}
