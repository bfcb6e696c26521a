// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::rc::Rc;

use anyhow::Result;
use chrono::NaiveDate;
use spendwise::application::LedgerStore;
use spendwise::auth::Session;
use spendwise::domain::{NewTransaction, User};
use spendwise::storage::{MemoryStore, Repository};

/// A session and ledger store wired over one shared in-memory store.
pub struct TestApp {
    pub storage: Rc<MemoryStore>,
    pub repo: Repository,
    pub session: Session,
    pub ledger: LedgerStore,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_storage(MemoryStore::new())
    }

    pub fn with_storage(storage: MemoryStore) -> Self {
        let storage = Rc::new(storage);
        let repo = Repository::new(storage.clone());
        let session = Session::new(repo.clone());
        let ledger = LedgerStore::new(repo.clone(), session.subscribe());
        Self {
            storage,
            repo,
            session,
            ledger,
        }
    }

    /// Register `name` (email `<name>@example.com`) and follow the login.
    pub fn sign_up(&mut self, name: &str) -> Result<User> {
        let email = format!("{}@example.com", name.to_lowercase());
        let user = self.session.sign_up(name, &email, "secret", "secret")?;
        self.ledger.sync();
        Ok(user)
    }

    pub fn login(&mut self, name: &str) -> Result<User> {
        let email = format!("{}@example.com", name.to_lowercase());
        let user = self.session.login(&email, "secret")?;
        self.ledger.sync();
        Ok(user)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.session.logout()?;
        self.ledger.sync();
        Ok(())
    }
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

pub fn income(title: &str, amount: i64, category: &str, date: &str) -> NewTransaction {
    NewTransaction::income(title, amount, category).with_date(parse_date(date))
}

pub fn expense(title: &str, amount: i64, category: &str, date: &str) -> NewTransaction {
    NewTransaction::expense(title, amount, category).with_date(parse_date(date))
}
