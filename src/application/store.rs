use std::collections::BTreeMap;

use chrono::Local;
use tracing::{debug, error, info, warn};

use crate::auth::UserSubscription;
use crate::domain::{
    monthly_series, rank_categories, sample_transactions, total_amount, totals_by_category, Cents,
    IdGenerator, MonthlySeries, NewTransaction, Transaction, TransactionId, TransactionType, User,
    UserId,
};
use crate::storage::Repository;

use super::{CategoryTotal, DashboardReport, Summary};

/// What to do with ownerless records found in a user's ledger on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegacyPolicy {
    /// Stamp them with the user who loaded them and persist.
    #[default]
    Adopt,
    /// Leave them untagged and visible to whoever is signed in.
    Shared,
    /// Move them to `quarantine_<userId>`, out of the ledger.
    Quarantine,
}

/// The signed-in user's ledger.
///
/// The store follows the session through a [`UserSubscription`]: whenever a
/// "user state changed" notification arrives, `sync` reloads the ledger of
/// whoever is now signed in. Mutations sync first. Queries never show a ledger
/// whose owner is no longer the session's user; until the next `sync` they
/// see nothing. Every mutation is written back under `transactions_<userId>`
/// once the ledger for that user has loaded.
pub struct LedgerStore {
    repo: Repository,
    subscription: UserSubscription,
    policy: LegacyPolicy,
    active: Option<User>,
    transactions: Vec<Transaction>,
    loading: bool,
    ids: IdGenerator,
}

impl LedgerStore {
    pub fn new(repo: Repository, subscription: UserSubscription) -> Self {
        Self::with_policy(repo, subscription, LegacyPolicy::default())
    }

    pub fn with_policy(
        repo: Repository,
        subscription: UserSubscription,
        policy: LegacyPolicy,
    ) -> Self {
        let active = subscription.current();
        let mut store = Self {
            repo,
            subscription,
            policy,
            active,
            transactions: Vec::new(),
            loading: true,
            ids: IdGenerator::default(),
        };
        store.load();
        store
    }

    // ========================
    // Loading and persistence
    // ========================

    /// Apply a pending "user state changed" notification, if any.
    /// Returns whether the ledger was reloaded.
    pub fn sync(&mut self) -> bool {
        match self.subscription.take_change() {
            Some(user) => {
                debug!(
                    user = user.as_ref().map(|u| u.id.as_str()).unwrap_or("-"),
                    "user state changed, reloading ledger"
                );
                self.active = user;
                self.load();
                true
            }
            None => false,
        }
    }

    fn load(&mut self) {
        self.loading = true;
        self.transactions.clear();

        let mut dirty = false;
        if let Some(user_id) = self.active.as_ref().map(|u| u.id.clone()) {
            let (transactions, changed) = self.read_or_init(&user_id);
            self.transactions = transactions;
            dirty = changed;
        }

        self.ids = IdGenerator::seeded(&self.transactions);
        self.loading = false;

        if dirty {
            self.persist();
        }
    }

    /// Read the user's ledger, creating it on first sight. The flag reports
    /// whether the legacy policy changed what is stored.
    fn read_or_init(&self, user_id: &UserId) -> (Vec<Transaction>, bool) {
        match self.repo.read_ledger(user_id) {
            Ok(Some(transactions)) => {
                debug!(user = %user_id, count = transactions.len(), "ledger loaded");
                self.apply_legacy_policy(user_id, transactions)
            }
            Ok(None) => {
                info!(user = %user_id, "first visit, initializing empty ledger");
                if let Err(e) = self.repo.write_ledger(user_id, &[]) {
                    error!(user = %user_id, "failed to initialize ledger: {e}");
                }
                (Vec::new(), false)
            }
            Err(e) => {
                error!(user = %user_id, "error loading transaction data: {e}");
                (Vec::new(), false)
            }
        }
    }

    fn apply_legacy_policy(
        &self,
        user_id: &UserId,
        mut transactions: Vec<Transaction>,
    ) -> (Vec<Transaction>, bool) {
        let foreign = transactions
            .iter()
            .filter(|t| !t.is_visible_to(user_id))
            .count();
        if foreign > 0 {
            warn!(user = %user_id, foreign, "ledger holds records owned by other users; they stay hidden");
        }

        let legacy = transactions.iter().filter(|t| t.is_legacy()).count();
        if legacy == 0 {
            return (transactions, false);
        }

        match self.policy {
            LegacyPolicy::Shared => (transactions, false),
            LegacyPolicy::Adopt => {
                for transaction in transactions.iter_mut().filter(|t| t.is_legacy()) {
                    transaction.user_id = Some(user_id.clone());
                }
                info!(user = %user_id, legacy, "adopted ownerless records");
                (transactions, true)
            }
            LegacyPolicy::Quarantine => {
                let untagged: Vec<Transaction> =
                    transactions.iter().filter(|t| t.is_legacy()).cloned().collect();
                match self.repo.append_quarantine(user_id, &untagged) {
                    Ok(()) => {
                        transactions.retain(|t| !t.is_legacy());
                        info!(user = %user_id, legacy, "quarantined ownerless records");
                        (transactions, true)
                    }
                    Err(e) => {
                        // Left in place; the next load retries.
                        error!(user = %user_id, "failed to quarantine ownerless records: {e}");
                        (transactions, false)
                    }
                }
            }
        }
    }

    fn persist(&self) {
        if self.loading {
            debug!("load in progress, skipping write");
            return;
        }
        let Some(user) = &self.active else {
            return;
        };
        if let Err(e) = self.repo.write_ledger(&user.id, &self.transactions) {
            error!(user = %user.id, "failed to save transactions: {e}");
        }
    }

    // ========================
    // Mutations
    // ========================

    /// Record a transaction for the signed-in user. Returns its new id, or
    /// `None` (and does nothing) when nobody is signed in.
    pub fn add(&mut self, new: NewTransaction) -> Option<TransactionId> {
        self.sync();
        let Some(user) = &self.active else {
            debug!("add ignored: no active user");
            return None;
        };

        let transaction = Transaction {
            id: self.ids.next_id(),
            title: new.title,
            amount: new.amount,
            kind: new.kind,
            category: new.category,
            date: new.date.unwrap_or_else(|| Local::now().date_naive()),
            user_id: Some(user.id.clone()),
        };
        let id = transaction.id.clone();

        self.transactions.push(transaction);
        self.persist();
        Some(id)
    }

    /// Remove the transaction with `id`. Unknown ids are a no-op.
    /// Returns whether anything was removed.
    pub fn delete(&mut self, id: &TransactionId) -> bool {
        self.sync();
        let Some(user_id) = self.active.as_ref().map(|u| u.id.clone()) else {
            debug!("delete ignored: no active user");
            return false;
        };

        let before = self.transactions.len();
        self.transactions
            .retain(|t| !(&t.id == id && t.is_visible_to(&user_id)));
        let removed = self.transactions.len() != before;

        if removed {
            self.persist();
        }
        removed
    }

    /// Empty the signed-in user's ledger and persist immediately.
    pub fn reset(&mut self) -> bool {
        self.sync();
        if self.active.is_none() {
            return false;
        }
        self.transactions.clear();
        self.ids = IdGenerator::default();
        self.persist();
        true
    }

    /// Replace the ledger with `records`, each stamped with the signed-in user.
    pub fn bulk_load(&mut self, records: Vec<Transaction>) -> bool {
        self.sync();
        let Some(user_id) = self.active.as_ref().map(|u| u.id.clone()) else {
            return false;
        };

        self.transactions = records
            .into_iter()
            .map(|mut t| {
                t.user_id = Some(user_id.clone());
                t
            })
            .collect();
        self.ids = IdGenerator::seeded(&self.transactions);
        self.persist();
        true
    }

    pub fn load_sample_data(&mut self) -> bool {
        self.bulk_load(sample_transactions())
    }

    // ========================
    // Queries
    // ========================

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The user whose ledger is loaded, as long as the session still names
    /// them. Between a user change and the next `sync` this is `None`.
    pub fn active_user(&self) -> Option<&User> {
        self.active
            .as_ref()
            .filter(|u| self.subscription.is_current(&u.id))
    }

    fn visible(&self) -> impl Iterator<Item = &Transaction> + '_ {
        let owner = self.active_user().map(|u| &u.id);
        self.transactions
            .iter()
            .filter(move |t| owner.is_some_and(|id| t.is_visible_to(id)))
    }

    fn visible_of(&self, kind: TransactionType) -> impl Iterator<Item = &Transaction> + '_ {
        self.visible().filter(move |t| t.kind == kind)
    }

    /// Every transaction visible to the signed-in user, in insertion order.
    pub fn transactions(&self) -> Vec<&Transaction> {
        self.visible().collect()
    }

    pub fn transactions_of(&self, kind: TransactionType) -> Vec<&Transaction> {
        self.visible_of(kind).collect()
    }

    pub fn income_of(&self) -> Vec<&Transaction> {
        self.transactions_of(TransactionType::Income)
    }

    pub fn expense_of(&self) -> Vec<&Transaction> {
        self.transactions_of(TransactionType::Expense)
    }

    pub fn total_income(&self) -> Cents {
        total_amount(self.visible_of(TransactionType::Income))
    }

    pub fn total_expense(&self) -> Cents {
        total_amount(self.visible_of(TransactionType::Expense))
    }

    pub fn balance(&self) -> Cents {
        self.total_income().saturating_sub(self.total_expense())
    }

    pub fn income_by_category(&self) -> BTreeMap<String, Cents> {
        totals_by_category(self.visible_of(TransactionType::Income))
    }

    pub fn expense_by_category(&self) -> BTreeMap<String, Cents> {
        totals_by_category(self.visible_of(TransactionType::Expense))
    }

    pub fn top_income_categories(&self, limit: usize) -> Vec<CategoryTotal> {
        rank_categories(&self.income_by_category(), limit)
            .into_iter()
            .map(CategoryTotal::from)
            .collect()
    }

    pub fn top_expense_categories(&self, limit: usize) -> Vec<CategoryTotal> {
        rank_categories(&self.expense_by_category(), limit)
            .into_iter()
            .map(CategoryTotal::from)
            .collect()
    }

    pub fn monthly_series(&self, year: i32) -> MonthlySeries {
        monthly_series(year, self.visible())
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total_income: self.total_income(),
            total_expense: self.total_expense(),
            balance: self.balance(),
            transaction_count: self.visible().count(),
        }
    }

    pub fn dashboard(&self, top: usize) -> DashboardReport {
        DashboardReport {
            summary: self.summary(),
            top_income_categories: self.top_income_categories(top),
            top_expense_categories: self.top_expense_categories(top),
        }
    }
}
