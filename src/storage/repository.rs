use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{Account, Transaction, UserId};

use super::{KeyValueStore, StorageError};

/// Key holding the JSON array of registered accounts.
pub const USERS_KEY: &str = "users";

/// Key holding the id of the signed-in user, if any.
pub const SESSION_KEY: &str = "session";

/// Key of a user's ledger: `transactions_<userId>`.
pub fn transactions_key(user: &UserId) -> String {
    format!("transactions_{}", user)
}

/// Key of the ownerless records moved out of a user's ledger.
pub fn quarantine_key(user: &UserId) -> String {
    format!("quarantine_{}", user)
}

/// Typed access to the JSON documents kept in a [`KeyValueStore`].
#[derive(Clone)]
pub struct Repository {
    storage: Rc<dyn KeyValueStore>,
}

impl Repository {
    pub fn new(storage: Rc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.storage.get(key)? {
            // An empty value counts as unset
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::CorruptValue {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.storage.set(key, &raw)
    }

    // ========================
    // Ledgers
    // ========================

    /// Read a user's ledger. `None` means the user has never been seen.
    pub fn read_ledger(&self, user: &UserId) -> Result<Option<Vec<Transaction>>, StorageError> {
        self.read_json(&transactions_key(user))
    }

    pub fn write_ledger(&self, user: &UserId, transactions: &[Transaction]) -> Result<(), StorageError> {
        self.write_json(&transactions_key(user), transactions)
    }

    pub fn read_quarantine(&self, user: &UserId) -> Result<Vec<Transaction>, StorageError> {
        Ok(self.read_json(&quarantine_key(user))?.unwrap_or_default())
    }

    /// Append records to a user's quarantine, keeping what is already there.
    pub fn append_quarantine(
        &self,
        user: &UserId,
        records: &[Transaction],
    ) -> Result<(), StorageError> {
        let mut quarantined = self.read_quarantine(user)?;
        quarantined.extend_from_slice(records);
        self.write_json(&quarantine_key(user), &quarantined)
    }

    // ========================
    // Accounts and session
    // ========================

    pub fn list_accounts(&self) -> Result<Vec<Account>, StorageError> {
        Ok(self.read_json(USERS_KEY)?.unwrap_or_default())
    }

    pub fn save_accounts(&self, accounts: &[Account]) -> Result<(), StorageError> {
        self.write_json(USERS_KEY, accounts)
    }

    pub fn find_account(&self, id: &UserId) -> Result<Option<Account>, StorageError> {
        Ok(self.list_accounts()?.into_iter().find(|a| &a.id == id))
    }

    pub fn read_session(&self) -> Result<Option<UserId>, StorageError> {
        self.read_json(SESSION_KEY)
    }

    pub fn write_session(&self, user: &UserId) -> Result<(), StorageError> {
        self.write_json(SESSION_KEY, user)
    }

    pub fn clear_session(&self) -> Result<(), StorageError> {
        self.storage.remove(SESSION_KEY)
    }
}
