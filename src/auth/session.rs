use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::{Account, User, UserId};
use crate::storage::Repository;

use super::password::{hash_password, new_salt, verify_password};
use super::{AuthError, UserEvents, UserSubscription};

/// The authentication collaborator: owns accounts and the signed-in identity,
/// and notifies subscribers whenever that identity changes.
pub struct Session {
    repo: Repository,
    events: UserEvents,
}

impl Session {
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            events: UserEvents::new(),
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.events.current()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }

    pub fn subscribe(&self) -> UserSubscription {
        self.events.subscribe()
    }

    /// Register a new account and sign it in.
    pub fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, AuthError> {
        let (name, email) = (name.trim(), email.trim());
        if name.is_empty() || email.is_empty() || password.is_empty() || confirm_password.is_empty()
        {
            return Err(AuthError::MissingFields);
        }
        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let mut accounts = self.repo.list_accounts()?;
        if accounts.iter().any(|a| a.has_email(email)) {
            return Err(AuthError::EmailTaken(email.to_string()));
        }

        let id = next_user_id(&accounts);
        let salt = new_salt();
        let account = Account {
            id: id.clone(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(&salt, password),
            salt,
        };
        let user = account.user();
        accounts.push(account);
        self.repo.save_accounts(&accounts)?;
        info!(user = %id, "account created");

        self.start(user)
    }

    /// Sign in with email and password.
    pub fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let account = self
            .repo
            .list_accounts()?
            .into_iter()
            .find(|a| a.has_email(email))
            .filter(|a| verify_password(&a.salt, password, &a.password_hash))
            .ok_or(AuthError::InvalidCredentials)?;

        self.start(account.user())
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        self.repo.clear_session()?;
        self.events.publish(None);
        info!("logged out");
        Ok(())
    }

    /// Resume the session persisted by an earlier `login`. Returns whether a
    /// user is now signed in.
    pub fn restore(&self) -> Result<bool, AuthError> {
        let Some(id) = self.repo.read_session()? else {
            debug!("no persisted session");
            return Ok(false);
        };

        match self.repo.find_account(&id)? {
            Some(account) => {
                debug!(user = %id, "session restored");
                self.events.publish(Some(account.user()));
                Ok(true)
            }
            None => {
                warn!(user = %id, "persisted session names an unknown account, clearing it");
                self.repo.clear_session()?;
                Ok(false)
            }
        }
    }

    fn start(&self, user: User) -> Result<User, AuthError> {
        self.repo.write_session(&user.id)?;
        self.events.publish(Some(user.clone()));
        info!(user = %user.id, "logged in");
        Ok(user)
    }
}

/// Millisecond timestamp as a string, bumped until it is unused.
fn next_user_id(accounts: &[Account]) -> UserId {
    let mut candidate = Utc::now().timestamp_millis();
    loop {
        let id = UserId::new(candidate.to_string());
        if !accounts.iter().any(|a| a.id == id) {
            return id;
        }
        candidate += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::storage::{MemoryStore, SESSION_KEY};

    fn session() -> (Rc<MemoryStore>, Session) {
        let store = Rc::new(MemoryStore::new());
        (store.clone(), Session::new(Repository::new(store)))
    }

    #[test]
    fn test_sign_up_logs_in_and_persists() {
        let (store, session) = session();
        let mut subscription = session.subscribe();

        let user = session
            .sign_up("Ada", "ada@example.com", "pw", "pw")
            .unwrap();

        assert_eq!(session.current_user(), Some(user.clone()));
        assert_eq!(subscription.take_change(), Some(Some(user.clone())));
        assert!(store.contains_key(SESSION_KEY));

        let raw_users = store.raw("users").unwrap();
        assert!(!raw_users.contains("\"pw\""), "password must not be stored in clear");
    }

    #[test]
    fn test_sign_up_validation() {
        let (_, session) = session();

        assert!(matches!(
            session.sign_up("", "a@b.c", "pw", "pw"),
            Err(AuthError::MissingFields)
        ));
        assert!(matches!(
            session.sign_up("Ada", "a@b.c", "pw", "other"),
            Err(AuthError::PasswordMismatch)
        ));

        session.sign_up("Ada", "a@b.c", "pw", "pw").unwrap();
        assert!(matches!(
            session.sign_up("Other Ada", "A@B.C", "pw", "pw"),
            Err(AuthError::EmailTaken(_))
        ));
    }

    #[test]
    fn test_login_checks_password() {
        let (_, session) = session();
        session.sign_up("Ada", "ada@example.com", "pw", "pw").unwrap();
        session.logout().unwrap();

        assert!(matches!(
            session.login("ada@example.com", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            session.login("nobody@example.com", "pw"),
            Err(AuthError::InvalidCredentials)
        ));

        let user = session.login("ada@example.com", "pw").unwrap();
        assert_eq!(user.name, "Ada");
    }

    #[test]
    fn test_logout_publishes_none() {
        let (store, session) = session();
        session.sign_up("Ada", "ada@example.com", "pw", "pw").unwrap();
        let mut subscription = session.subscribe();

        session.logout().unwrap();

        assert_eq!(subscription.take_change(), Some(None));
        assert!(!session.is_logged_in());
        assert!(!store.contains_key(SESSION_KEY));
    }

    #[test]
    fn test_restore_from_persisted_session() {
        let (store, first) = session();
        let user = first.sign_up("Ada", "ada@example.com", "pw", "pw").unwrap();

        let second = Session::new(Repository::new(store));
        assert!(!second.is_logged_in());
        assert!(second.restore().unwrap());
        assert_eq!(second.current_user(), Some(user));
    }

    #[test]
    fn test_restore_clears_unknown_session() {
        let store = Rc::new(MemoryStore::with_entries([(SESSION_KEY, "\"404\"")]));
        let session = Session::new(Repository::new(store.clone()));

        assert!(!session.restore().unwrap());
        assert!(!store.contains_key(SESSION_KEY));
    }

    #[test]
    fn test_user_ids_are_unique() {
        let (_, session) = session();
        let a = session.sign_up("A", "a@example.com", "pw", "pw").unwrap();
        let b = session.sign_up("B", "b@example.com", "pw", "pw").unwrap();
        assert_ne!(a.id, b.id);
    }
}
