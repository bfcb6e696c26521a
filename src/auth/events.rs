use tokio::sync::watch;

use crate::domain::{User, UserId};

/// Publisher side of the "user state changed" notification.
///
/// Every publish counts as a notification, even when the same user is
/// published twice (a restored session still asks observers to reload).
#[derive(Debug)]
pub struct UserEvents {
    sender: watch::Sender<Option<User>>,
}

impl UserEvents {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    pub fn publish(&self, user: Option<User>) {
        self.sender.send_replace(user);
    }

    pub fn current(&self) -> Option<User> {
        self.sender.borrow().clone()
    }

    /// A new subscription. Notifications published before this call are
    /// not reported as changes; `current()` still reflects them.
    pub fn subscribe(&self) -> UserSubscription {
        UserSubscription {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for UserEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of the "user state changed" notification.
#[derive(Debug, Clone)]
pub struct UserSubscription {
    receiver: watch::Receiver<Option<User>>,
}

impl UserSubscription {
    /// The user most recently published.
    pub fn current(&self) -> Option<User> {
        self.receiver.borrow().clone()
    }

    /// Whether the most recently published user is `id`, seen or not.
    pub fn is_current(&self, id: &UserId) -> bool {
        self.receiver.borrow().as_ref().is_some_and(|u| &u.id == id)
    }

    /// Returns the published state if a notification arrived since the last
    /// call, marking it as seen.
    pub fn take_change(&mut self) -> Option<Option<User>> {
        match self.receiver.has_changed() {
            Ok(true) => Some(self.receiver.borrow_and_update().clone()),
            // Publisher gone: the last state stays current, nothing new will come
            Ok(false) | Err(_) => None,
        }
    }
}
