// Authentication: accounts, the signed-in identity, and the notification
// observers use to follow identity changes.

mod events;
mod password;
mod session;

use thiserror::Error;

use crate::storage::StorageError;

pub use events::{UserEvents, UserSubscription};
pub use session::Session;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
