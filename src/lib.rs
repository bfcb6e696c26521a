pub mod application;
pub mod auth;
pub mod cli;
pub mod domain;
pub mod io;
pub mod storage;

pub use application::{AppError, LedgerStore, LegacyPolicy};
pub use auth::{AuthError, Session};
pub use domain::*;
pub use storage::{FileStore, KeyValueStore, MemoryStore, Repository, StorageError};
