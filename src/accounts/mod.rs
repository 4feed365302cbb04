//! User accounts: credentials, password recovery and per-tier statistics.
//! Passwords are stored and compared as given.

mod service;
mod store;

pub use service::{normalize_username, AccountConfig, AccountRecorder, Accounts};
pub use store::{Account, AccountStore, JsonAccountStore, MemoryAccountStore};
