use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::stats::StatsBook;

/// One user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub security_question: String,
    #[serde(default)]
    pub security_answer: String,
    /// Previous passwords, most recent first.
    #[serde(default)]
    pub password_history: Vec<String>,
    #[serde(default)]
    pub stats: StatsBook,
}

/// Keyed record store for accounts.
pub trait AccountStore {
    fn get(&self, username: &str) -> Result<Option<Account>, StoreError>;

    /// Insert or replace the account stored under `account.username`.
    fn put(&mut self, account: Account) -> Result<(), StoreError>;
}

/// Accounts held in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountStore {
    accounts: BTreeMap<String, Account>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryAccountStore {
    fn get(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.get(username).cloned())
    }

    fn put(&mut self, account: Account) -> Result<(), StoreError> {
        self.accounts.insert(account.username.clone(), account);
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountFile {
    accounts: BTreeMap<String, Account>,
}

/// Accounts kept in a single JSON file. Every write replaces the file
/// atomically.
#[derive(Debug)]
pub struct JsonAccountStore {
    path: PathBuf,
    file: AccountFile,
}

impl JsonAccountStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let file = if path.exists() {
            let json = fs::read_to_string(&path).map_err(|e| StoreError::Read {
                path: path.clone(),
                source: e,
            })?;
            serde_json::from_str(&json).map_err(|e| StoreError::Parse {
                path: path.clone(),
                source: e,
            })?
        } else {
            AccountFile::default()
        };

        debug!(path = %path.display(), accounts = file.accounts.len(), "opened account store");
        Ok(JsonAccountStore { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, file: &AccountFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(file)?)?;

        // Atomic rename
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl AccountStore for JsonAccountStore {
    fn get(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.file.accounts.get(username).cloned())
    }

    /// Memory only changes once the file has been written.
    fn put(&mut self, account: Account) -> Result<(), StoreError> {
        let mut next = AccountFile {
            accounts: self.file.accounts.clone(),
        };
        next.accounts.insert(account.username.clone(), account);
        self.save(&next)?;
        self.file = next;
        Ok(())
    }
}
