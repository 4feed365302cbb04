use std::path::PathBuf;

use tracing::info;

use crate::error::{AccountError, StoreError};
use crate::game::GameOutcome;
use crate::stats::{StatsBook, StatsRecorder};
use crate::tier::Tier;

use super::store::{Account, AccountStore};

/// Account settings, loadable from the `[accounts]` table.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub store_path: PathBuf,
    pub min_password_len: usize,
    /// How many previous passwords a new one is checked against.
    pub history_check_count: usize,
    /// How many previous passwords are kept.
    pub history_max_store: usize,
    /// Users whose passwords can be neither recovered nor reset.
    pub protected_users: Vec<String>,
    /// Users whose credentials validate but who may not play.
    pub restricted_logins: Vec<String>,
}

impl Default for AccountConfig {
    fn default() -> Self {
        AccountConfig {
            store_path: PathBuf::from("accounts.json"),
            min_password_len: 6,
            history_check_count: 3,
            history_max_store: 10,
            protected_users: vec!["dan".to_string()],
            restricted_logins: vec!["resetpwd".to_string()],
        }
    }
}

/// Usernames are compared trimmed and lower-cased.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Login, recovery and per-tier statistics on top of an [`AccountStore`].
pub struct Accounts<S> {
    store: S,
    config: AccountConfig,
}

impl<S: AccountStore> Accounts<S> {
    pub fn new(store: S, config: AccountConfig) -> Self {
        Accounts { store, config }
    }

    pub fn config(&self) -> &AccountConfig {
        &self.config
    }

    fn is_listed(list: &[String], username: &str) -> bool {
        list.iter().any(|name| normalize_username(name) == username)
    }

    fn is_protected(&self, username: &str) -> bool {
        Self::is_listed(&self.config.protected_users, username)
    }

    fn require(&self, username: &str) -> Result<Account, AccountError> {
        let username = normalize_username(username);
        if username.is_empty() {
            return Err(AccountError::MissingUsername);
        }
        self.store.get(&username)?.ok_or(AccountError::UnknownUser)
    }

    fn require_recoverable(&self, username: &str) -> Result<Account, AccountError> {
        let account = self.require(username)?;
        if self.is_protected(&account.username) {
            return Err(AccountError::RecoveryDisabled);
        }
        Ok(account)
    }

    fn check_length(&self, password: &str) -> Result<(), AccountError> {
        if password.is_empty() {
            return Err(AccountError::EmptyPassword);
        }
        if password.chars().count() < self.config.min_password_len {
            return Err(AccountError::PasswordTooShort(self.config.min_password_len));
        }
        Ok(())
    }

    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        security_question: &str,
        security_answer: &str,
    ) -> Result<(), AccountError> {
        let username = normalize_username(username);
        if username.is_empty() {
            return Err(AccountError::MissingUsername);
        }
        self.check_length(password)?;
        if self.store.get(&username)?.is_some() {
            return Err(AccountError::AlreadyExists(username));
        }

        self.store.put(Account {
            username: username.clone(),
            password: password.to_string(),
            security_question: security_question.trim().to_string(),
            security_answer: security_answer.trim().to_string(),
            password_history: Vec::new(),
            stats: StatsBook::new(),
        })?;
        info!(user = %username, "registered account");
        Ok(())
    }

    /// Check credentials. Unknown users and wrong passwords are reported the
    /// same way.
    pub fn login(&self, username: &str, password: &str) -> Result<Account, AccountError> {
        let username = normalize_username(username);
        if username.is_empty() {
            return Err(AccountError::MissingUsername);
        }
        if password.is_empty() {
            return Err(AccountError::MissingPassword);
        }

        let account = self
            .store
            .get(&username)?
            .filter(|account| account.password == password)
            .ok_or(AccountError::InvalidCredentials)?;

        if Self::is_listed(&self.config.restricted_logins, &username) {
            return Err(AccountError::LoginRestricted);
        }

        info!(user = %username, "logged in");
        Ok(account)
    }

    pub fn security_question(&self, username: &str) -> Result<String, AccountError> {
        let account = self.require_recoverable(username)?;
        let question = account.security_question.trim();
        if question.is_empty() {
            return Err(AccountError::NoSecurityQuestion);
        }
        Ok(question.to_string())
    }

    /// Compare an answer, trimmed and ignoring case.
    pub fn check_security_answer(&self, username: &str, answer: &str) -> Result<bool, AccountError> {
        let account = self.require_recoverable(username)?;
        let expected = account.security_answer.trim();
        if expected.is_empty() {
            return Err(AccountError::NoSecurityAnswer);
        }
        Ok(answer.trim().to_lowercase() == expected.to_lowercase())
    }

    /// Replace the password after recovery. The old password goes to the
    /// front of the history.
    pub fn reset_password(&mut self, username: &str, new_password: &str) -> Result<(), AccountError> {
        let mut account = self.require(username)?;

        self.check_length(new_password)?;
        if self.is_protected(&account.username) {
            return Err(AccountError::RecoveryDisabled);
        }
        if new_password == account.password {
            return Err(AccountError::SameAsCurrent);
        }
        let check = self.config.history_check_count;
        if account
            .password_history
            .iter()
            .take(check)
            .any(|old| old == new_password)
        {
            return Err(AccountError::RecentlyUsed(check));
        }

        let old = std::mem::replace(&mut account.password, new_password.to_string());
        account.password_history =
            push_history(&account.password_history, old, self.config.history_max_store);

        info!(user = %account.username, "password reset");
        self.store.put(account)?;
        Ok(())
    }

    pub fn password_history(&self, username: &str) -> Result<Vec<String>, AccountError> {
        Ok(self.require(username)?.password_history)
    }

    pub fn stats(&self, username: &str) -> Result<StatsBook, AccountError> {
        Ok(self.require(username)?.stats)
    }

    pub fn record_result(
        &mut self,
        username: &str,
        tier: Tier,
        outcome: GameOutcome,
    ) -> Result<(), AccountError> {
        let mut account = self.require(username)?;
        account.stats.record(tier, outcome);
        self.store.put(account)?;
        Ok(())
    }

    /// Bind these accounts to one user as a [`StatsRecorder`].
    pub fn recorder(self, username: &str) -> AccountRecorder<S> {
        AccountRecorder {
            accounts: self,
            username: normalize_username(username),
        }
    }
}

/// Newest first, duplicates removed keeping the first occurrence, capped at
/// `max` entries. An empty old password is not kept.
fn push_history(history: &[String], old: String, max: usize) -> Vec<String> {
    let mut next: Vec<String> = Vec::with_capacity(history.len() + 1);
    let candidates = (!old.is_empty()).then_some(old).into_iter();
    for password in candidates.chain(history.iter().cloned()) {
        if !next.contains(&password) {
            next.push(password);
        }
    }
    next.truncate(max);
    next
}

/// Records finished games into one user's account.
pub struct AccountRecorder<S> {
    accounts: Accounts<S>,
    username: String,
}

impl<S: AccountStore> AccountRecorder<S> {
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl<S: AccountStore> StatsRecorder for AccountRecorder<S> {
    fn record(&mut self, tier: Tier, outcome: GameOutcome) -> Result<(), StoreError> {
        match self.accounts.record_result(&self.username, tier, outcome) {
            Ok(()) => Ok(()),
            Err(AccountError::Store(err)) => Err(err),
            Err(_) => Err(StoreError::UnknownAccount(self.username.clone())),
        }
    }

    fn snapshot(&self) -> StatsBook {
        self.accounts.stats(&self.username).unwrap_or_default()
    }
}
