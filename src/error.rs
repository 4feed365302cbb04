use std::path::PathBuf;
use std::time::Duration;

use crate::game::MoveError;

/// Failures reported by a move source. Every one of them ends the game
/// without a result.
#[derive(Debug, thiserror::Error)]
pub enum MoveSourceError {
    #[error("move source did not answer within {0:?}")]
    Timeout(Duration),

    #[error("move source is unavailable: {0}")]
    Unavailable(String),

    #[error("malformed reply from move source: {0}")]
    MalformedReply(String),

    #[error("I/O error talking to move source: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a bot turn could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BotFault {
    /// The source failed or timed out.
    #[error("bot failed: {0}")]
    SourceFailed(String),
    /// No column although open columns remain.
    #[error("bot returned no move while columns are open")]
    NoMove,
    #[error("bot returned out-of-range column {0}")]
    OutOfRange(i64),
    #[error("bot returned full column {0}")]
    ColumnFull(usize),
}

/// Errors surfaced by a play session to its presentation layer.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("move rejected: {0}")]
    Move(#[from] MoveError),

    #[error("cannot start a game: {0}")]
    Source(#[from] MoveSourceError),

    #[error("failed to record result: {0}")]
    Record(#[from] StoreError),
}

/// Errors that can occur while reading or writing the account file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read account store {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse account store {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unknown account '{0}'")]
    UnknownAccount(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Account operations rejected by policy or by the store.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("please enter your username")]
    MissingUsername,

    #[error("please enter your password")]
    MissingPassword,

    #[error("incorrect username or password")]
    InvalidCredentials,

    #[error("login is not available for this account")]
    LoginRestricted,

    #[error("user not found")]
    UnknownUser,

    #[error("an account named '{0}' already exists")]
    AlreadyExists(String),

    #[error("password recovery is disabled for this user")]
    RecoveryDisabled,

    #[error("no security question is set for this user")]
    NoSecurityQuestion,

    #[error("no security answer is set for this user")]
    NoSecurityAnswer,

    #[error("password cannot be empty")]
    EmptyPassword,

    #[error("password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("new password cannot be the same as the current password")]
    SameAsCurrent,

    #[error("new password cannot match any of your last {0} passwords")]
    RecentlyUsed(usize),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_source_error_display() {
        let err = MoveSourceError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "move source did not answer within 250ms");
    }

    #[test]
    fn test_bot_fault_display() {
        assert_eq!(
            BotFault::OutOfRange(9).to_string(),
            "bot returned out-of-range column 9"
        );
        assert_eq!(
            BotFault::ColumnFull(0).to_string(),
            "bot returned full column 0"
        );
    }

    #[test]
    fn test_account_error_display() {
        assert_eq!(
            AccountError::RecentlyUsed(3).to_string(),
            "new password cannot match any of your last 3 passwords"
        );
        assert_eq!(
            AccountError::PasswordTooShort(6).to_string(),
            "password must be at least 6 characters"
        );
    }

    #[test]
    fn test_session_error_from_move_error() {
        let err: SessionError = MoveError::ColumnFull.into();
        assert_eq!(err.to_string(), "move rejected: column is full");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("accounts.min_password_len must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: accounts.min_password_len must be > 0"
        );
    }
}
