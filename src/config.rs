use std::path::{Path, PathBuf};

use crate::accounts::AccountConfig;
use crate::ai::BotConfig;
use crate::error::ConfigError;

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file; the terminal belongs to the game view.
    pub file: PathBuf,
    /// Filter used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            file: PathBuf::from("connect-four.log"),
            filter: "info".to_string(),
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bots: BotConfig,
    pub accounts: AccountConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (tier, endpoint) in [("medium", &self.bots.medium), ("hard", &self.bots.hard)] {
            if let Some(endpoint) = endpoint {
                if endpoint.command.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "bots.{tier}.command must not be empty"
                    )));
                }
            }
        }

        let accounts = &self.accounts;
        if accounts.min_password_len == 0 {
            return Err(ConfigError::Validation(
                "accounts.min_password_len must be > 0".into(),
            ));
        }
        if accounts.history_max_store < accounts.history_check_count {
            return Err(ConfigError::Validation(
                "accounts.history_max_store must be >= accounts.history_check_count".into(),
            ));
        }
        if accounts.store_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "accounts.store_path must not be empty".into(),
            ));
        }

        if self.logging.file.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "logging.file must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::EndpointConfig;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[bots]
timeout_ms = 2500

[bots.hard]
command = "python3"
args = ["uplink_server.py"]
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bots.timeout_ms, 2500);
        assert_eq!(
            config.bots.hard,
            Some(EndpointConfig {
                command: "python3".into(),
                args: vec!["uplink_server.py".into()],
            })
        );
        // Other fields should be defaults
        assert_eq!(config.bots.medium, None);
        assert_eq!(config.accounts.min_password_len, 6);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_validation_rejects_empty_command() {
        let mut config = AppConfig::default();
        config.bots.medium = Some(EndpointConfig {
            command: "  ".into(),
            args: vec![],
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_password_len() {
        let mut config = AppConfig::default();
        config.accounts.min_password_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_small_history_store() {
        let mut config = AppConfig::default();
        config.accounts.history_max_store = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config.bots.timeout_ms, 10_000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[accounts]
protected_users = ["admin"]
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.accounts.protected_users, vec!["admin".to_string()]);
        // Others are defaults
        assert_eq!(config.accounts.history_check_count, 3);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[accounts]\nmin_password_len = 0\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml().unwrap();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        config.validate().expect("roundtripped config should be valid");
        assert_eq!(config, AppConfig::default());
    }
}
