use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::MoveSourceError;
use crate::tier::Tier;

use super::process::{EndpointConfig, ProcessEndpoint, SharedEndpoint};
use super::random::RandomMoveSource;
use super::remote::RemoteModelMoveSource;
use super::source::MoveSource;
use super::timed::TimedMoveSource;

/// Bot settings, loadable from the `[bots]` table.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// How long to wait for a model reply; 0 waits forever.
    pub timeout_ms: u64,
    /// Fixed seed for the easy bot (random when unset).
    pub random_seed: Option<u64>,
    /// Transformer model server.
    pub medium: Option<EndpointConfig>,
    /// CNN model server.
    pub hard: Option<EndpointConfig>,
}

impl Default for BotConfig {
    fn default() -> Self {
        BotConfig {
            timeout_ms: 10_000,
            random_seed: None,
            medium: None,
            hard: None,
        }
    }
}

impl BotConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    pub fn endpoint(&self, tier: Tier) -> Option<&EndpointConfig> {
        match tier {
            Tier::Easy => None,
            Tier::Medium => self.medium.as_ref(),
            Tier::Hard => self.hard.as_ref(),
        }
    }
}

/// Builds the move source for a tier when a game starts.
pub trait MoveSourceFactory {
    fn build(&self, tier: Tier) -> Result<Box<dyn MoveSource>, MoveSourceError>;
}

impl<F> MoveSourceFactory for F
where
    F: Fn(Tier) -> Result<Box<dyn MoveSource>, MoveSourceError>,
{
    fn build(&self, tier: Tier) -> Result<Box<dyn MoveSource>, MoveSourceError> {
        self(tier)
    }
}

/// The configured bots: a random picker for easy, model servers for medium
/// and hard. Each model server is started once and shared by every game of
/// its tier.
#[derive(Default)]
pub struct BotRoster {
    config: BotConfig,
    servers: Mutex<BTreeMap<Tier, SharedEndpoint>>,
}

impl BotRoster {
    pub fn new(config: BotConfig) -> Self {
        BotRoster {
            config,
            servers: Mutex::new(BTreeMap::new()),
        }
    }

    fn server(&self, tier: Tier, config: &EndpointConfig) -> Result<SharedEndpoint, MoveSourceError> {
        let mut servers = self
            .servers
            .lock()
            .map_err(|_| MoveSourceError::Unavailable("model server registry poisoned".into()))?;
        Ok(servers
            .entry(tier)
            .or_insert_with(|| SharedEndpoint::new(ProcessEndpoint::new(config.clone())))
            .clone())
    }
}

impl MoveSourceFactory for BotRoster {
    fn build(&self, tier: Tier) -> Result<Box<dyn MoveSource>, MoveSourceError> {
        if tier == Tier::Easy {
            let source = match self.config.random_seed {
                Some(seed) => RandomMoveSource::with_seed(seed),
                None => RandomMoveSource::new(),
            };
            return Ok(Box::new(source));
        }

        let endpoint = self.config.endpoint(tier).ok_or_else(|| {
            MoveSourceError::Unavailable(format!("no model server configured for tier '{tier}'"))
        })?;
        let name = match tier {
            Tier::Medium => "Transformer",
            _ => "CNN",
        };
        let remote = RemoteModelMoveSource::new(name, self.server(tier, endpoint)?);

        Ok(match self.config.timeout() {
            Some(timeout) => Box::new(TimedMoveSource::new(remote, timeout)),
            None => Box::new(remote),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easy_tier_is_random() {
        let roster = BotRoster::default();
        let source = roster.build(Tier::Easy).unwrap();
        assert_eq!(source.name(), "Random");
    }

    #[test]
    fn test_unconfigured_model_tier_fails() {
        let roster = BotRoster::default();
        let err = roster.build(Tier::Hard).err().unwrap();
        assert_eq!(
            err.to_string(),
            "move source is unavailable: no model server configured for tier 'hard'"
        );
    }

    #[test]
    fn test_configured_model_tier_names() {
        let endpoint = EndpointConfig {
            command: "model-server".into(),
            args: vec![],
        };
        let roster = BotRoster::new(BotConfig {
            medium: Some(endpoint.clone()),
            hard: Some(endpoint),
            ..BotConfig::default()
        });
        // Building does not launch the server
        assert_eq!(roster.build(Tier::Medium).unwrap().name(), "Transformer");
        assert_eq!(roster.build(Tier::Hard).unwrap().name(), "CNN");
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let config = BotConfig {
            timeout_ms: 0,
            ..BotConfig::default()
        };
        assert_eq!(config.timeout(), None);
        assert_eq!(
            BotConfig::default().timeout(),
            Some(Duration::from_secs(10))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_games_of_a_tier_share_one_server() {
        let roster = BotRoster::new(BotConfig {
            hard: Some(EndpointConfig {
                command: "sh".into(),
                args: vec![
                    "-c".into(),
                    r#"while read line; do echo '{"column": 3}'; done"#.into(),
                ],
            }),
            ..BotConfig::default()
        });

        let board = crate::game::Board::new();
        let mut first = roster.build(Tier::Hard).unwrap();
        assert_eq!(first.get_move(&board, None).unwrap(), Some(3));
        let pid = roster.servers.lock().unwrap()[&Tier::Hard].pid();
        assert!(pid.is_some());
        drop(first);

        let mut second = roster.build(Tier::Hard).unwrap();
        assert_eq!(second.get_move(&board, None).unwrap(), Some(3));
        assert_eq!(roster.servers.lock().unwrap()[&Tier::Hard].pid(), pid);
    }
}
