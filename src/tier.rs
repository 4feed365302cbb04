use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Difficulty tier. Each tier has its own move source and statistics bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Easy, Tier::Medium, Tier::Hard];

    pub fn id(self) -> &'static str {
        match self {
            Tier::Easy => "easy",
            Tier::Medium => "medium",
            Tier::Hard => "hard",
        }
    }

    /// Label shown in the difficulty selector.
    pub fn label(self) -> &'static str {
        match self {
            Tier::Easy => "Easy (Simple Bot)",
            Tier::Medium => "Medium (Transformer)",
            Tier::Hard => "Hard (CNN)",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tier::Easy => "Picks a random open column each turn.",
            Tier::Medium => "Transformer model predictions.",
            Tier::Hard => "CNN model trained to spot and block threats.",
        }
    }

    /// Next tier in selector order, wrapping around.
    pub fn next(self) -> Tier {
        match self {
            Tier::Easy => Tier::Medium,
            Tier::Medium => Tier::Hard,
            Tier::Hard => Tier::Easy,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tier '{0}' (expected 'easy', 'medium' or 'hard')")]
pub struct ParseTierError(pub String);

impl FromStr for Tier {
    type Err = ParseTierError;

    /// Accepts the tier id or its selector label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Tier::ALL
            .into_iter()
            .find(|tier| {
                tier.id().eq_ignore_ascii_case(wanted) || tier.label().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| ParseTierError(s.to_string()))
    }
}
