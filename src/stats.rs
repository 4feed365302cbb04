use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::game::GameOutcome;
use crate::tier::Tier;

/// Counters for one difficulty tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierStats {
    pub played: u64,
    pub won: u64,
    pub lost: u64,
    pub drawn: u64,
    pub no_result: u64,
}

impl TierStats {
    /// Count one finished game.
    pub fn record(&mut self, outcome: GameOutcome) {
        self.played += 1;
        match outcome {
            GameOutcome::Win => self.won += 1,
            GameOutcome::Loss => self.lost += 1,
            GameOutcome::Draw => self.drawn += 1,
            GameOutcome::NoResult => self.no_result += 1,
        }
    }

    pub fn count(&self, outcome: GameOutcome) -> u64 {
        match outcome {
            GameOutcome::Win => self.won,
            GameOutcome::Loss => self.lost,
            GameOutcome::Draw => self.drawn,
            GameOutcome::NoResult => self.no_result,
        }
    }

    /// Wins over games with a result, or 0.0 when none have one.
    pub fn win_rate(&self) -> f32 {
        let decided = self.played - self.no_result;
        if decided == 0 {
            return 0.0;
        }
        self.won as f32 / decided as f32
    }

    /// Multi-line summary as shown in the result dialog.
    pub fn summary(&self) -> String {
        format!(
            "Played: {}\nWins: {}\nLosses: {}\nDraws: {}\nNo Result: {}",
            self.played, self.won, self.lost, self.drawn, self.no_result
        )
    }
}

/// Statistics for every tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsBook {
    tiers: BTreeMap<Tier, TierStats>,
}

impl StatsBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tier(&self, tier: Tier) -> TierStats {
        self.tiers.get(&tier).copied().unwrap_or_default()
    }

    pub fn record(&mut self, tier: Tier, outcome: GameOutcome) {
        self.tiers.entry(tier).or_default().record(outcome);
    }

    pub fn total_played(&self) -> u64 {
        self.tiers.values().map(|s| s.played).sum()
    }

    /// Every tier in selector order, including those never played.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, TierStats)> + '_ {
        Tier::ALL.into_iter().map(move |tier| (tier, self.tier(tier)))
    }
}

/// Where finished games are counted.
pub trait StatsRecorder {
    /// Count one finished game under `tier`.
    fn record(&mut self, tier: Tier, outcome: GameOutcome) -> Result<(), StoreError>;

    /// Current counters for display.
    fn snapshot(&self) -> StatsBook;
}

impl StatsRecorder for StatsBook {
    fn record(&mut self, tier: Tier, outcome: GameOutcome) -> Result<(), StoreError> {
        StatsBook::record(self, tier, outcome);
        Ok(())
    }

    fn snapshot(&self) -> StatsBook {
        self.clone()
    }
}
