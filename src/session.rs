//! One player's session: a human (Player One) against a bot (Player Two).
//!
//! The human move is applied and classified before the bot is asked, and the
//! bot move is applied and classified before control returns. Any bad answer
//! from the bot ends the game without a result; the board is never repaired.

use tracing::{debug, info, warn};

use crate::ai::{MoveSource, MoveSourceFactory};
use crate::error::{BotFault, SessionError};
use crate::game::{
    Board, Game, GameOutcome, GamePhase, MoveError, MoveReport, Player, WinningLine, COLS,
};
use crate::stats::{StatsBook, StatsRecorder};
use crate::tier::Tier;

pub const HUMAN: Player = Player::One;
pub const BOT: Player = Player::Two;

/// What the bot did on its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotTurn {
    Played(MoveReport),
    Faulted(BotFault),
}

/// Everything the presentation layer needs after one submitted column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub human: MoveReport,
    /// `None` when the human move ended the game.
    pub bot: Option<BotTurn>,
    pub board: Board,
    pub outcome: Option<GameOutcome>,
    pub winning_line: Option<WinningLine>,
    /// Set when the game ended but its result could not be stored. The
    /// result stays pending and is stored by the next
    /// [`PlaySession::new_game`] or [`PlaySession::end_game`].
    pub record_error: Option<String>,
}

impl TurnReport {
    pub fn continues(&self) -> bool {
        self.outcome.is_none()
    }
}

pub struct PlaySession {
    game: Game,
    /// Tier of the current game, fixed when it starts.
    tier: Option<Tier>,
    source: Option<Box<dyn MoveSource>>,
    factory: Box<dyn MoveSourceFactory>,
    recorder: Box<dyn StatsRecorder>,
}

impl PlaySession {
    pub fn new(factory: Box<dyn MoveSourceFactory>, recorder: Box<dyn StatsRecorder>) -> Self {
        PlaySession {
            game: Game::new(),
            tier: None,
            source: None,
            factory,
            recorder,
        }
    }

    /// A session whose statistics live only in memory.
    pub fn guest(factory: Box<dyn MoveSourceFactory>) -> Self {
        Self::new(factory, Box::new(StatsBook::new()))
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn tier(&self) -> Option<Tier> {
        self.tier
    }

    pub fn bot_name(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.name())
    }

    pub fn stats(&self) -> StatsBook {
        self.recorder.snapshot()
    }

    /// Start a fresh game against `tier`. The move source is built now and
    /// kept until the next call, whatever tier is selected meanwhile.
    ///
    /// Fails with [`SessionError::Record`] and keeps the finished game when
    /// its pending result still cannot be stored.
    pub fn new_game(&mut self, tier: Tier) -> Result<(), SessionError> {
        // A result that failed to store must be counted before it is lost
        self.record_outcome()?;

        if self.game.phase() == GamePhase::InProgress {
            info!(tier = ?self.tier, moves = self.game.move_count(), "abandoning unfinished game");
        }

        let source = self.factory.build(tier)?;
        info!(%tier, bot = source.name(), "new game");

        self.source = Some(source);
        self.tier = Some(tier);
        self.game.start();
        Ok(())
    }

    /// Play the human's column, then the bot's reply.
    ///
    /// Caller errors (no game, game over, full or out-of-range column) are
    /// returned as [`SessionError::Move`] with nothing changed.
    pub fn submit_column(&mut self, column: usize) -> Result<TurnReport, SessionError> {
        if self.source.is_none() {
            return Err(MoveError::NotStarted.into());
        }

        let human = self.game.play(column, HUMAN)?;
        debug!(column, row = human.row, "human move");

        let bot = if self.game.is_over() {
            None
        } else {
            Some(self.bot_turn(column))
        };

        let record_error = self.record_outcome().err().map(|err| err.to_string());

        Ok(TurnReport {
            human,
            bot,
            board: *self.game.board(),
            outcome: self.game.outcome(),
            winning_line: self.game.winning_line(),
            record_error,
        })
    }

    fn bot_turn(&mut self, human_column: usize) -> BotTurn {
        let reply = match self.source.as_mut() {
            Some(source) => source.get_move(self.game.board(), Some(human_column)),
            None => return self.fault(BotFault::SourceFailed("no move source".into())),
        };

        let column = match reply {
            Err(err) => return self.fault(BotFault::SourceFailed(err.to_string())),
            Ok(None) => return self.fault(BotFault::NoMove),
            Ok(Some(col)) if col < 0 || col >= COLS as i64 => {
                return self.fault(BotFault::OutOfRange(col))
            }
            Ok(Some(col)) => col as usize,
        };

        match self.game.play(column, BOT) {
            Ok(report) => {
                debug!(column, row = report.row, "bot move");
                BotTurn::Played(report)
            }
            Err(MoveError::ColumnFull) => self.fault(BotFault::ColumnFull(column)),
            Err(err) => self.fault(BotFault::SourceFailed(err.to_string())),
        }
    }

    fn fault(&mut self, fault: BotFault) -> BotTurn {
        warn!(tier = ?self.tier, %fault, "ending game without result");
        // The game is in progress here, so this cannot fail
        let _ = self.game.end_early();
        BotTurn::Faulted(fault)
    }

    /// End the current game early, without a result. On a finished game
    /// whose result is still unstored, retries storing it instead.
    pub fn end_game(&mut self) -> Result<GameOutcome, SessionError> {
        if let Some(outcome) = self.game.pending_outcome() {
            self.record_outcome()?;
            return Ok(outcome);
        }

        let outcome = self.game.end_early()?;
        info!(tier = ?self.tier, "game ended early");
        self.record_outcome()?;
        Ok(outcome)
    }

    /// Whether the finished game still waits for its result to be stored.
    pub fn has_unrecorded_outcome(&self) -> bool {
        self.game.pending_outcome().is_some()
    }

    /// Store the finished game's result once. The game is only marked as
    /// counted after the recorder accepted it.
    fn record_outcome(&mut self) -> Result<(), SessionError> {
        let (Some(tier), Some(outcome)) = (self.tier, self.game.pending_outcome()) else {
            return Ok(());
        };

        if let Err(err) = self.recorder.record(tier, outcome) {
            warn!(%tier, outcome = outcome.label(), error = %err, "failed to record result");
            return Err(err.into());
        }
        self.game.mark_recorded();
        info!(%tier, outcome = outcome.label(), moves = self.game.move_count(), "game over");
        Ok(())
    }
}
