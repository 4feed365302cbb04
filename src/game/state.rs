use serde::{Deserialize, Serialize};

use super::{Board, MoveError, Player, WinningLine};

/// Result of checking the board after a successful drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    /// The mover completed four in a row.
    Win(WinningLine),
    Draw,
    Continue,
}

/// Terminal result of a game, from Player One's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Win,
    Loss,
    Draw,
    NoResult,
}

impl GameOutcome {
    /// Outcome for Player One when `winner` completed a line.
    pub fn from_winner(winner: Player) -> Self {
        match winner {
            Player::One => GameOutcome::Win,
            Player::Two => GameOutcome::Loss,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GameOutcome::Win => "win",
            GameOutcome::Loss => "loss",
            GameOutcome::Draw => "draw",
            GameOutcome::NoResult => "no_result",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    NotStarted,
    InProgress,
    Terminal,
}

/// An empty board.
pub fn new_game() -> Board {
    Board::new()
}

/// Open columns in ascending order; empty when the board is full.
pub fn legal_columns(board: &Board) -> Vec<usize> {
    board.legal_columns()
}

/// Drop `player`'s piece into `column`, returning the new board and the row
/// it landed on. The input board is never modified.
pub fn drop(board: &Board, column: usize, player: Player) -> Result<(Board, usize), MoveError> {
    let mut next = *board;
    let row = next.drop_piece(column, player.to_cell())?;
    Ok((next, row))
}

/// First four-in-a-row owned by `player`, if any.
pub fn detect_win(board: &Board, player: Player) -> Option<WinningLine> {
    board.find_winning_line(player.to_cell())
}

pub fn board_full(board: &Board) -> bool {
    board.is_full()
}

/// Classify the board after `mover` dropped a piece. The win check runs
/// before the full-board check, so a line completed on the last empty cell
/// is a win.
pub fn classify_turn(board: &Board, mover: Player) -> TurnStatus {
    if let Some(line) = detect_win(board, mover) {
        TurnStatus::Win(line)
    } else if board_full(board) {
        TurnStatus::Draw
    } else {
        TurnStatus::Continue
    }
}

/// What happened on one accepted drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    pub player: Player,
    pub column: usize,
    pub row: usize,
    pub status: TurnStatus,
}

/// One game: board, lifecycle phase, and once-only outcome bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    board: Board,
    phase: GamePhase,
    outcome: Option<GameOutcome>,
    winning_line: Option<WinningLine>,
    outcome_recorded: bool,
    last_move: Option<(Player, usize)>,
    move_count: usize,
}

impl Game {
    /// A game that has not been started; every move is rejected until
    /// [`Game::start`].
    pub fn new() -> Self {
        Game {
            board: new_game(),
            phase: GamePhase::NotStarted,
            outcome: None,
            winning_line: None,
            outcome_recorded: false,
            last_move: None,
            move_count: 0,
        }
    }

    /// Create a game that is already in progress.
    pub fn started() -> Self {
        let mut game = Game::new();
        game.start();
        game
    }

    /// Replace the board with an empty one and reset every flag.
    pub fn start(&mut self) {
        *self = Game {
            phase: GamePhase::InProgress,
            ..Game::new()
        };
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.phase != GamePhase::NotStarted
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Terminal
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// The line that ended the game, when it ended in a win or loss.
    pub fn winning_line(&self) -> Option<WinningLine> {
        self.winning_line
    }

    pub fn last_move(&self) -> Option<(Player, usize)> {
        self.last_move
    }

    pub fn move_count(&self) -> usize {
        self.move_count
    }

    /// Legal columns, or none at all outside of play.
    pub fn legal_columns(&self) -> Vec<usize> {
        if self.phase != GamePhase::InProgress {
            return Vec::new();
        }
        legal_columns(&self.board)
    }

    fn ensure_in_progress(&self) -> Result<(), MoveError> {
        match self.phase {
            GamePhase::NotStarted => Err(MoveError::NotStarted),
            GamePhase::Terminal => Err(MoveError::GameOver),
            GamePhase::InProgress => Ok(()),
        }
    }

    /// Apply a drop for `player`. Rejected drops leave the game untouched.
    pub fn play(&mut self, column: usize, player: Player) -> Result<MoveReport, MoveError> {
        self.ensure_in_progress()?;

        let (board, row) = drop(&self.board, column, player)?;
        self.board = board;
        self.last_move = Some((player, column));
        self.move_count += 1;

        let status = classify_turn(&self.board, player);
        match status {
            TurnStatus::Win(line) => {
                self.winning_line = Some(line);
                self.finish(GameOutcome::from_winner(player));
            }
            TurnStatus::Draw => self.finish(GameOutcome::Draw),
            TurnStatus::Continue => {}
        }

        Ok(MoveReport {
            player,
            column,
            row,
            status,
        })
    }

    /// End an in-progress game without a winner.
    pub fn end_early(&mut self) -> Result<GameOutcome, MoveError> {
        self.ensure_in_progress()?;
        self.finish(GameOutcome::NoResult);
        Ok(GameOutcome::NoResult)
    }

    fn finish(&mut self, outcome: GameOutcome) {
        self.phase = GamePhase::Terminal;
        self.outcome = Some(outcome);
    }

    /// The terminal outcome while it has not been counted yet. `None`
    /// before the game ends and after [`Game::mark_recorded`].
    pub fn pending_outcome(&self) -> Option<GameOutcome> {
        if self.outcome_recorded {
            return None;
        }
        self.outcome
    }

    /// Note that the outcome has been counted. Only call this once the
    /// count is stored.
    pub fn mark_recorded(&mut self) {
        if self.outcome.is_some() {
            self.outcome_recorded = true;
        }
    }

    pub fn outcome_recorded(&self) -> bool {
        self.outcome_recorded
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
