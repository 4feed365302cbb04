//! Core Connect Four game logic: board representation, players, turn
//! classification and the per-game lifecycle.

mod board;
mod player;
mod state;

pub use board::{Board, Cell, Coord, GridError, MoveError, WinningLine, COLS, CONNECT, ROWS};
pub use player::Player;
pub use state::{
    board_full, classify_turn, detect_win, drop, legal_columns, new_game, Game, GameOutcome,
    GamePhase, MoveReport, TurnStatus,
};
