use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::MoveSourceError;
use crate::game::{Board, COLS, ROWS};

/// What a move source is asked: the board as a `{-1, 0, 1}` grid (row 0 on
/// top, +1 for the first mover) and the column the other side just played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub board: [[i8; COLS]; ROWS],
    pub last_opponent_column: Option<usize>,
}

impl MoveRequest {
    pub fn new(board: &Board, last_opponent_column: Option<usize>) -> Self {
        MoveRequest {
            board: board.to_grid(),
            last_opponent_column,
        }
    }
}

/// Supplies the opponent's column for a board.
///
/// The reply is a raw integer so that a misbehaving source can be caught by
/// the caller: it must be checked against the legal columns before use.
/// `Ok(None)` means the source found no legal column.
pub trait MoveSource: Send {
    fn get_move(
        &mut self,
        board: &Board,
        last_opponent_column: Option<usize>,
    ) -> Result<Option<i64>, MoveSourceError>;

    /// Return the source's display name.
    fn name(&self) -> &str;

    /// A handle that stops work the source has started outside this
    /// process, such as a model server. Sources without any return `None`.
    fn abort_handle(&self) -> Option<AbortHandle> {
        None
    }
}

/// Stops a move source's background work from another thread.
#[derive(Clone)]
pub struct AbortHandle(Arc<dyn Fn() + Send + Sync>);

impl AbortHandle {
    pub fn new(abort: impl Fn() + Send + Sync + 'static) -> Self {
        AbortHandle(Arc::new(abort))
    }

    pub fn abort(&self) {
        (self.0)()
    }
}

impl fmt::Debug for AbortHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AbortHandle")
    }
}

impl<S: MoveSource + ?Sized> MoveSource for Box<S> {
    fn get_move(
        &mut self,
        board: &Board,
        last_opponent_column: Option<usize>,
    ) -> Result<Option<i64>, MoveSourceError> {
        (**self).get_move(board, last_opponent_column)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn abort_handle(&self) -> Option<AbortHandle> {
        (**self).abort_handle()
    }
}
