use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::error::MoveSourceError;
use crate::game::Board;

use super::source::MoveSource;

/// Picks uniformly at random among the open columns.
pub struct RandomMoveSource {
    rng: StdRng,
}

impl RandomMoveSource {
    pub fn new() -> Self {
        RandomMoveSource {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        RandomMoveSource {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomMoveSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveSource for RandomMoveSource {
    fn get_move(
        &mut self,
        board: &Board,
        _last_opponent_column: Option<usize>,
    ) -> Result<Option<i64>, MoveSourceError> {
        let columns = board.legal_columns();
        if columns.is_empty() {
            return Ok(None);
        }
        let idx = self.rng.random_range(0..columns.len());
        Ok(Some(columns[idx] as i64))
    }

    fn name(&self) -> &str {
        "Random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, Game, Player, COLS, ROWS};

    #[test]
    fn test_random_source_selects_legal_column() {
        let mut source = RandomMoveSource::new();
        let mut board = Board::new();
        for _ in 0..ROWS {
            board.drop_piece(0, Cell::PlayerOne).unwrap();
            board.drop_piece(6, Cell::PlayerTwo).unwrap();
        }
        let legal = board.legal_columns();

        for _ in 0..100 {
            let col = source.get_move(&board, None).unwrap().unwrap();
            assert!(legal.contains(&(col as usize)), "Column {} is not legal", col);
        }
    }

    #[test]
    fn test_random_source_full_board_has_no_move() {
        let mut source = RandomMoveSource::with_seed(7);
        let mut board = Board::new();
        for col in 0..COLS {
            for _ in 0..ROWS {
                board.drop_piece(col, Cell::PlayerTwo).unwrap();
            }
        }
        assert_eq!(source.get_move(&board, Some(2)).unwrap(), None);
    }

    #[test]
    fn test_seeded_sources_agree() {
        let board = Board::new();
        let mut a = RandomMoveSource::with_seed(42);
        let mut b = RandomMoveSource::with_seed(42);
        for _ in 0..20 {
            assert_eq!(
                a.get_move(&board, None).unwrap(),
                b.get_move(&board, None).unwrap()
            );
        }
    }

    #[test]
    fn test_random_sources_play_full_game() {
        let mut one = RandomMoveSource::with_seed(1);
        let mut two = RandomMoveSource::with_seed(2);
        let mut game = Game::started();

        let mut player = Player::One;
        while !game.is_over() {
            let source = if player == Player::One { &mut one } else { &mut two };
            let col = source.get_move(game.board(), None).unwrap().unwrap();
            game.play(col as usize, player).unwrap();
            player = player.other();
        }

        assert!(game.outcome().is_some());
    }

    #[test]
    fn test_random_source_name() {
        assert_eq!(RandomMoveSource::new().name(), "Random");
    }
}
