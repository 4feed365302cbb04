pub const ROWS: usize = 6;
pub const COLS: usize = 7;

/// Length of a winning run.
pub const CONNECT: usize = 4;

/// Scan directions as (row step, column step): horizontal, vertical, and the
/// two diagonals. The order is part of the first-found contract of
/// [`Board::find_winning_line`].
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// A (row, column) coordinate. Row 0 is the top row.
pub type Coord = (usize, usize);

/// Four coordinates forming a winning run, in scan order.
pub type WinningLine = [Coord; CONNECT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    PlayerOne,
    PlayerTwo,
}

impl Cell {
    /// Numeric grid value: +1 for the first mover, -1 for the second, 0 empty.
    pub fn value(self) -> i8 {
        match self {
            Cell::Empty => 0,
            Cell::PlayerOne => 1,
            Cell::PlayerTwo => -1,
        }
    }

    pub fn from_value(value: i8) -> Option<Cell> {
        match value {
            0 => Some(Cell::Empty),
            1 => Some(Cell::PlayerOne),
            -1 => Some(Cell::PlayerTwo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("column is full")]
    ColumnFull,
    #[error("column is out of range")]
    InvalidColumn,
    #[error("no game in progress")]
    NotStarted,
    #[error("game is over")]
    GameOver,
}

/// Reasons a grid cannot be turned into a [`Board`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("invalid cell value {value} at row {row}, column {col}")]
    InvalidCell { row: usize, col: usize, value: i8 },
    #[error("piece at row {row}, column {col} has nothing below it")]
    FloatingPiece { row: usize, col: usize },
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Build a board from a `{-1, 0, 1}` grid, row 0 on top.
    pub fn from_grid(grid: &[[i8; COLS]; ROWS]) -> Result<Self, GridError> {
        let mut board = Board::new();
        for (row, values) in grid.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                board.cells[row][col] =
                    Cell::from_value(value).ok_or(GridError::InvalidCell { row, col, value })?;
            }
        }

        // Every occupied cell must sit on the bottom row or on another piece
        for col in 0..COLS {
            for row in 0..ROWS - 1 {
                if board.cells[row][col] != Cell::Empty && board.cells[row + 1][col] == Cell::Empty
                {
                    return Err(GridError::FloatingPiece { row, col });
                }
            }
        }

        Ok(board)
    }

    /// Grid form handed to move sources.
    pub fn to_grid(&self) -> [[i8; COLS]; ROWS] {
        let mut grid = [[0i8; COLS]; ROWS];
        for row in 0..ROWS {
            for col in 0..COLS {
                grid[row][col] = self.cells[row][col].value();
            }
        }
        grid
    }

    /// Get the cell at a specific position
    /// Row 0 is the top, row 5 is the bottom
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Check if a column is full. Out-of-range columns count as full.
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= COLS {
            return true;
        }
        self.cells[0][col] != Cell::Empty
    }

    /// Open columns in ascending order.
    pub fn legal_columns(&self) -> Vec<usize> {
        (0..COLS).filter(|&col| !self.is_column_full(col)).collect()
    }

    /// Drop a piece in a column, returns the row where it landed
    pub fn drop_piece(&mut self, col: usize, cell: Cell) -> Result<usize, MoveError> {
        if col >= COLS {
            return Err(MoveError::InvalidColumn);
        }

        if self.is_column_full(col) {
            return Err(MoveError::ColumnFull);
        }

        // Find the lowest empty row in this column
        let row = (0..ROWS)
            .rev()
            .find(|&row| self.cells[row][col] == Cell::Empty)
            .ok_or(MoveError::ColumnFull)?;
        self.cells[row][col] = cell;
        Ok(row)
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| self.is_column_full(col))
    }

    pub fn piece_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell != Cell::Empty)
            .count()
    }

    /// First four-in-a-row belonging to `cell`.
    ///
    /// Cells are visited row-major; from each one the directions are tried in
    /// [`DIRECTIONS`] order, walking up to three further steps and stopping
    /// at the board edge or at a cell not owned by `cell`.
    pub fn find_winning_line(&self, cell: Cell) -> Option<WinningLine> {
        if cell == Cell::Empty {
            return None;
        }

        for row in 0..ROWS {
            for col in 0..COLS {
                if self.cells[row][col] != cell {
                    continue;
                }
                for &(dr, dc) in &DIRECTIONS {
                    if let Some(line) = self.walk_line(row, col, dr, dc, cell) {
                        return Some(line);
                    }
                }
            }
        }

        None
    }

    fn walk_line(
        &self,
        row: usize,
        col: usize,
        dr: isize,
        dc: isize,
        cell: Cell,
    ) -> Option<WinningLine> {
        let mut line = [(row, col); CONNECT];
        let (mut r, mut c) = (row as isize, col as isize);

        for slot in line.iter_mut().skip(1) {
            r += dr;
            c += dc;
            if r < 0 || c < 0 || r >= ROWS as isize || c >= COLS as isize {
                return None;
            }
            let (ur, uc) = (r as usize, c as usize);
            if self.cells[ur][uc] != cell {
                return None;
            }
            *slot = (ur, uc);
        }

        Some(line)
    }

    /// Every empty cell sits above no piece and below nothing but empties.
    pub fn satisfies_gravity(&self) -> bool {
        (0..COLS).all(|col| {
            (0..ROWS - 1).all(|row| {
                self.cells[row][col] == Cell::Empty || self.cells[row + 1][col] != Cell::Empty
            })
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        for row in 0..ROWS {
            for col in 0..COLS {
                assert_eq!(board.get(row, col), Cell::Empty);
            }
        }
        assert_eq!(board.piece_count(), 0);
    }

    #[test]
    fn test_drop_piece() {
        let mut board = Board::new();

        // Drop first piece in column 3
        let row = board.drop_piece(3, Cell::PlayerOne).unwrap();
        assert_eq!(row, 5); // Should land at bottom
        assert_eq!(board.get(5, 3), Cell::PlayerOne);

        // Drop second piece in same column
        let row = board.drop_piece(3, Cell::PlayerTwo).unwrap();
        assert_eq!(row, 4); // Should land on top of first piece
        assert_eq!(board.get(4, 3), Cell::PlayerTwo);
    }

    #[test]
    fn test_column_full_leaves_board_unchanged() {
        let mut board = Board::new();

        for _ in 0..ROWS {
            board.drop_piece(0, Cell::PlayerOne).unwrap();
        }
        let before = board;

        assert!(board.is_column_full(0));
        assert_eq!(
            board.drop_piece(0, Cell::PlayerTwo),
            Err(MoveError::ColumnFull)
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_invalid_column() {
        let mut board = Board::new();
        assert_eq!(
            board.drop_piece(7, Cell::PlayerOne),
            Err(MoveError::InvalidColumn)
        );
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_legal_columns_ascending() {
        let mut board = Board::new();
        assert_eq!(board.legal_columns(), vec![0, 1, 2, 3, 4, 5, 6]);

        for _ in 0..ROWS {
            board.drop_piece(2, Cell::PlayerOne).unwrap();
            board.drop_piece(5, Cell::PlayerTwo).unwrap();
        }
        assert_eq!(board.legal_columns(), vec![0, 1, 3, 4, 6]);
    }

    #[test]
    fn test_full_board() {
        let mut board = Board::new();
        for col in 0..COLS {
            for _ in 0..ROWS {
                assert!(!board.is_full());
                board.drop_piece(col, Cell::PlayerOne).unwrap();
            }
        }
        assert!(board.is_full());
        assert!(board.legal_columns().is_empty());
    }

    #[test]
    fn test_vertical_line_coordinates() {
        let mut board = Board::new();
        for _ in 0..4 {
            board.drop_piece(3, Cell::PlayerOne).unwrap();
        }
        assert_eq!(
            board.find_winning_line(Cell::PlayerOne),
            Some([(2, 3), (3, 3), (4, 3), (5, 3)])
        );
        assert_eq!(board.find_winning_line(Cell::PlayerTwo), None);
    }

    #[test]
    fn test_horizontal_line_coordinates() {
        let mut board = Board::new();
        for col in 0..4 {
            board.drop_piece(col, Cell::PlayerOne).unwrap();
        }
        assert_eq!(
            board.find_winning_line(Cell::PlayerOne),
            Some([(5, 0), (5, 1), (5, 2), (5, 3)])
        );
    }

    #[test]
    fn test_diagonal_up_line() {
        let mut board = Board::new();
        // Create diagonal / pattern
        board.drop_piece(0, Cell::PlayerOne).unwrap();

        board.drop_piece(1, Cell::PlayerTwo).unwrap();
        board.drop_piece(1, Cell::PlayerOne).unwrap();

        board.drop_piece(2, Cell::PlayerTwo).unwrap();
        board.drop_piece(2, Cell::PlayerTwo).unwrap();
        board.drop_piece(2, Cell::PlayerOne).unwrap();

        board.drop_piece(3, Cell::PlayerTwo).unwrap();
        board.drop_piece(3, Cell::PlayerTwo).unwrap();
        board.drop_piece(3, Cell::PlayerTwo).unwrap();
        board.drop_piece(3, Cell::PlayerOne).unwrap();

        // Found from the top cell walking down-left
        assert_eq!(
            board.find_winning_line(Cell::PlayerOne),
            Some([(2, 3), (3, 2), (4, 1), (5, 0)])
        );
    }

    #[test]
    fn test_diagonal_down_line() {
        let mut board = Board::new();
        // Create diagonal \ pattern
        board.drop_piece(6, Cell::PlayerOne).unwrap();

        board.drop_piece(5, Cell::PlayerTwo).unwrap();
        board.drop_piece(5, Cell::PlayerOne).unwrap();

        board.drop_piece(4, Cell::PlayerTwo).unwrap();
        board.drop_piece(4, Cell::PlayerTwo).unwrap();
        board.drop_piece(4, Cell::PlayerOne).unwrap();

        board.drop_piece(3, Cell::PlayerTwo).unwrap();
        board.drop_piece(3, Cell::PlayerTwo).unwrap();
        board.drop_piece(3, Cell::PlayerTwo).unwrap();
        board.drop_piece(3, Cell::PlayerOne).unwrap();

        assert_eq!(
            board.find_winning_line(Cell::PlayerOne),
            Some([(2, 3), (3, 4), (4, 5), (5, 6)])
        );
    }

    #[test]
    fn test_no_win_with_three() {
        let mut board = Board::new();
        for col in 0..3 {
            board.drop_piece(col, Cell::PlayerOne).unwrap();
        }
        assert_eq!(board.find_winning_line(Cell::PlayerOne), None);
    }

    #[test]
    fn test_five_in_a_row_reports_leftmost_four() {
        let mut board = Board::new();
        for col in 1..6 {
            board.drop_piece(col, Cell::PlayerTwo).unwrap();
        }
        assert_eq!(
            board.find_winning_line(Cell::PlayerTwo),
            Some([(5, 1), (5, 2), (5, 3), (5, 4)])
        );
    }

    #[test]
    fn test_empty_cell_never_wins() {
        assert_eq!(Board::new().find_winning_line(Cell::Empty), None);
    }

    #[test]
    fn test_grid_roundtrip_and_values() {
        let mut board = Board::new();
        board.drop_piece(0, Cell::PlayerOne).unwrap();
        board.drop_piece(0, Cell::PlayerTwo).unwrap();

        let grid = board.to_grid();
        assert_eq!(grid[5][0], 1);
        assert_eq!(grid[4][0], -1);
        assert_eq!(grid[0][0], 0);
        assert_eq!(Board::from_grid(&grid).unwrap(), board);
    }

    #[test]
    fn test_from_grid_rejects_bad_values() {
        let mut grid = [[0i8; COLS]; ROWS];
        grid[5][2] = 2;
        assert_eq!(
            Board::from_grid(&grid),
            Err(GridError::InvalidCell {
                row: 5,
                col: 2,
                value: 2
            })
        );
    }

    #[test]
    fn test_from_grid_rejects_floating_piece() {
        let mut grid = [[0i8; COLS]; ROWS];
        grid[3][4] = 1;
        assert_eq!(
            Board::from_grid(&grid),
            Err(GridError::FloatingPiece { row: 3, col: 4 })
        );
    }

    #[test]
    fn test_gravity_holds_after_every_drop() {
        let mut board = Board::new();
        let sequence = [3, 3, 2, 4, 6, 0, 0, 1, 5, 3, 3, 3, 3, 6, 6];
        for (i, &col) in sequence.iter().enumerate() {
            let cell = if i % 2 == 0 { Cell::PlayerOne } else { Cell::PlayerTwo };
            let _ = board.drop_piece(col, cell);
            assert!(board.satisfies_gravity());
        }
    }

    #[test]
    fn test_random_games_keep_board_invariants() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        for seed in 0..200u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut board = Board::new();
            let mut cell = Cell::PlayerOne;

            // Play until the board fills up, ignoring wins
            while !board.legal_columns().is_empty() {
                let legal = board.legal_columns();
                let col = legal[rng.random_range(0..legal.len())];
                let before = board.piece_count();
                let row = board.drop_piece(col, cell).unwrap();

                assert_eq!(board.get(row, col), cell);
                assert_eq!(board.piece_count(), before + 1);
                assert!(board.satisfies_gravity(), "seed {seed}: floating piece");
                assert_eq!(
                    board.legal_columns().is_empty(),
                    board.is_full(),
                    "seed {seed}"
                );
                cell = if cell == Cell::PlayerOne {
                    Cell::PlayerTwo
                } else {
                    Cell::PlayerOne
                };
            }
            assert!(board.is_full());
            assert_eq!(board.piece_count(), ROWS * COLS);
        }
    }

    #[test]
    fn test_errors_convert_to_anyhow() {
        let err: anyhow::Error = GridError::FloatingPiece { row: 3, col: 4 }.into();
        assert_eq!(
            err.to_string(),
            "piece at row 3, column 4 has nothing below it"
        );
        let err: anyhow::Error = MoveError::ColumnFull.into();
        assert_eq!(err.to_string(), "column is full");
    }
}
