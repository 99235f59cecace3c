use crate::error::GameError;

use super::Player;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Player),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

/// A 6x7 grid. Row 0 is the top, row 5 is the bottom.
///
/// Every operation returns a new board; a board is never edited in place once
/// handed out, so snapshots held by the renderer or the search stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Create a new empty board
    pub fn empty() -> Self {
        Board {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Get the cell at a specific position
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// A column accepts a piece while its top cell is empty
    pub fn is_valid_move(&self, col: usize) -> bool {
        col < COLS && self.cells[0][col].is_empty()
    }

    /// Row a piece dropped into `col` would come to rest in
    pub fn landing_row(&self, col: usize) -> Option<usize> {
        if col >= COLS {
            return None;
        }
        (0..ROWS).rev().find(|&row| self.cells[row][col].is_empty())
    }

    /// Return a copy of the board with `player` in the given cell
    pub fn place_piece(&self, row: usize, col: usize, player: Player) -> Result<Board, GameError> {
        if row >= ROWS || col >= COLS {
            return Err(GameError::OutOfBounds { row, col });
        }
        if !self.cells[row][col].is_empty() {
            return Err(GameError::CellOccupied { row, col });
        }

        let mut next = *self;
        next.cells[row][col] = player.to_cell();
        Ok(next)
    }

    /// Drop a piece into a column, returning the new board and the landing row
    pub fn drop_piece(&self, col: usize, player: Player) -> Result<(Board, usize), GameError> {
        if col >= COLS {
            return Err(GameError::OutOfBounds { row: 0, col });
        }
        let row = self.landing_row(col).ok_or(GameError::ColumnFull(col))?;
        Ok((self.place_piece(row, col, player)?, row))
    }

    /// Columns that still accept a piece, in ascending order
    pub fn valid_columns(&self) -> Vec<usize> {
        (0..COLS).filter(|&col| self.is_valid_move(col)).collect()
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        self.valid_columns().is_empty()
    }

    /// Build a board from six strings, top row first: `.` empty, `R` red, `B` blue.
    #[cfg(test)]
    pub(crate) fn from_rows(rows: [&str; ROWS]) -> Board {
        let mut board = Board::empty();
        for (row, line) in rows.iter().enumerate() {
            assert_eq!(line.len(), COLS, "row {row} must have {COLS} cells");
            for (col, ch) in line.chars().enumerate() {
                board.cells[row][col] = match ch {
                    '.' => Cell::Empty,
                    'R' => Cell::Occupied(Player::Red),
                    'B' => Cell::Occupied(Player::Blue),
                    other => panic!("unexpected cell character {other:?}"),
                };
            }
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}
