use crate::game::{Board, Cell, Player, COLS, ROWS};

/// Column whose pieces earn a positional bonus.
const CENTER_COL: usize = 3;
const CENTER_BONUS: i64 = 3;

/// Trait for evaluating a board position from a player's perspective.
pub trait Heuristic: Send {
    fn evaluate(&self, board: &Board, player: Player) -> i64;
}

/// Default heuristic: scores every 4-cell window plus a center-column bonus.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowHeuristic;

impl Heuristic for WindowHeuristic {
    fn evaluate(&self, board: &Board, player: Player) -> i64 {
        evaluate_board(board, player)
    }
}

/// Score a single 4-cell window for `player`.
///
/// Windows holding pieces of both players score 0.
pub fn evaluate_window(cells: [Cell; 4], player: Player) -> i64 {
    let own_cell = player.to_cell();
    let opp_cell = player.other().to_cell();
    let own = cells.iter().filter(|&&c| c == own_cell).count();
    let opp = cells.iter().filter(|&&c| c == opp_cell).count();
    let empty = cells.iter().filter(|c| c.is_empty()).count();

    match (own, opp, empty) {
        (4, _, _) => 100,
        (3, _, 1) => 10,
        (2, _, 2) => 2,
        (_, 3, 1) => -80,
        (_, 2, 2) => -5,
        _ => 0,
    }
}

/// Sum of [`evaluate_window`] over every horizontal, vertical and diagonal
/// window, plus a bonus for each of `player`'s pieces in the center column.
pub fn evaluate_board(board: &Board, player: Player) -> i64 {
    let mut score = 0;

    // Center column bonus
    for row in 0..ROWS {
        if board.get(row, CENTER_COL) == player.to_cell() {
            score += CENTER_BONUS;
        }
    }

    let window = |row: usize, col: usize, dr: isize, dc: isize| -> [Cell; 4] {
        std::array::from_fn(|i| {
            let r = row as isize + dr * i as isize;
            let c = col as isize + dc * i as isize;
            board.get(r as usize, c as usize)
        })
    };

    // Horizontal
    for row in 0..ROWS {
        for col in 0..COLS - 3 {
            score += evaluate_window(window(row, col, 0, 1), player);
        }
    }

    // Vertical
    for col in 0..COLS {
        for row in 0..ROWS - 3 {
            score += evaluate_window(window(row, col, 1, 0), player);
        }
    }

    // Diagonal (top-left to bottom-right)
    for row in 0..ROWS - 3 {
        for col in 0..COLS - 3 {
            score += evaluate_window(window(row, col, 1, 1), player);
        }
    }

    // Diagonal (bottom-left to top-right)
    for row in 3..ROWS {
        for col in 0..COLS - 3 {
            score += evaluate_window(window(row, col, -1, 1), player);
        }
    }

    score
}
