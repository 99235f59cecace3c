use tracing::{debug, instrument, warn};

use crate::error::GameError;
use crate::game::{any_win_exists, check_win_from, Board, Player};

use super::agent::Agent;
use super::heuristic::{Heuristic, WindowHeuristic};

/// Score of a won position, seen from the winner's side.
pub const WIN_SCORE: i64 = 100_000_000;

/// Default search horizon in plies.
pub const DEFAULT_DEPTH: usize = 6;

/// A position is terminal once either side has four in a row or the board is full.
pub fn is_terminal(board: &Board) -> bool {
    board.is_full() || any_win_exists(board, Player::Red) || any_win_exists(board, Player::Blue)
}

/// Depth-limited minimax with alpha-beta pruning, scored from `perspective`'s
/// side on every ply.
///
/// Won and lost leaves score exactly `±WIN_SCORE` whatever the remaining depth.
/// Columns are tried in ascending order and only a strictly better score
/// replaces the current best, so ties go to the leftmost column.
///
/// A failed placement on a column reported as valid aborts the whole search.
pub fn minimax(
    board: &Board,
    depth: usize,
    alpha: i64,
    beta: i64,
    maximizing: bool,
    perspective: Player,
) -> Result<(i64, Option<usize>), GameError> {
    minimax_with(&WindowHeuristic, board, depth, alpha, beta, maximizing, perspective)
}

fn minimax_with(
    heuristic: &dyn Heuristic,
    board: &Board,
    depth: usize,
    mut alpha: i64,
    mut beta: i64,
    maximizing: bool,
    perspective: Player,
) -> Result<(i64, Option<usize>), GameError> {
    if any_win_exists(board, perspective) {
        return Ok((WIN_SCORE, None));
    }
    if any_win_exists(board, perspective.other()) {
        return Ok((-WIN_SCORE, None));
    }
    let columns = board.valid_columns();
    if columns.is_empty() {
        return Ok((0, None));
    }
    if depth == 0 {
        return Ok((heuristic.evaluate(board, perspective), None));
    }

    let mover = if maximizing { perspective } else { perspective.other() };
    let mut best_col = None;
    let mut best = if maximizing { i64::MIN } else { i64::MAX };

    for col in columns {
        let (child, _) = board.drop_piece(col, mover)?;
        let (score, _) = minimax_with(heuristic, &child, depth - 1, alpha, beta, !maximizing, perspective)?;

        if maximizing {
            if score > best {
                best = score;
                best_col = Some(col);
            }
            alpha = alpha.max(best);
        } else {
            if score < best {
                best = score;
                best_col = Some(col);
            }
            beta = beta.min(best);
        }
        if beta <= alpha {
            break;
        }
    }

    Ok((best, best_col))
}

/// First column where `player` completes four in a row.
fn winning_column(board: &Board, player: Player) -> Result<Option<usize>, GameError> {
    for col in board.valid_columns() {
        let (next, row) = board.drop_piece(col, player)?;
        if check_win_from(&next, row, col, player) {
            return Ok(Some(col));
        }
    }
    Ok(None)
}

/// Minimax agent with alpha-beta pruning.
pub struct MinimaxAgent {
    depth: usize,
    heuristic: Box<dyn Heuristic>,
}

impl MinimaxAgent {
    pub fn new(depth: usize) -> Self {
        MinimaxAgent {
            depth,
            heuristic: Box::new(WindowHeuristic),
        }
    }

    pub fn with_heuristic(depth: usize, heuristic: Box<dyn Heuristic>) -> Self {
        MinimaxAgent { depth, heuristic }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Best column for `player` on `board`.
    ///
    /// An immediate win is taken, then an immediate threat of the opponent is
    /// blocked. Only otherwise does the search run. Win scores are flat, so the
    /// search alone cannot tell a win now from a forced win later.
    #[instrument(level = "debug", skip(self, board), fields(depth = self.depth))]
    pub fn best_move(&self, board: &Board, player: Player) -> Result<usize, GameError> {
        if is_terminal(board) {
            return Err(GameError::TerminalPosition);
        }
        if let Some(col) = winning_column(board, player)? {
            debug!(col, "immediate win");
            return Ok(col);
        }
        if let Some(col) = winning_column(board, player.other())? {
            debug!(col, "blocking immediate threat");
            return Ok(col);
        }

        let (score, col) = minimax_with(
            self.heuristic.as_ref(),
            board,
            self.depth,
            i64::MIN,
            i64::MAX,
            true,
            player,
        )?;
        match col {
            Some(col) => {
                debug!(col, score, "search finished");
                Ok(col)
            }
            None => {
                let fallback = board
                    .valid_columns()
                    .first()
                    .copied()
                    .ok_or(GameError::TerminalPosition)?;
                warn!(fallback, "search returned no column, using first valid column");
                Ok(fallback)
            }
        }
    }
}

impl Default for MinimaxAgent {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

impl Agent for MinimaxAgent {
    fn select_action(&mut self, board: &Board, player: Player) -> Result<usize, GameError> {
        self.best_move(board, player)
    }

    fn name(&self) -> &str {
        "Minimax"
    }
}

/// Best column for `player` at the default search depth.
pub fn get_best_move(board: &Board, player: Player) -> Result<usize, GameError> {
    MinimaxAgent::default().best_move(board, player)
}
