use super::{Board, Player, COLS, ROWS};

/// Horizontal, vertical, diagonal down-right, diagonal down-left.
const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Number of contiguous `player` cells starting one step away from the anchor.
fn run_length(board: &Board, row: usize, col: usize, dr: isize, dc: isize, player: Player) -> usize {
    let cell = player.to_cell();
    let mut count = 0;
    let mut r = row as isize + dr;
    let mut c = col as isize + dc;
    while (0..ROWS as isize).contains(&r)
        && (0..COLS as isize).contains(&c)
        && board.get(r as usize, c as usize) == cell
    {
        count += 1;
        r += dr;
        c += dc;
    }
    count
}

/// Check whether the piece at (row, col) is part of four or more in a row
/// for `player`, along any axis through that cell.
pub fn check_win_from(board: &Board, row: usize, col: usize, player: Player) -> bool {
    if row >= ROWS || col >= COLS || board.get(row, col) != player.to_cell() {
        return false;
    }

    AXES.iter().any(|&(dr, dc)| {
        let forward = run_length(board, row, col, dr, dc, player);
        let backward = run_length(board, row, col, -dr, -dc, player);
        forward + backward + 1 >= 4
    })
}

/// Check every cell of the board as a potential anchor for a win by `player`.
pub fn any_win_exists(board: &Board, player: Player) -> bool {
    (0..ROWS).any(|row| (0..COLS).any(|col| check_win_from(board, row, col, player)))
}
