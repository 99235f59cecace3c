//! Core Connect Four game logic: board, players, win detection, the drop
//! animation, and the controller that ties them into one session.

mod board;
mod controller;
mod drop;
mod player;
mod win;

pub use board::{Board, Cell, COLS, ROWS};
pub use controller::{GameController, GamePhase, GameResult, MoveOutcome, Status};
pub use drop::{DropHandle, DropSequencer, DropTick, Landing};
pub use player::{Player, PlayerKind};
pub use win::{any_win_exists, check_win_from};

#[cfg(test)]
pub(crate) use board::tests::drawn_board;
