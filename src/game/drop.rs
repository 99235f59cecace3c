//! Gravity animation for a single piece.
//!
//! A drop is an owned [`DropAnimation`] value stepped by an explicit
//! [`DropSequencer::tick`]. The scheduler driving the ticks only ever holds a
//! [`DropHandle`], which it can compare against [`DropSequencer::handle`] to
//! tell a stale timer from the live one.

use tracing::debug;

use crate::error::GameError;

use super::{Board, Player};

/// Opaque identifier of one in-flight drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DropHandle(u64);

/// Where a finished drop came to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    pub row: usize,
    pub col: usize,
    pub player: Player,
}

/// Result of advancing a drop by one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTick {
    /// The piece is still falling; the board shows it at its current row.
    Falling(Board),
    /// The piece has landed; the board is final.
    Landed { board: Board, landing: Landing },
}

#[derive(Debug, Clone, Copy)]
struct DropAnimation {
    handle: DropHandle,
    col: usize,
    player: Player,
    /// `None` while the piece is still above row 0.
    current_row: Option<usize>,
    landing_row: usize,
    origin: Board,
}

/// Runs at most one drop at a time.
#[derive(Debug, Default)]
pub struct DropSequencer {
    animation: Option<DropAnimation>,
    next_handle: u64,
}

impl DropSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start dropping `player`'s piece into `col`.
    ///
    /// Returns `None` without touching any state if a drop is already in
    /// flight or the column cannot take a piece.
    pub fn begin(&mut self, board: &Board, col: usize, player: Player) -> Option<DropHandle> {
        if self.animation.is_some() || !board.is_valid_move(col) {
            return None;
        }
        let landing_row = board.landing_row(col)?;

        let handle = DropHandle(self.next_handle);
        self.next_handle += 1;
        self.animation = Some(DropAnimation {
            handle,
            col,
            player,
            current_row: None,
            landing_row,
            origin: *board,
        });
        debug!(col, landing_row, player = player.color(), "drop started");
        Some(handle)
    }

    /// Move the falling piece down one row.
    pub fn tick(&mut self) -> Result<DropTick, GameError> {
        let anim = self.animation.as_mut().ok_or(GameError::NoDropInFlight)?;
        let row = anim.current_row.map_or(0, |r| r + 1);
        anim.current_row = Some(row);

        // Every snapshot starts from the pre-drop board, so the cell the piece
        // just left is empty again.
        let board = anim.origin.place_piece(row, anim.col, anim.player)?;
        if row < anim.landing_row {
            return Ok(DropTick::Falling(board));
        }

        let landing = Landing {
            row,
            col: anim.col,
            player: anim.player,
        };
        self.animation = None;
        debug!(row, col = landing.col, "drop landed");
        Ok(DropTick::Landed { board, landing })
    }

    /// Abandon the in-flight drop, if any. Nothing is committed.
    pub fn cancel(&mut self) -> bool {
        self.animation.take().is_some()
    }

    pub fn handle(&self) -> Option<DropHandle> {
        self.animation.map(|anim| anim.handle)
    }

    pub fn is_in_flight(&self) -> bool {
        self.animation.is_some()
    }
}
