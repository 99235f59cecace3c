use crate::error::GameError;
use crate::game::{Board, Player};

/// Interface for anything that can choose a column for an automated player.
pub trait Agent: Send {
    /// Select a column for `player` to drop into on `board`.
    ///
    /// Callers only ask on positions where the game is still in progress.
    fn select_action(&mut self, board: &Board, player: Player) -> Result<usize, GameError>;

    /// Return the agent's display name.
    fn name(&self) -> &str;
}
