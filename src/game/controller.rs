use std::fmt;

use tracing::{debug, info, warn};

use crate::ai::{Agent, MinimaxAgent};
use crate::error::GameError;

use super::drop::{DropHandle, DropSequencer, DropTick, Landing};
use super::{check_win_from, Board, Player, PlayerKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    InProgress,
    Won(Player),
    Draw,
}

/// Where a session currently stands. `Finished` only ever holds `Won` or `Draw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Idle,
    Dropping,
    Finished(GameResult),
}

/// Whether a move request was taken up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum MoveOutcome {
    Accepted,
    Rejected,
}

/// What the presentation layer should tell the players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Turn(Player),
    AutomatedTurn(Player),
    AutomatedThinking(Player),
    Won { player: Player, automated: bool },
    Draw,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Status::Turn(p) => write!(f, "{}'s turn ({})", p.name(), p.color()),
            Status::AutomatedTurn(p) => write!(f, "Computer's turn ({})", p.color()),
            Status::AutomatedThinking(_) => write!(f, "Computer is thinking..."),
            Status::Won { automated: true, .. } => write!(f, "Computer wins!"),
            Status::Won { player, .. } => write!(f, "{} ({}) wins!", player.name(), player.color()),
            Status::Draw => write!(f, "It's a draw!"),
        }
    }
}

/// Owns the canonical board for one session and sequences every move through
/// the drop animation.
pub struct GameController {
    board: Board,
    phase: GamePhase,
    active: Player,
    kinds: [PlayerKind; 2],
    sequencer: DropSequencer,
    agent: Box<dyn Agent>,
}

impl GameController {
    pub fn new() -> Self {
        Self::with_agent(Box::new(MinimaxAgent::default()))
    }

    pub fn with_agent(agent: Box<dyn Agent>) -> Self {
        GameController {
            board: Board::empty(),
            phase: GamePhase::Idle,
            active: Player::FIRST,
            kinds: [PlayerKind::Human; 2],
            sequencer: DropSequencer::new(),
            agent,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn active_player(&self) -> Player {
        self.active
    }

    pub fn kind(&self, player: Player) -> PlayerKind {
        self.kinds[player.index()]
    }

    pub fn agent_name(&self) -> &str {
        self.agent.name()
    }

    pub fn result(&self) -> GameResult {
        match self.phase {
            GamePhase::Finished(result) => result,
            GamePhase::Idle | GamePhase::Dropping => GameResult::InProgress,
        }
    }

    /// Handle of the drop currently in flight, for the tick scheduler.
    pub fn drop_handle(&self) -> Option<DropHandle> {
        self.sequencer.handle()
    }

    /// A column chosen by a human player.
    ///
    /// Ignored while a piece is falling, after the game has ended, while the
    /// computer owns the active slot, or if the column is full.
    pub fn request_move(&mut self, col: usize) -> MoveOutcome {
        if self.kind(self.active) == PlayerKind::Automated {
            return MoveOutcome::Rejected;
        }
        self.start_drop(col)
    }

    fn start_drop(&mut self, col: usize) -> MoveOutcome {
        if self.phase != GamePhase::Idle {
            return MoveOutcome::Rejected;
        }
        match self.sequencer.begin(&self.board, col, self.active) {
            Some(_) => {
                self.phase = GamePhase::Dropping;
                MoveOutcome::Accepted
            }
            None => MoveOutcome::Rejected,
        }
    }

    /// Advance the falling piece by one row.
    ///
    /// Installs the new snapshot and, on landing, resolves the move. If the
    /// computer is next to play, its move is chosen and started before this
    /// returns.
    pub fn tick(&mut self) -> Result<GamePhase, GameError> {
        if self.phase != GamePhase::Dropping {
            return Err(GameError::NoDropInFlight);
        }
        match self.sequencer.tick()? {
            DropTick::Falling(board) => self.board = board,
            DropTick::Landed { board, landing } => {
                self.board = board;
                self.finish_drop(landing)?;
            }
        }
        Ok(self.phase)
    }

    fn finish_drop(&mut self, landing: Landing) -> Result<(), GameError> {
        let Landing { row, col, player } = landing;
        if check_win_from(&self.board, row, col, player) {
            self.phase = GamePhase::Finished(GameResult::Won(player));
            info!(winner = player.color(), "game won");
            return Ok(());
        }
        if self.board.is_full() {
            self.phase = GamePhase::Finished(GameResult::Draw);
            info!("game drawn");
            return Ok(());
        }

        self.active = player.other();
        self.phase = GamePhase::Idle;
        self.play_automated()
    }

    /// Let the agent move if it owns the active slot and the board is waiting.
    fn play_automated(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::Idle || self.kind(self.active) != PlayerKind::Automated {
            return Ok(());
        }

        let valid = self.board.valid_columns();
        let col = match self.agent.select_action(&self.board, self.active) {
            Ok(chosen) if valid.contains(&chosen) => Some(chosen),
            Ok(chosen) => {
                warn!(chosen, agent = self.agent.name(), "agent chose an unplayable column");
                None
            }
            Err(e) => {
                warn!(error = %e, agent = self.agent.name(), "agent failed to choose a column");
                None
            }
        };
        let col = match col.or_else(|| valid.first().copied()) {
            Some(col) => col,
            None => return Err(GameError::TerminalPosition),
        };

        debug!(col, player = self.active.color(), "computer move");
        match self.start_drop(col) {
            MoveOutcome::Accepted => Ok(()),
            MoveOutcome::Rejected => Err(GameError::ColumnFull(col)),
        }
    }

    /// Hand `player`'s slot to the computer. If it is already that player's
    /// turn and nothing is falling, the computer moves right away.
    pub fn set_automated(&mut self, player: Player) -> Result<(), GameError> {
        self.kinds[player.index()] = PlayerKind::Automated;
        info!(player = player.color(), agent = self.agent.name(), "computer takes over");
        self.play_automated()
    }

    /// Abandon the current game and start a fresh one between two humans.
    pub fn reset_game(&mut self) {
        if self.sequencer.cancel() {
            debug!("in-flight drop cancelled");
        }
        self.board = Board::empty();
        self.active = Player::FIRST;
        self.phase = GamePhase::Idle;
        self.kinds = [PlayerKind::Human; 2];
        info!("game reset");
    }

    pub fn status(&self) -> Status {
        let automated = |p: Player| self.kind(p) == PlayerKind::Automated;
        match self.phase {
            GamePhase::Finished(GameResult::Won(player)) => Status::Won {
                player,
                automated: automated(player),
            },
            GamePhase::Finished(_) => Status::Draw,
            GamePhase::Idle if automated(self.active) => Status::AutomatedThinking(self.active),
            GamePhase::Dropping if automated(self.active) => Status::AutomatedTurn(self.active),
            GamePhase::Idle | GamePhase::Dropping => Status::Turn(self.active),
        }
    }

    pub fn get_status(&self) -> String {
        self.status().to_string()
    }
}

impl Default for GameController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, COLS, ROWS};

    /// Always answers with the same column, playable or not.
    struct Stubborn(usize);

    impl Agent for Stubborn {
        fn select_action(&mut self, _board: &Board, _player: Player) -> Result<usize, GameError> {
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "Stubborn"
        }
    }

    /// Never produces a column.
    struct Failing;

    impl Agent for Failing {
        fn select_action(&mut self, _board: &Board, _player: Player) -> Result<usize, GameError> {
            Err(GameError::TerminalPosition)
        }

        fn name(&self) -> &str {
            "Failing"
        }
    }

    /// Tick until the current piece lands, returning the number of ticks.
    /// A computer reply started on landing is left falling.
    fn run_drop(game: &mut GameController) -> usize {
        let handle = game.drop_handle().expect("no drop in flight");
        let mut ticks = 0;
        while game.drop_handle() == Some(handle) {
            game.tick().unwrap();
            ticks += 1;
            assert!(ticks <= ROWS, "drop did not land within {ROWS} ticks");
        }
        ticks
    }

    fn play(game: &mut GameController, col: usize) {
        assert_eq!(game.request_move(col), MoveOutcome::Accepted, "column {col} rejected");
        run_drop(game);
    }

    #[test]
    fn test_initial_state() {
        let game = GameController::new();
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.active_player(), Player::Red);
        assert_eq!(game.result(), GameResult::InProgress);
        assert_eq!(game.get_status(), "Player 1's turn (red)");
        assert_eq!(game.agent_name(), "Minimax");
    }

    #[test]
    fn test_move_animates_then_passes_turn() {
        let mut game = GameController::new();
        assert_eq!(game.request_move(3), MoveOutcome::Accepted);
        assert_eq!(game.phase(), GamePhase::Dropping);
        assert!(game.drop_handle().is_some());

        game.tick().unwrap();
        assert_eq!(game.board().get(0, 3), Cell::Occupied(Player::Red));

        let ticks = run_drop(&mut game);
        assert_eq!(ticks, ROWS - 1);
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.board().get(5, 3), Cell::Occupied(Player::Red));
        assert_eq!(game.board().get(0, 3), Cell::Empty);
        assert_eq!(game.active_player(), Player::Blue);
        assert_eq!(game.get_status(), "Player 2's turn (blue)");
    }

    #[test]
    fn test_requests_rejected_while_dropping() {
        let mut game = GameController::new();
        assert_eq!(game.request_move(0), MoveOutcome::Accepted);
        assert_eq!(game.request_move(1), MoveOutcome::Rejected);
        game.tick().unwrap();
        assert_eq!(game.request_move(1), MoveOutcome::Rejected);
        run_drop(&mut game);
        assert_eq!(game.board().get(5, 1), Cell::Empty);
    }

    #[test]
    fn test_tick_without_drop_is_an_error() {
        let mut game = GameController::new();
        assert_eq!(game.tick(), Err(GameError::NoDropInFlight));
        assert_eq!(game.phase(), GamePhase::Idle);
    }

    #[test]
    fn test_full_column_request_is_noop() {
        let mut game = GameController::new();
        for _ in 0..ROWS {
            play(&mut game, 2);
        }
        let before = *game.board();
        let active = game.active_player();

        assert!(!game.board().is_valid_move(2));
        assert_eq!(game.request_move(2), MoveOutcome::Rejected);
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(*game.board(), before);
        assert_eq!(game.active_player(), active);
    }

    #[test]
    fn test_horizontal_win_finishes_game() {
        let mut game = GameController::new();
        for col in 0..3 {
            play(&mut game, col); // Red, bottom row
            play(&mut game, col); // Blue, row above
        }
        play(&mut game, 3);

        assert_eq!(game.phase(), GamePhase::Finished(GameResult::Won(Player::Red)));
        assert_eq!(game.result(), GameResult::Won(Player::Red));
        assert_eq!(game.get_status(), "Player 1 (red) wins!");
        assert_eq!(game.request_move(4), MoveOutcome::Rejected);
    }

    #[test]
    fn test_full_board_without_winner_is_a_draw() {
        let mut game = GameController::new();
        let mut sequence = vec![2];
        for col in [0, 1, 4, 5] {
            sequence.extend([col; ROWS]);
        }
        sequence.extend([2; ROWS - 1]);
        sequence.extend([3; ROWS]);
        sequence.extend([6; ROWS]);
        assert_eq!(sequence.len(), ROWS * COLS);

        for col in sequence {
            assert_eq!(game.result(), GameResult::InProgress);
            play(&mut game, col);
        }

        assert_eq!(*game.board(), crate::game::drawn_board());
        assert_eq!(game.phase(), GamePhase::Finished(GameResult::Draw));
        assert_eq!(game.get_status(), "It's a draw!");
    }

    #[test]
    fn test_reset_cancels_drop_and_clears_board() {
        let mut game = GameController::new();
        play(&mut game, 3);
        game.set_automated(Player::Red).unwrap();
        assert_eq!(game.request_move(4), MoveOutcome::Accepted);
        game.tick().unwrap();

        game.reset_game();
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.drop_handle(), None);
        assert_eq!(*game.board(), Board::empty());
        assert_eq!(game.active_player(), Player::Red);
        assert_eq!(game.kind(Player::Red), PlayerKind::Human);
        assert_eq!(game.tick(), Err(GameError::NoDropInFlight));
    }

    #[test]
    fn test_computer_answers_after_human_move() {
        let mut game = GameController::with_agent(Box::new(MinimaxAgent::new(2)));
        game.set_automated(Player::Blue).unwrap();
        assert_eq!(game.get_status(), "Player 1's turn (red)");

        play(&mut game, 3);
        // The human piece landed and the computer's piece is already falling.
        assert_eq!(game.phase(), GamePhase::Dropping);
        assert_eq!(game.active_player(), Player::Blue);
        assert_eq!(game.get_status(), "Computer's turn (blue)");
        assert_eq!(game.request_move(0), MoveOutcome::Rejected);

        run_drop(&mut game);
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.active_player(), Player::Red);
        let blue_pieces = (0..ROWS)
            .flat_map(|r| (0..COLS).map(move |c| (r, c)))
            .filter(|&(r, c)| game.board().get(r, c) == Cell::Occupied(Player::Blue))
            .count();
        assert_eq!(blue_pieces, 1);
    }

    #[test]
    fn test_computer_moves_immediately_when_given_active_slot() {
        let mut game = GameController::with_agent(Box::new(MinimaxAgent::new(2)));
        game.set_automated(Player::Red).unwrap();
        assert_eq!(game.phase(), GamePhase::Dropping);
        assert_eq!(game.get_status(), "Computer's turn (red)");
        assert_eq!(game.request_move(0), MoveOutcome::Rejected);
    }

    #[test]
    fn test_automation_during_drop_waits_for_landing() {
        let mut game = GameController::with_agent(Box::new(MinimaxAgent::new(2)));
        assert_eq!(game.request_move(0), MoveOutcome::Accepted);
        game.set_automated(Player::Blue).unwrap();
        run_drop(&mut game);
        // Blue's drop began on landing; finish it too.
        run_drop(&mut game);
        assert_eq!(game.active_player(), Player::Red);
        assert_eq!(game.status(), Status::Turn(Player::Red));
    }

    #[test]
    fn test_unplayable_agent_column_falls_back_to_first_valid() {
        let mut game = GameController::with_agent(Box::new(Stubborn(0)));
        for _ in 0..ROWS / 2 {
            play(&mut game, 0);
            play(&mut game, 0);
        }
        assert!(!game.board().is_valid_move(0));

        game.set_automated(Player::Red).unwrap();
        assert_eq!(game.phase(), GamePhase::Dropping);
        run_drop(&mut game);
        assert_eq!(game.board().get(5, 1), Cell::Occupied(Player::Red));
    }

    #[test]
    fn test_failing_agent_falls_back_to_first_valid() {
        let mut game = GameController::with_agent(Box::new(Failing));
        game.set_automated(Player::Blue).unwrap();

        assert_eq!(game.request_move(0), MoveOutcome::Accepted);
        run_drop(&mut game);

        // Blue's reply goes to the first valid column instead of stalling.
        assert_eq!(game.phase(), GamePhase::Dropping);
        assert_eq!(game.status(), Status::AutomatedTurn(Player::Blue));
        run_drop(&mut game);
        assert_eq!(game.board().get(ROWS - 2, 0), Cell::Occupied(Player::Blue));

        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.active_player(), Player::Red);
        assert_eq!(game.request_move(1), MoveOutcome::Accepted);
    }

    #[test]
    fn test_computer_win_reports_computer_wins() {
        let mut game = GameController::with_agent(Box::new(MinimaxAgent::new(2)));
        // Blue stacks on column 6 while red builds the bottom row.
        for col in 0..3 {
            play(&mut game, col);
            play(&mut game, 6);
        }
        game.set_automated(Player::Red).unwrap();
        run_drop(&mut game);
        assert_eq!(game.phase(), GamePhase::Finished(GameResult::Won(Player::Red)));
        assert_eq!(game.get_status(), "Computer wins!");
    }

    #[test]
    fn test_status_display_strings() {
        assert_eq!(Status::AutomatedThinking(Player::Blue).to_string(), "Computer is thinking...");
        assert_eq!(
            Status::Won {
                player: Player::Blue,
                automated: false
            }
            .to_string(),
            "Player 2 (blue) wins!"
        );
    }
}
