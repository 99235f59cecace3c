use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent};
use ratatui::{backend::Backend, Terminal};
use tracing::error;

use crate::ai::MinimaxAgent;
use crate::config::AppConfig;
use crate::error::GameError;
use crate::game::{DropHandle, GameController, MoveOutcome, Player, PlayerKind, COLS};

/// Idle poll period when no piece is falling.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Timer for the drop currently in flight.
#[derive(Debug, Clone, Copy)]
struct Ticker {
    handle: DropHandle,
    due: Instant,
}

pub struct App {
    controller: GameController,
    selected_column: usize,
    should_quit: bool,
    message: Option<String>,
    tick_interval: Duration,
    ticker: Option<Ticker>,
}

impl App {
    pub fn new(config: &AppConfig) -> Result<Self, GameError> {
        let agent = MinimaxAgent::new(config.ai.search_depth);
        let mut controller = GameController::with_agent(Box::new(agent));
        if let Some(player) = config.game.computer {
            controller.set_automated(player)?;
        }

        Ok(App {
            controller,
            selected_column: COLS / 2, // Start in middle
            should_quit: false,
            message: None,
            tick_interval: Duration::from_millis(config.animation.tick_interval_ms),
            ticker: None,
        })
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()>
    where
        B::Error: Into<io::Error>,
    {
        loop {
            terminal.draw(|f| self.render(f)).map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

            if self.should_quit {
                break;
            }

            self.handle_events()?;
            self.drive_drop(Instant::now());
        }
        Ok(())
    }

    /// Handle keyboard events, waiting at most until the next drop tick is due
    fn handle_events(&mut self) -> io::Result<()> {
        let timeout = match self.ticker {
            Some(ticker) => ticker.due.saturating_duration_since(Instant::now()),
            None => IDLE_POLL,
        };
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    /// Handle key press
    fn handle_key(&mut self, key: KeyEvent) {
        // Clear message on any key press
        self.message = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                }
            }
            KeyCode::Right => {
                if self.selected_column < COLS - 1 {
                    self.selected_column += 1;
                }
            }
            KeyCode::Char(c @ '1'..='7') => {
                self.selected_column = c as usize - '1' as usize;
                self.drop_piece();
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.drop_piece();
            }
            KeyCode::Char('c') => {
                self.hand_over_to_computer();
            }
            KeyCode::Char('r') => {
                self.controller.reset_game();
                self.ticker = None;
                self.selected_column = COLS / 2;
                self.message = Some("New game started! Press C to play the computer.".to_string());
            }
            _ => {}
        }
    }

    /// Drop piece in selected column
    fn drop_piece(&mut self) {
        if let MoveOutcome::Rejected = self.controller.request_move(self.selected_column) {
            if !self.controller.board().is_valid_move(self.selected_column) {
                self.message = Some("Column is full!".to_string());
            }
        }
    }

    fn hand_over_to_computer(&mut self) {
        let player = Player::FIRST.other();
        if self.controller.kind(player) == PlayerKind::Automated {
            return;
        }
        match self.controller.set_automated(player) {
            Ok(()) => self.message = Some(format!("The computer now plays {}.", player.color())),
            Err(e) => self.report(e),
        }
    }

    /// Keep the drop timer in step with the controller and tick when due.
    fn drive_drop(&mut self, now: Instant) {
        self.sync_ticker(now);
        let Some(ticker) = self.ticker else {
            return;
        };
        if ticker.due > now {
            return;
        }

        if let Err(e) = self.controller.tick() {
            self.report(e);
        }
        self.ticker = Some(Ticker {
            due: now + self.tick_interval,
            ..ticker
        });
        self.sync_ticker(now);
    }

    /// Start a timer for a new drop, or drop a timer whose drop is gone.
    fn sync_ticker(&mut self, now: Instant) {
        self.ticker = match (self.controller.drop_handle(), self.ticker) {
            (Some(handle), Some(ticker)) if ticker.handle == handle => Some(ticker),
            (Some(handle), _) => Some(Ticker {
                handle,
                due: now + self.tick_interval,
            }),
            (None, _) => None,
        };
    }

    fn report(&mut self, e: GameError) {
        error!(error = %e, "game error");
        self.message = Some(format!("Error: {e}"));
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        super::game_view::render(
            frame,
            &self.controller,
            self.selected_column,
            &self.message,
        );
    }
}
