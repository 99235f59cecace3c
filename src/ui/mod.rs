//! Terminal UI: renders the board and status line, maps keys to columns, and
//! drives the controller's drop ticks from the event loop.

mod app;
mod game_view;

pub use app::App;
