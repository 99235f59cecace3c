mod agent;
mod heuristic;
mod minimax;

pub use agent::Agent;
pub use heuristic::{evaluate_board, evaluate_window, Heuristic, WindowHeuristic};
pub use minimax::{get_best_move, is_terminal, minimax, MinimaxAgent, DEFAULT_DEPTH, WIN_SCORE};
