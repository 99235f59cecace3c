//! # Drop Four
//!
//! A Connect Four engine: gravity-animated piece drops, win and draw
//! detection, and a minimax computer opponent with alpha-beta pruning.
//! Ships with a terminal UI built with Ratatui.
//!
//! ## Modules
//!
//! - [`game`] — Board model, win detection, drop animation, game controller
//! - [`ai`] — Agent trait, window heuristic, minimax search
//! - [`ui`] — Terminal UI driving the controller and its drop ticks
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod ui;
