use std::path::PathBuf;

/// Invariant violations inside the game core.
///
/// Routine rejections (a full column, a click while a piece is falling) are not
/// errors and never show up here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },

    #[error("cell ({row}, {col}) is already occupied")]
    CellOccupied { row: usize, col: usize },

    #[error("column {0} is full")]
    ColumnFull(usize),

    #[error("tick requested with no drop in flight")]
    NoDropInFlight,

    #[error("search requested on a finished position")]
    TerminalPosition,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
