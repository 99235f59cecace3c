use std::path::{Path, PathBuf};

use crate::ai::DEFAULT_DEPTH;
use crate::error::ConfigError;
use crate::game::{Player, COLS, ROWS};

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ai: AiConfig,
    pub animation: AnimationConfig,
    pub game: GameConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Search horizon of the computer opponent, in plies.
    pub search_depth: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            search_depth: DEFAULT_DEPTH,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Time between two rows of a falling piece.
    pub tick_interval_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            tick_interval_ms: 20,
        }
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Player handed to the computer when the app starts. A reset returns both
    /// slots to human control.
    pub computer: Option<Player>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
    /// Log destination. The terminal belongs to the UI, so logs go to a file.
    pub file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: "info".into(),
            file: PathBuf::from("drop_four.log"),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            eprintln!("Warning: config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ai.search_depth == 0 {
            return Err(ConfigError::Validation(
                "ai.search_depth must be >= 1".into(),
            ));
        }
        if self.ai.search_depth > ROWS * COLS {
            return Err(ConfigError::Validation(format!(
                "ai.search_depth must be <= {}",
                ROWS * COLS
            )));
        }
        if self.animation.tick_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "animation.tick_interval_ms must be > 0".into(),
            ));
        }
        if self.log.filter.trim().is_empty() {
            return Err(ConfigError::Validation(
                "log.filter must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&AppConfig::default())
    }
}
