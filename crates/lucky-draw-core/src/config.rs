// Configuration loading and validation (config/draw.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::session::{MAX_PARTICIPANTS, MAX_WINNERS, MIN_PARTICIPANTS, MIN_WINNERS};

/// File name of the draw configuration inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "draw.toml";

const MAX_ROWS: usize = 12;
const MAX_FPS: u32 = 120;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// draw.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub draw: DrawConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Initial counts for a new session.
#[derive(Debug, Clone, Deserialize)]
pub struct DrawConfig {
    pub participant_count: usize,
    pub winner_count: usize,
}

/// Presentation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Number of scrolling avatar rows.
    #[serde(default = "default_rows")]
    pub rows: usize,
    /// Winners listed in the reveal overlay before the rest are summarized.
    #[serde(default = "default_max_revealed")]
    pub max_revealed: usize,
    /// Render ticks per second.
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            rows: default_rows(),
            max_revealed: default_max_revealed(),
            fps: default_fps(),
        }
    }
}

fn default_rows() -> usize {
    6
}

fn default_max_revealed() -> usize {
    50
}

fn default_fps() -> u32 {
    30
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/draw.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()` for normal startup.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files and
/// never overwrites an existing file.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let draw = &config.draw;
    if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&draw.participant_count) {
        return Err(ConfigError::ValidationError {
            field: "draw.participant_count".into(),
            message: format!(
                "must be between {MIN_PARTICIPANTS} and {MAX_PARTICIPANTS}, got {}",
                draw.participant_count
            ),
        });
    }

    if !(MIN_WINNERS..=MAX_WINNERS).contains(&draw.winner_count) {
        return Err(ConfigError::ValidationError {
            field: "draw.winner_count".into(),
            message: format!(
                "must be between {MIN_WINNERS} and {MAX_WINNERS}, got {}",
                draw.winner_count
            ),
        });
    }

    if draw.winner_count > draw.participant_count {
        return Err(ConfigError::ValidationError {
            field: "draw.winner_count".into(),
            message: format!(
                "must not exceed participant_count ({}), got {}",
                draw.participant_count, draw.winner_count
            ),
        });
    }

    let display = &config.display;
    if !(1..=MAX_ROWS).contains(&display.rows) {
        return Err(ConfigError::ValidationError {
            field: "display.rows".into(),
            message: format!("must be between 1 and {MAX_ROWS}, got {}", display.rows),
        });
    }

    if display.max_revealed == 0 {
        return Err(ConfigError::ValidationError {
            field: "display.max_revealed".into(),
            message: "must be > 0".into(),
        });
    }

    if !(1..=MAX_FPS).contains(&display.fps) {
        return Err(ConfigError::ValidationError {
            field: "display.fps".into(),
            message: format!("must be between 1 and {MAX_FPS}, got {}", display.fps),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
