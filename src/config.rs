use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ui::theme::ColorConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub view: ViewConfig,

    #[serde(default)]
    pub colors: ColorConfig,
}

/// Tree view behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Indentation cells per tree depth level
    #[serde(default = "default_indent_unit")]
    pub indent_unit: u16,

    /// Whether expand/collapse input is accepted; false gives a browse-only
    /// view
    #[serde(default = "default_true")]
    pub interactive: bool,

    /// Whether mouse input is captured at all
    #[serde(default = "default_true")]
    pub mouse: bool,

    /// Display width values are elided to before rendering
    #[serde(default = "default_value_width")]
    pub value_width: usize,

    /// Whether string values containing JSON documents become expandable
    #[serde(default = "default_true")]
    pub parse_embedded: bool,
}

fn default_indent_unit() -> u16 {
    2
}

fn default_true() -> bool {
    true
}

fn default_value_width() -> usize {
    60
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            indent_unit: default_indent_unit(),
            interactive: true,
            mouse: true,
            value_width: default_value_width(),
            parse_embedded: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(String),

    #[error("config parse error: {0}")]
    Parse(String),

    #[error("config serialize error: {0}")]
    Serialize(String),
}

impl Config {
    pub const FILENAME: &'static str = "config.json";

    /// The user config file path, `~/.config/treescope/config.json` or the
    /// platform equivalent. `None` when no config directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("treescope").join(Self::FILENAME))
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
    }

    /// Load from an explicit path, or the default location, falling back to
    /// defaults when nothing is found or a file fails to load.
    pub fn load(explicit: Option<&Path>) -> Self {
        let candidate = explicit
            .map(Path::to_path_buf)
            .or_else(Self::default_path);
        let Some(path) = candidate else {
            return Self::default();
        };
        if !path.exists() {
            tracing::debug!("no config file at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from_file(&path) {
            Ok(config) => {
                tracing::info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!(
                    "failed to load config from {}: {}, using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Io(format!("{}: {}", parent.display(), e)))?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }
}
