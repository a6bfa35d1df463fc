//! Board configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for a board session. Every field has a default, so `{}` is a
/// valid config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Maximum number of undo snapshots to keep; `null` keeps all of them.
    #[serde(default = "default_max_history")]
    pub max_history: Option<usize>,
    /// Offset applied to copied objects, in board units.
    #[serde(default = "default_copy_offset")]
    pub copy_offset: f64,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
}

fn default_max_history() -> Option<usize> {
    Some(50)
}

fn default_copy_offset() -> f64 {
    10.0
}

fn default_viewport_width() -> f64 {
    800.0
}

fn default_viewport_height() -> f64 {
    600.0
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            copy_offset: default_copy_offset(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

impl BoardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded board config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = BoardConfig::from_json("{}").unwrap();
        assert_eq!(config, BoardConfig::default());
        assert_eq!(config.max_history, Some(50));
    }

    #[test]
    fn test_null_history_is_unbounded() {
        let config = BoardConfig::from_json(r#"{"max_history": null, "copy_offset": 4.5}"#).unwrap();
        assert_eq!(config.max_history, None);
        assert_eq!(config.copy_offset, 4.5);
        assert_eq!(config.viewport_width, 800.0);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            BoardConfig::from_json("{\"copy_offset\": \"far\"}"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        std::fs::write(&path, r#"{"max_history": 5}"#).unwrap();

        let config = BoardConfig::load(&path).unwrap();
        assert_eq!(config.max_history, Some(5));

        assert!(matches!(
            BoardConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
