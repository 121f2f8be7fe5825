//! Undo/redo configuration
//!
//! Read from a flat TOML document kept next to the editor preferences.
//! Missing keys fall back to [`UndoConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Undo/redo settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndoConfig {
    /// Maximum number of undoable entries; the oldest are evicted first
    pub max_history: usize,
    /// Whether snapshots include descendants when the caller does not say
    pub record_hierarchy: bool,
    /// Deepest subtree a snapshot may decode to
    pub max_snapshot_depth: usize,
    /// Largest snapshot payload accepted by the decoder, in bytes
    pub max_snapshot_bytes: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_history: 100,
            record_hierarchy: false,
            max_snapshot_depth: 1024,
            max_snapshot_bytes: 64 * 1024 * 1024,
        }
    }
}

impl UndoConfig {
    /// Parse from a TOML string.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded undo configuration from {:?}", path);
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history == 0 {
            return Err(ConfigError::Invalid {
                key: "max_history",
                reason: "must be at least 1".into(),
            });
        }
        if self.max_snapshot_depth == 0 {
            return Err(ConfigError::Invalid {
                key: "max_snapshot_depth",
                reason: "must be at least 1".into(),
            });
        }
        if self.max_snapshot_bytes > u32::MAX as usize {
            return Err(ConfigError::Invalid {
                key: "max_snapshot_bytes",
                reason: format!("cannot exceed {}", u32::MAX),
            });
        }
        Ok(())
    }
}
