use crate::error::Result;
use crate::paths;
use crate::types::SelectionMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// SelectionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_mode")]
    pub mode: SelectionMode,
    /// Hard cap on presented subject choices (platform select-menu limit).
    #[serde(default = "default_max_options")]
    pub max_options: usize,
    /// Maximum companions accepted in a single two-step pick.
    #[serde(default = "default_companions_max")]
    pub companions_max: usize,
}

fn default_mode() -> SelectionMode {
    SelectionMode::TwoStep
}

fn default_max_options() -> usize {
    25
}

fn default_companions_max() -> usize {
    5
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            max_options: default_max_options(),
            companions_max: default_companions_max(),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sessions older than this are discarded on next access.
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: u32,
}

fn default_ttl_minutes() -> u32 {
    15
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_ttl_minutes(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load config from `.patrol/config.yaml`, falling back to defaults when
    /// the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.selection.mode, SelectionMode::TwoStep);
        assert_eq!(config.selection.max_options, 25);
        assert_eq!(config.selection.companions_max, 5);
        assert_eq!(config.session.ttl_minutes, 15);
    }

    #[test]
    fn config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.selection.mode = SelectionMode::Single;
        config.selection.max_options = 10;
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.selection.mode, SelectionMode::Single);
        assert_eq!(loaded.selection.max_options, 10);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".patrol")).unwrap();
        std::fs::write(
            dir.path().join(".patrol/config.yaml"),
            "selection:\n  mode: single\n",
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.selection.mode, SelectionMode::Single);
        assert_eq!(config.selection.max_options, 25);
        assert_eq!(config.session.ttl_minutes, 15);
    }
}
