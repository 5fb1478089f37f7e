//! Application configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use studydash_types::GridSize;

/// Current config format version
pub const CONFIG_VERSION: u32 = 1;

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_user_id() -> String {
    "local".to_string()
}

/// Application-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the config format
    #[serde(default = "default_version")]
    pub version: u32,
    /// User whose layouts are managed when none is given
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Override for the layout storage directory
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Grid size for newly created layouts
    #[serde(default)]
    pub grid: GridSize,
    /// Active layout id per user
    #[serde(default)]
    pub active_layouts: HashMap<String, String>,
}

impl AppConfig {
    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from_path(&config_path)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path()?)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.json"))
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a specific file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Directory the layout store writes to
    pub fn layouts_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("layouts")),
        }
    }

    pub fn active_layout(&self, user_id: &str) -> Option<&str> {
        self.active_layouts.get(user_id).map(String::as_str)
    }

    pub fn set_active_layout(&mut self, user_id: &str, layout_id: &str) {
        self.active_layouts
            .insert(user_id.to_string(), layout_id.to_string());
    }

    fn project_dirs() -> Result<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "studydash", "studydash")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            user_id: default_user_id(),
            data_dir: None,
            grid: GridSize::default(),
            active_layouts: HashMap::new(),
        }
    }
}
