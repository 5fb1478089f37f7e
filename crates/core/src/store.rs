//! Layout storage
//!
//! Every layout mutation reads the user's full layout list, changes it and
//! writes the whole list back through a [`LayoutStore`]. There is no
//! compare-and-swap: concurrent writers to the same backing store can lose
//! updates, so a store shared between processes needs its own locking.

use crate::error::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use studydash_types::DashboardLayout;

/// Key a user's layout list is stored under
pub fn storage_key(user_id: &str) -> String {
    format!("dashboard_layouts_{}", user_id)
}

/// Synchronous backing store for per-user layout lists
pub trait LayoutStore {
    /// Load a user's layouts. A user with nothing stored gets an empty list.
    fn load(&self, user_id: &str) -> Result<Vec<DashboardLayout>>;

    /// Replace a user's stored layouts
    fn save(&mut self, user_id: &str, layouts: &[DashboardLayout]) -> Result<()>;
}

/// Suffix a corrupt blob is kept under before a save replaces it
pub const BACKUP_SUFFIX: &str = ".bak";

fn is_corrupt(content: &[u8]) -> bool {
    serde_json::from_slice::<Vec<DashboardLayout>>(content).is_err()
}

/// Parse a stored blob. A corrupt blob is logged and treated as empty, the
/// same way a fresh user is. Stores keep the corrupt blob under
/// [`BACKUP_SUFFIX`] when they next overwrite it.
fn parse_layouts(key: &str, content: &str) -> Vec<DashboardLayout> {
    match serde_json::from_str(content) {
        Ok(layouts) => layouts,
        Err(e) => {
            log::warn!("Ignoring unreadable layouts under {}: {}", key, e);
            Vec::new()
        }
    }
}

/// In-memory key/value store holding serialized JSON, like browser storage
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON stored under a key
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Overwrite the raw JSON under a key
    pub fn set_raw(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl LayoutStore for MemoryStore {
    fn load(&self, user_id: &str) -> Result<Vec<DashboardLayout>> {
        let key = storage_key(user_id);
        Ok(self
            .entries
            .get(&key)
            .map(|content| parse_layouts(&key, content))
            .unwrap_or_default())
    }

    fn save(&mut self, user_id: &str, layouts: &[DashboardLayout]) -> Result<()> {
        let key = storage_key(user_id);
        let content = serde_json::to_string(layouts)?;
        if let Some(previous) = self.entries.insert(key.clone(), content) {
            if is_corrupt(previous.as_bytes()) {
                log::warn!("Keeping unreadable layouts of {} as {}{}", key, key, BACKUP_SUFFIX);
                self.entries.insert(format!("{}{}", key, BACKUP_SUFFIX), previous);
            }
        }
        Ok(())
    }
}

/// Stores each user's layouts as `<storage_key>.json` in a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds a user's layouts
    pub fn path_for(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", storage_key(user_id)))
    }

    /// Where a corrupt layouts file is moved before being overwritten
    pub fn backup_path_for(&self, user_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json{}", storage_key(user_id), BACKUP_SUFFIX))
    }
}

impl LayoutStore for JsonFileStore {
    fn load(&self, user_id: &str) -> Result<Vec<DashboardLayout>> {
        let path = self.path_for(user_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read(&path)?;
        Ok(parse_layouts(&storage_key(user_id), &String::from_utf8_lossy(&content)))
    }

    fn save(&mut self, user_id: &str, layouts: &[DashboardLayout]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(user_id);
        if path.exists() && is_corrupt(&std::fs::read(&path)?) {
            let backup = self.backup_path_for(user_id);
            log::warn!("Keeping unreadable layouts file as {}", backup.display());
            std::fs::rename(&path, &backup)?;
        }

        let content = serde_json::to_string_pretty(layouts)?;
        std::fs::write(&path, content)?;
        log::debug!("Saved {} layouts for user {}", layouts.len(), user_id);
        Ok(())
    }
}
