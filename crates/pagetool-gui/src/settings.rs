//! On-disk settings: scalar preferences plus the recent-files list.

use anyhow::{Context, Result};
use pdf_pages::Preferences;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const MAX_RECENT_FILES: usize = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredSettings {
    pub prefs: Preferences,
    pub recent_files: Vec<PathBuf>,
}

impl StoredSettings {
    /// Record a freshly opened file at the front of the recent list.
    pub fn remember_recent(&mut self, path: &Path) {
        self.recent_files.retain(|p| p != path);
        self.recent_files.insert(0, path.to_path_buf());
        self.recent_files.truncate(MAX_RECENT_FILES);
    }
}

pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pdf-pagetool").join("settings.json"))
}

/// Load settings, falling back to defaults when the file is missing or
/// malformed. A broken file never blocks startup.
pub fn load() -> StoredSettings {
    let Some(path) = settings_path() else {
        return StoredSettings::default();
    };
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
            log::warn!("ignoring malformed settings at {}: {e}", path.display());
            StoredSettings::default()
        }),
        Err(_) => StoredSettings::default(),
    }
}

pub fn save(settings: &StoredSettings) -> Result<()> {
    let path = settings_path().context("no config directory on this platform")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, contents)?;
    Ok(())
}
