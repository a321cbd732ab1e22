//! User settings persistence.
//!
//! This module handles loading and saving viewer preferences that survive
//! between sessions.

use crate::error::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User-configurable settings persisted between sessions.
///
/// Settings are stored as JSON in the user's config directory
/// (e.g., `~/.config/pixview/settings.json` on Linux).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Folder the last file dialog was opened in.
    pub last_directory: String,
    /// Whether the filmstrip panel is shown.
    pub filmstrip_visible: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_directory: String::new(),
            filmstrip_visible: true,
        }
    }
}

impl Settings {
    /// Returns the path to the settings file.
    ///
    /// Creates the config directory if it doesn't exist.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "pixview", "pixview").map(|dirs| {
            let config_dir = dirs.config_dir();
            if !config_dir.exists() {
                let _ = fs::create_dir_all(config_dir);
            }
            config_dir.join("settings.json")
        })
    }

    /// Loads settings from disk, falling back to defaults if not found.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Loads settings from a specific file; unreadable files give defaults.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Persists settings to disk.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Remembers the folder of `file` for the next dialog.
    pub fn remember_directory_of(&mut self, file: &Path) {
        if let Some(dir) = file.parent() {
            self.last_directory = dir.to_string_lossy().into_owned();
        }
    }

    pub fn last_directory(&self) -> Option<&Path> {
        (!self.last_directory.is_empty()).then(|| Path::new(&self.last_directory))
    }
}
