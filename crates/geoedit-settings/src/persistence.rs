//! Settings Persistence
//!
//! Resolves the platform configuration directory, loads the editor settings
//! from it (falling back to defaults when no file exists yet) and writes
//! them back.

use crate::config::EditorSettings;
use crate::error::{SettingsError, SettingsResult};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "geoedit";
const SETTINGS_FILE: &str = "editor.toml";

/// Settings persistence layer
#[derive(Debug, Clone)]
pub struct SettingsPersistence {
    settings: EditorSettings,
    path: PathBuf,
}

impl SettingsPersistence {
    /// Create a persistence layer with default settings bound to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            settings: EditorSettings::default(),
            path: path.into(),
        }
    }

    /// Default settings file location inside the platform config directory
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Load settings from `path`, or defaults when the file does not exist
    pub fn load_or_default(path: impl Into<PathBuf>) -> SettingsResult<Self> {
        let path = path.into();
        if !path.exists() {
            tracing::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::new(path));
        }

        let settings = EditorSettings::load_from_file(&path)?;
        tracing::debug!("Loaded editor settings from {}", path.display());
        Ok(Self { settings, path })
    }

    /// Save settings, creating the parent directory when needed
    pub fn save(&self) -> SettingsResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
                })?;
            }
        }
        self.settings.save_to_file(&self.path)
    }

    /// Get reference to settings
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Replace the settings after validating them
    pub fn update(&mut self, settings: EditorSettings) -> SettingsResult<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
