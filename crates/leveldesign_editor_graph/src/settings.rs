// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor settings.
//!
//! Stored as RON next to the project (`leveldesign.ron`). Every field has a
//! default, so a missing file or a partial one is fine.

use crate::store::{FileStore, DEFAULT_NAMESPACE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "leveldesign.ron";

/// Level design editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Format version
    pub version: u32,
    /// Folder level design containers are stored under
    pub assets_root: PathBuf,
    /// Namespace folder inside the assets root
    pub levels_namespace: String,
    /// File name offered for a new design
    pub default_file_name: String,
    /// Name given to the level node of a new design
    pub default_level_name: String,
    /// Name given to the start room of a new design
    pub start_room_name: String,
    /// Offset applied to pasted nodes
    pub paste_offset: [f32; 2],
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            assets_root: PathBuf::from("Assets/Resources"),
            levels_namespace: DEFAULT_NAMESPACE.to_string(),
            default_file_name: "New Level".to_string(),
            default_level_name: "Level".to_string(),
            start_room_name: "Start room".to_string(),
            paste_offset: [100.0, 100.0],
        }
    }
}

impl EditorSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings: EditorSettings = ron::from_str(&content)?;

        // Version check
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion(settings.version));
        }

        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::debug!("No settings at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Store for containers, resolved against a project directory
    pub fn file_store(&self, project_dir: &Path) -> FileStore {
        FileStore::with_namespace(project_dir.join(&self.assets_root), self.levels_namespace.clone())
    }
}

/// Error loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),

    /// Written by a newer editor
    #[error("Settings version {0} is newer than supported version {SETTINGS_FORMAT_VERSION}")]
    UnsupportedVersion(u32),
}
