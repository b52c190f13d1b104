//! Preferences persisted as JSON in the user's config directory

use std::fs;
use std::path::PathBuf;

use super::traits::PreferenceStore;
use crate::error::ServiceError;
use crate::state::Preferences;

#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferenceStore for FilePreferenceStore {
    /// Missing or unreadable files fall back to defaults
    fn load(&self) -> Preferences {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Preferences::default(),
        };
        match serde_json::from_str(&content) {
            Ok(preferences) => preferences,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), "Ignoring corrupt preferences: {err}");
                Preferences::default()
            }
        }
    }

    fn save(&self, preferences: &Preferences) -> Result<(), ServiceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(preferences)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
