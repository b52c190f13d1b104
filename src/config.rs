//! Configuration handling for the settings tool

use anyhow::{bail, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::state::PasswordChangeRequest;

const ENV_DIRECTORY: &str = "GATEWAY_SETTINGS_DIRECTORY";
const ENV_USER: &str = "GATEWAY_SETTINGS_USER";
const ENV_DATA_SOURCE: &str = "GATEWAY_SETTINGS_DATA_SOURCE";
const ENV_LANGUAGE: &str = "GATEWAY_SETTINGS_LANGUAGE";
const ENV_ATTRIBUTES: &str = "GATEWAY_SETTINGS_ATTRIBUTES";
const ENV_OLD_PASSWORD: &str = "GATEWAY_SETTINGS_OLD_PASSWORD";
const ENV_NEW_PASSWORD: &str = "GATEWAY_SETTINGS_NEW_PASSWORD";
const ENV_CONFIRM_PASSWORD: &str = "GATEWAY_SETTINGS_CONFIRM_PASSWORD";

const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 30;

/// User configuration for the settings tool
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsConfig {
    /// JSON directory file serving users, permissions and schemas
    pub directory_path: Option<PathBuf>,
    /// User whose settings are shown
    pub username: Option<String>,
    /// Data source the user authenticates against; defaults to the first one
    pub data_source: Option<String>,
    /// Where local preferences are kept
    pub preferences_path: Option<PathBuf>,
    /// How long to wait for every data source to answer
    pub load_timeout_secs: Option<u64>,
}

impl SettingsConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("org", "gateway", "gateway-settings")
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if let Some(path) = path {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                let config: SettingsConfig = serde_json::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Self::default())
    }

    /// Apply `GATEWAY_SETTINGS_*` environment overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(directory) = lookup(ENV_DIRECTORY) {
            self.directory_path = Some(PathBuf::from(directory));
        }
        if let Some(username) = lookup(ENV_USER) {
            self.username = Some(username);
        }
        if let Some(data_source) = lookup(ENV_DATA_SOURCE) {
            self.data_source = Some(data_source);
        }
        self
    }

    /// Preferences file, falling back to the user's config directory
    pub fn preferences_path(&self) -> PathBuf {
        self.preferences_path
            .clone()
            .or_else(|| {
                Self::project_dirs().map(|dirs| dirs.config_dir().join("preferences.json"))
            })
            .unwrap_or_else(|| PathBuf::from("preferences.json"))
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs.unwrap_or(DEFAULT_LOAD_TIMEOUT_SECS))
    }
}

/// Changes to apply once the screen has loaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenActions {
    pub language: Option<String>,
    /// Attribute edits in order; an empty value clears the attribute
    pub attributes: Vec<(String, Option<String>)>,
    pub password: Option<PasswordChangeRequest>,
}

impl ScreenActions {
    /// Read actions from `GATEWAY_SETTINGS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut attributes = Vec::new();
        if let Some(list) = lookup(ENV_ATTRIBUTES) {
            for entry in list.split(';').filter(|e| !e.trim().is_empty()) {
                let Some((name, value)) = entry.split_once('=') else {
                    bail!("malformed attribute \"{entry}\" in {ENV_ATTRIBUTES}, expected name=value");
                };
                let value = (!value.is_empty()).then(|| value.to_string());
                attributes.push((name.trim().to_string(), value));
            }
        }

        let password = PasswordChangeRequest::new(
            &lookup(ENV_OLD_PASSWORD).unwrap_or_default(),
            &lookup(ENV_NEW_PASSWORD).unwrap_or_default(),
            &lookup(ENV_CONFIRM_PASSWORD).unwrap_or_default(),
        );

        Ok(Self {
            language: lookup(ENV_LANGUAGE),
            attributes,
            password: (!password.is_empty()).then_some(password),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.attributes.is_empty() && self.password.is_none()
    }
}
