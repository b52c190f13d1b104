//! User record and local preferences

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A user as stored by one data source.
///
/// The settings screen holds a copy, edits `attributes`, and writes the whole
/// record back on save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default)]
    pub disabled: bool,
}

impl UserRecord {
    #[cfg(test)]
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            ..Default::default()
        }
    }

    /// Current value of an attribute, if set
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|v| v.as_deref())
    }

    /// Set or clear an attribute. Clearing keeps the key with a null value so
    /// the backend sees the removal on save.
    pub fn set_attribute(&mut self, name: &str, value: Option<String>) {
        self.attributes.insert(name.to_string(), value);
    }
}

/// Preferences kept on the client side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub language: String,
    pub timezone: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            timezone: None,
        }
    }
}
