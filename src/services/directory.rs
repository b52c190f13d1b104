//! JSON-file backed directory standing in for the gateway's REST services
//!
//! The file lists each data source with its users, their effective
//! permissions and the attribute forms its schema declares:
//!
//! ```json
//! {
//!   "languages": { "en": "English" },
//!   "dataSources": {
//!     "mysql": {
//!       "users": [{ "username": "alice", "password": "secret", "attributes": {} }],
//!       "permissions": { "alice": { "userPermissions": { "alice": ["READ", "UPDATE"] } } },
//!       "userAttributes": [{ "name": "profile", "fields": [{ "name": "guac-full-name" }] }]
//!     }
//!   }
//! }
//! ```

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tokio::sync::RwLock;

use super::traits::{LanguageCatalog, PermissionOracle, SchemaProvider, UserStore};
use crate::error::ServiceError;
use crate::state::{AttributeForm, PermissionSet, UserRecord};

#[derive(Debug, Clone, Deserialize)]
struct StoredUser {
    #[serde(flatten)]
    record: UserRecord,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DataSource {
    users: Vec<StoredUser>,
    permissions: HashMap<String, PermissionSet>,
    user_attributes: Vec<AttributeForm>,
    /// Simulates a backend that is configured but not answering
    unavailable: bool,
}

impl DataSource {
    fn user(&self, username: &str) -> Result<&StoredUser, ServiceError> {
        self.users
            .iter()
            .find(|u| u.record.username == username)
            .ok_or_else(|| ServiceError::NotFound(format!("No such user: \"{username}\"")))
    }

    fn user_mut(&mut self, username: &str) -> Result<&mut StoredUser, ServiceError> {
        self.users
            .iter_mut()
            .find(|u| u.record.username == username)
            .ok_or_else(|| ServiceError::NotFound(format!("No such user: \"{username}\"")))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DirectoryFile {
    languages: BTreeMap<String, String>,
    data_sources: IndexMap<String, DataSource>,
}

/// In-process implementation of the remote collaborators
#[derive(Debug)]
pub struct DirectoryBackend {
    languages: BTreeMap<String, String>,
    data_sources: RwLock<IndexMap<String, DataSource>>,
}

impl DirectoryBackend {
    /// Load the directory from a JSON file
    pub fn load(path: &Path) -> Result<Self, ServiceError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ServiceError> {
        let file: DirectoryFile = serde_json::from_str(json)?;
        Ok(Self {
            languages: file.languages,
            data_sources: RwLock::new(file.data_sources),
        })
    }

    /// Data source identifiers in file order
    pub async fn data_source_names(&self) -> Vec<String> {
        self.data_sources.read().await.keys().cloned().collect()
    }
}

/// Look up a data source that is answering requests
fn reachable<'a>(
    sources: &'a IndexMap<String, DataSource>,
    data_source: &str,
) -> Result<&'a DataSource, ServiceError> {
    let source = sources
        .get(data_source)
        .ok_or_else(|| no_such_source(data_source))?;
    if source.unavailable {
        return Err(unavailable(data_source));
    }
    Ok(source)
}

fn reachable_mut<'a>(
    sources: &'a mut IndexMap<String, DataSource>,
    data_source: &str,
) -> Result<&'a mut DataSource, ServiceError> {
    let source = sources
        .get_mut(data_source)
        .ok_or_else(|| no_such_source(data_source))?;
    if source.unavailable {
        return Err(unavailable(data_source));
    }
    Ok(source)
}

fn no_such_source(data_source: &str) -> ServiceError {
    ServiceError::NotFound(format!("No such data source: \"{data_source}\""))
}

fn unavailable(data_source: &str) -> ServiceError {
    ServiceError::Unavailable(format!("Data source \"{data_source}\" is not responding"))
}

#[async_trait]
impl SchemaProvider for DirectoryBackend {
    async fn get_user_preference_attributes(
        &self,
        data_source: &str,
    ) -> Result<Vec<AttributeForm>, ServiceError> {
        let sources = self.data_sources.read().await;
        Ok(reachable(&sources, data_source)?.user_attributes.clone())
    }
}

#[async_trait]
impl UserStore for DirectoryBackend {
    async fn get_user(
        &self,
        data_source: &str,
        username: &str,
    ) -> Result<UserRecord, ServiceError> {
        let sources = self.data_sources.read().await;
        Ok(reachable(&sources, data_source)?.user(username)?.record.clone())
    }

    async fn save_user(&self, data_source: &str, user: &UserRecord) -> Result<(), ServiceError> {
        let mut sources = self.data_sources.write().await;
        reachable_mut(&mut sources, data_source)?
            .user_mut(&user.username)?
            .record = user.clone();
        Ok(())
    }

    async fn update_user_password(
        &self,
        data_source: &str,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        if new_password.is_empty() {
            return Err(ServiceError::BadRequest(
                "The new password must not be blank.".to_string(),
            ));
        }
        let mut sources = self.data_sources.write().await;
        let stored = reachable_mut(&mut sources, data_source)?.user_mut(username)?;
        if stored.password != old_password {
            return Err(ServiceError::PermissionDenied(
                "Invalid password.".to_string(),
            ));
        }
        stored.password = new_password.to_string();
        Ok(())
    }
}

#[async_trait]
impl PermissionOracle for DirectoryBackend {
    async fn get_effective_permissions(
        &self,
        data_source: &str,
        username: &str,
    ) -> Result<PermissionSet, ServiceError> {
        let sources = self.data_sources.read().await;
        let source = reachable(&sources, data_source)?;
        // A user with no explicit grants simply has none
        source.user(username)?;
        Ok(source.permissions.get(username).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl LanguageCatalog for DirectoryBackend {
    async fn get_languages(&self) -> Result<BTreeMap<String, String>, ServiceError> {
        Ok(self.languages.clone())
    }
}
