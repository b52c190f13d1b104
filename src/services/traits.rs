//! Trait abstraction for the screen's collaborators to enable mocking in tests

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::error::ServiceError;
use crate::state::{AttributeForm, Notification, PermissionSet, Preferences, UserRecord};

/// Source of the user attribute forms declared by each data source's schema
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Forms users may edit about themselves in the given data source
    async fn get_user_preference_attributes(
        &self,
        data_source: &str,
    ) -> Result<Vec<AttributeForm>, ServiceError>;
}

/// Read and write access to user records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch a single user
    async fn get_user(&self, data_source: &str, username: &str)
        -> Result<UserRecord, ServiceError>;

    /// Replace the stored user with the given record
    async fn save_user(&self, data_source: &str, user: &UserRecord) -> Result<(), ServiceError>;

    /// Change a user's password, proving knowledge of the old one
    async fn update_user_password(
        &self,
        data_source: &str,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError>;
}

/// Resolution of effective permissions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionOracle: Send + Sync {
    async fn get_effective_permissions(
        &self,
        data_source: &str,
        username: &str,
    ) -> Result<PermissionSet, ServiceError>;
}

/// Languages the interface can be displayed in
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageCatalog: Send + Sync {
    /// Language key to human-readable name
    async fn get_languages(&self) -> Result<BTreeMap<String, String>, ServiceError>;
}

/// Client-side preference storage
#[cfg_attr(test, mockall::automock)]
pub trait PreferenceStore: Send + Sync {
    fn load(&self) -> Preferences;

    fn save(&self, preferences: &Preferences) -> Result<(), ServiceError>;
}

/// Modal status display. `None` dismisses whatever is shown.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    fn show_status(&self, status: Option<Notification>);
}
