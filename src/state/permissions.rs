//! Effective permission sets as returned by the permission service

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Operations that can be granted on a single object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectPermission {
    Read,
    Update,
    Delete,
    Administer,
}

/// Operations granted on the system as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemPermission {
    Administer,
    CreateConnection,
    CreateConnectionGroup,
    CreateSharingProfile,
    CreateUser,
    CreateUserGroup,
    Audit,
}

/// Resolved permissions of one user after combining every applicable grant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PermissionSet {
    pub system_permissions: Vec<SystemPermission>,
    pub user_permissions: HashMap<String, Vec<ObjectPermission>>,
    pub user_group_permissions: HashMap<String, Vec<ObjectPermission>>,
    pub connection_permissions: HashMap<String, Vec<ObjectPermission>>,
}

impl PermissionSet {
    #[cfg(test)]
    /// Grant a permission on a user (builder style, mostly for fixtures)
    pub fn grant_user(mut self, username: &str, permission: ObjectPermission) -> Self {
        self.user_permissions
            .entry(username.to_string())
            .or_default()
            .push(permission);
        self
    }

    #[cfg(test)]
    /// Grant a system permission
    pub fn grant_system(mut self, permission: SystemPermission) -> Self {
        self.system_permissions.push(permission);
        self
    }
}

/// Whether `set` grants `permission` on the user named `username`
pub fn has_user_permission(
    set: &PermissionSet,
    permission: ObjectPermission,
    username: &str,
) -> bool {
    set.user_permissions
        .get(username)
        .is_some_and(|granted| granted.contains(&permission))
}

/// Whether `set` grants the system-level `permission`
pub fn has_system_permission(set: &PermissionSet, permission: SystemPermission) -> bool {
    set.system_permissions.contains(&permission)
}

/// A user may change their own password with UPDATE on themselves, or as an
/// administrator.
pub fn can_change_password(set: &PermissionSet, username: &str) -> bool {
    has_user_permission(set, ObjectPermission::Update, username)
        || has_system_permission(set, SystemPermission::Administer)
}
