//! Event-sourced state of the preferences screen
//!
//! Every fetch issued at activation completes independently and reports back
//! with exactly one [`ScreenEvent`]. Events are folded into [`ScreenState`]
//! by [`ScreenState::reduce`], which has no side effects, so the result only
//! depends on which events arrived and, for duplicate attribute fields, which
//! data source reported last.

use std::collections::BTreeMap;

use super::attributes::AttributeForm;
use super::permissions::{can_change_password, PermissionSet};
use super::FormRegistry;
use super::user::UserRecord;
use crate::error::ServiceError;

/// Completion of one of the screen's independent fetches
#[derive(Debug)]
pub enum ScreenEvent {
    PermissionsLoaded(PermissionSet),
    PermissionsFailed(ServiceError),
    UserLoaded(UserRecord),
    UserFailed(ServiceError),
    LanguagesLoaded(BTreeMap<String, String>),
    LanguagesFailed(ServiceError),
    FormsRegistered {
        source: String,
        forms: Vec<AttributeForm>,
    },
    FormsFailed {
        source: String,
        error: ServiceError,
    },
}

impl ScreenEvent {
    /// Short name used in log lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::PermissionsLoaded(_) => "permissions-loaded",
            Self::PermissionsFailed(_) => "permissions-failed",
            Self::UserLoaded(_) => "user-loaded",
            Self::UserFailed(_) => "user-failed",
            Self::LanguagesLoaded(_) => "languages-loaded",
            Self::LanguagesFailed(_) => "languages-failed",
            Self::FormsRegistered { .. } => "forms-registered",
            Self::FormsFailed { .. } => "forms-failed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenState {
    /// The authenticated user the screen edits
    pub username: String,
    /// `None` until the permission lookup settles either way
    pub can_change_password: Option<bool>,
    pub user: Option<UserRecord>,
    /// Language key to display name; `None` until fetched
    pub languages: Option<BTreeMap<String, String>>,
    pub registry: FormRegistry,
    /// Projection of `registry`, rebuilt whenever it changes
    pub display_forms: Vec<AttributeForm>,
    /// Data sources whose attribute forms have been registered, in arrival order
    pub sources_registered: Vec<String>,
    pub sources_failed: Vec<String>,
}

impl ScreenState {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            ..Default::default()
        }
    }

    /// Fold one event into the state, yielding the next state
    pub fn reduce(mut self, event: ScreenEvent) -> Self {
        match event {
            ScreenEvent::PermissionsLoaded(permissions) => {
                self.can_change_password = Some(can_change_password(&permissions, &self.username));
            }
            ScreenEvent::PermissionsFailed(_) => {
                self.can_change_password = Some(false);
            }
            ScreenEvent::UserLoaded(user) => {
                self.user = Some(user);
            }
            ScreenEvent::UserFailed(_) => {}
            ScreenEvent::LanguagesLoaded(languages) => {
                self.languages = Some(languages);
            }
            ScreenEvent::LanguagesFailed(_) => {
                self.languages = Some(BTreeMap::new());
            }
            ScreenEvent::FormsRegistered { source, forms } => {
                self.registry.register_forms_from_source(&forms);
                self.display_forms = self.registry.snapshot();
                self.sources_registered.push(source);
            }
            ScreenEvent::FormsFailed { source, .. } => {
                self.sources_failed.push(source);
            }
        }
        self
    }

    /// Whether the sections gated on permissions and languages can be shown
    pub fn is_loaded(&self) -> bool {
        self.can_change_password.is_some() && self.languages.is_some()
    }

    /// Number of data sources that have reported either way
    pub fn sources_settled(&self) -> usize {
        self.sources_registered.len() + self.sources_failed.len()
    }
}
