//! Modal status descriptors handed to the notification widget

use serde::Serialize;
use std::collections::BTreeMap;

pub const ERROR_TITLE: &str = "SETTINGS_PREFERENCES.DIALOG_HEADER_ERROR";
pub const PASSWORD_TITLE: &str = "SETTINGS_PREFERENCES.DIALOG_HEADER_PASSWORD_CHANGED";
pub const ATTRIBUTES_TITLE: &str = "SETTINGS_PREFERENCES.DIALOG_HEADER_ATTRIBUTES_SAVED";
pub const PASSWORD_CHANGED: &str = "SETTINGS_PREFERENCES.INFO_PASSWORD_CHANGED";
pub const ATTRIBUTES_SAVED: &str = "SETTINGS_PREFERENCES.INFO_PREFERENCE_ATTRIBUTES_CHANGED";
pub const ACTION_ACKNOWLEDGE: &str = "SETTINGS_PREFERENCES.ACTION_ACKNOWLEDGE";
/// Key whose translation is just its `MESSAGE` variable
pub const TEXT_UNTRANSLATED: &str = "APP.TEXT_UNTRANSLATED";

/// Message key plus substitution variables, resolved by the translation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatableMessage {
    pub key: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

impl TranslatableMessage {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            variables: BTreeMap::new(),
        }
    }

    /// Message shown as-is, without translation
    pub fn untranslated(message: impl Into<String>) -> Self {
        Self {
            key: TEXT_UNTRANSLATED.to_string(),
            variables: BTreeMap::from([("MESSAGE".to_string(), message.into())]),
        }
    }

    /// Text to show when no translation layer is available
    pub fn fallback_text(&self) -> &str {
        if self.key == TEXT_UNTRANSLATED {
            if let Some(message) = self.variables.get("MESSAGE") {
                return message;
            }
        }
        &self.key
    }
}

/// What an action button does once pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    /// Close the dialog and return to the form
    Acknowledge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub label: String,
    pub kind: ActionKind,
}

impl NotificationAction {
    pub fn acknowledge() -> Self {
        Self {
            label: ACTION_ACKNOWLEDGE.to_string(),
            kind: ActionKind::Acknowledge,
        }
    }
}

/// One modal status: title, body and the buttons shown under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub text: TranslatableMessage,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Informational dialog with a single acknowledge button
    pub fn info(title: &str, key: &str) -> Self {
        Self {
            title: title.to_string(),
            text: TranslatableMessage::new(key),
            actions: vec![NotificationAction::acknowledge()],
        }
    }

    /// Error dialog whose body is shown as given
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: ERROR_TITLE.to_string(),
            text: TranslatableMessage::untranslated(message),
            actions: vec![NotificationAction::acknowledge()],
        }
    }

    pub fn is_error(&self) -> bool {
        self.title == ERROR_TITLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_carries_message_verbatim() {
        let notification = Notification::error("Invalid password.");
        assert!(notification.is_error());
        assert_eq!(notification.text.key, TEXT_UNTRANSLATED);
        assert_eq!(
            notification.text.variables.get("MESSAGE").map(String::as_str),
            Some("Invalid password.")
        );
        assert_eq!(notification.text.fallback_text(), "Invalid password.");
        assert_eq!(notification.actions, vec![NotificationAction::acknowledge()]);
    }

    #[test]
    fn test_info_is_not_error() {
        let notification = Notification::info(PASSWORD_TITLE, PASSWORD_CHANGED);
        assert!(!notification.is_error());
        assert_eq!(notification.text.key, PASSWORD_CHANGED);
        assert_eq!(notification.text.fallback_text(), PASSWORD_CHANGED);
    }

    #[test]
    fn test_serialize_skips_empty_variables() {
        let json = serde_json::to_string(&TranslatableMessage::new("KEY")).unwrap();
        assert_eq!(json, r#"{"key":"KEY"}"#);
    }

    #[test]
    fn test_serialize_untranslated_message() {
        let json = serde_json::to_string(&TranslatableMessage::untranslated("boom")).unwrap();
        assert_eq!(json, r#"{"key":"APP.TEXT_UNTRANSLATED","variables":{"MESSAGE":"boom"}}"#);
    }
}
