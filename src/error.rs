//! Error types for the settings screen

use thiserror::Error;

/// Failure reported by a remote collaborator.
///
/// The `Display` output is what the user sees in the error dialog, so each
/// variant renders its message verbatim.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Password problems caught before any request is made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PasswordValidation {
    #[error("the new passwords do not match")]
    Mismatch,

    #[error("the new password is blank")]
    Blank,
}

impl PasswordValidation {
    /// Translation key shown in the rejection dialog
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::Mismatch => "SETTINGS_PREFERENCES.ERROR_PASSWORD_MISMATCH",
            Self::Blank => "SETTINGS_PREFERENCES.ERROR_PASSWORD_BLANK",
        }
    }
}

/// Outcome of a rejected password change
#[derive(Debug, Error)]
pub enum PasswordChangeError {
    #[error(transparent)]
    Validation(#[from] PasswordValidation),

    #[error(transparent)]
    Remote(#[from] ServiceError),
}

/// Errors from user-facing screen operations other than password changes
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("the user record has not been loaded yet")]
    UserNotLoaded,

    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error(transparent)]
    Remote(#[from] ServiceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_message_is_verbatim() {
        let err = ServiceError::PermissionDenied("Permission denied.".to_string());
        assert_eq!(err.to_string(), "Permission denied.");
    }

    #[test]
    fn test_password_change_error_wraps_remote_transparently() {
        let err: PasswordChangeError = ServiceError::BadRequest("Password too short".into()).into();
        assert_eq!(err.to_string(), "Password too short");
    }

    #[test]
    fn test_validation_keys_are_distinct() {
        assert_ne!(
            PasswordValidation::Mismatch.message_key(),
            PasswordValidation::Blank.message_key()
        );
    }
}
