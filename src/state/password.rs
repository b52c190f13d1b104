//! Password change form and its submission rules

use std::fmt;

use crate::error::{PasswordChangeError, PasswordValidation};
use crate::services::UserStore;

/// The three password inputs of the form. Never persisted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PasswordChangeRequest {
    pub old_password: String,
    pub new_password: String,
    pub new_password_match: String,
}

impl PasswordChangeRequest {
    pub fn new(old: &str, new: &str, confirm: &str) -> Self {
        Self {
            old_password: old.to_string(),
            new_password: new.to_string(),
            new_password_match: confirm.to_string(),
        }
    }

    /// Check the request locally. Mismatch is reported before blankness.
    pub fn validate(&self) -> Result<(), PasswordValidation> {
        if self.new_password != self.new_password_match {
            return Err(PasswordValidation::Mismatch);
        }
        if self.new_password.is_empty() {
            return Err(PasswordValidation::Blank);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.old_password.clear();
        self.new_password.clear();
        self.new_password_match.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.old_password.is_empty()
            && self.new_password.is_empty()
            && self.new_password_match.is_empty()
    }
}

impl fmt::Debug for PasswordChangeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordChangeRequest")
            .field("old_password", &"<redacted>")
            .field("new_password", &"<redacted>")
            .field("new_password_match", &"<redacted>")
            .finish()
    }
}

/// Where the password form is in its submit cycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PasswordPhase {
    #[default]
    Idle,
    Validating,
    Rejected(PasswordValidation),
    Submitting,
    Succeeded,
    Failed(String),
}

impl PasswordPhase {
    /// Terminal phases wait for the user to dismiss the resulting dialog
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::Succeeded | Self::Failed(_))
    }
}

#[derive(Debug, Default)]
pub struct PasswordChangeGuard {
    pub request: PasswordChangeRequest,
    phase: PasswordPhase,
}

impl PasswordChangeGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &PasswordPhase {
        &self.phase
    }

    /// Validate the held request and, if it passes, ask the store to update
    /// the password of `username` in `data_source`.
    ///
    /// Fields are cleared only on success; a remote failure leaves them as
    /// typed.
    pub async fn submit(
        &mut self,
        store: &dyn UserStore,
        data_source: &str,
        username: &str,
    ) -> Result<(), PasswordChangeError> {
        self.phase = PasswordPhase::Validating;
        if let Err(validation) = self.request.validate() {
            self.phase = PasswordPhase::Rejected(validation);
            return Err(validation.into());
        }

        self.phase = PasswordPhase::Submitting;
        let result = store
            .update_user_password(
                data_source,
                username,
                &self.request.old_password,
                &self.request.new_password,
            )
            .await;

        match result {
            Ok(()) => {
                self.request.clear();
                self.phase = PasswordPhase::Succeeded;
                Ok(())
            }
            Err(err) => {
                self.phase = PasswordPhase::Failed(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Return to idle once the outcome dialog has been dismissed
    pub fn acknowledge(&mut self) {
        if self.phase.is_terminal() {
            self.phase = PasswordPhase::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::services::MockUserStore;

    fn guard(old: &str, new: &str, confirm: &str) -> PasswordChangeGuard {
        PasswordChangeGuard {
            request: PasswordChangeRequest::new(old, new, confirm),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_mismatch() {
        let request = PasswordChangeRequest::new("old", "x", "y");
        assert_eq!(request.validate(), Err(PasswordValidation::Mismatch));
    }

    #[test]
    fn test_validate_blank() {
        let request = PasswordChangeRequest::new("old", "", "");
        assert_eq!(request.validate(), Err(PasswordValidation::Blank));
    }

    #[test]
    fn test_mismatch_checked_before_blank() {
        let request = PasswordChangeRequest::new("old", "", "y");
        assert_eq!(request.validate(), Err(PasswordValidation::Mismatch));
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let request = PasswordChangeRequest::new("hunter2", "abc", "abc");
        let debug_str = format!("{:?}", request);
        assert!(!debug_str.contains("hunter2"));
        assert!(debug_str.contains("redacted"));
    }

    #[tokio::test]
    async fn test_mismatch_never_calls_store() {
        let mut store = MockUserStore::new();
        store.expect_update_user_password().never();

        let mut guard = guard("old", "x", "y");
        let result = guard.submit(&store, "mysql", "alice").await;

        assert!(matches!(
            result,
            Err(PasswordChangeError::Validation(PasswordValidation::Mismatch))
        ));
        assert_eq!(guard.phase(), &PasswordPhase::Rejected(PasswordValidation::Mismatch));
        assert_eq!(guard.request.new_password, "x");
    }

    #[tokio::test]
    async fn test_blank_never_calls_store() {
        let mut store = MockUserStore::new();
        store.expect_update_user_password().never();

        let mut guard = guard("old", "", "");
        let result = guard.submit(&store, "mysql", "alice").await;

        assert!(matches!(
            result,
            Err(PasswordChangeError::Validation(PasswordValidation::Blank))
        ));
    }

    #[tokio::test]
    async fn test_success_clears_fields() {
        let mut store = MockUserStore::new();
        store
            .expect_update_user_password()
            .times(1)
            .returning(|data_source, username, old, new| {
                assert_eq!(data_source, "mysql");
                assert_eq!(username, "alice");
                assert_eq!(old, "old");
                assert_eq!(new, "abc");
                Ok(())
            });

        let mut guard = guard("old", "abc", "abc");
        guard.submit(&store, "mysql", "alice").await.unwrap();

        assert!(guard.request.is_empty());
        assert_eq!(guard.phase(), &PasswordPhase::Succeeded);
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_fields() {
        let mut store = MockUserStore::new();
        store
            .expect_update_user_password()
            .times(1)
            .returning(|_, _, _, _| Err(ServiceError::PermissionDenied("Invalid password.".into())));

        let mut guard = guard("wrong", "abc", "abc");
        let err = guard.submit(&store, "mysql", "alice").await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid password.");
        assert_eq!(guard.request, PasswordChangeRequest::new("wrong", "abc", "abc"));
        assert_eq!(
            guard.phase(),
            &PasswordPhase::Failed("Invalid password.".to_string())
        );
    }

    #[test]
    fn test_acknowledge_returns_to_idle() {
        let mut guard = guard("", "", "");
        guard.phase = PasswordPhase::Succeeded;
        guard.acknowledge();
        assert_eq!(guard.phase(), &PasswordPhase::Idle);
    }

    #[test]
    fn test_acknowledge_ignored_mid_submit() {
        let mut guard = guard("", "", "");
        guard.phase = PasswordPhase::Submitting;
        guard.acknowledge();
        assert_eq!(guard.phase(), &PasswordPhase::Submitting);
    }
}
