//! Preferences screen: composition of collaborators and user-facing operations

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::{PasswordChangeError, PasswordValidation, SettingsError};
use crate::services::{
    LanguageCatalog, NotificationSink, PermissionOracle, PreferenceStore, SchemaProvider,
    UserStore,
};
use crate::state::{
    AttributeForm, Notification, PasswordChangeGuard, PasswordChangeRequest, PasswordPhase,
    Preferences, ScreenEvent, ScreenState, ATTRIBUTES_SAVED, ATTRIBUTES_TITLE, ERROR_TITLE,
    PASSWORD_CHANGED, PASSWORD_TITLE,
};

/// Collaborators the screen talks to, resolved once at composition time
#[derive(Clone)]
pub struct Services {
    pub schema: Arc<dyn SchemaProvider>,
    pub users: Arc<dyn UserStore>,
    pub permissions: Arc<dyn PermissionOracle>,
    pub languages: Arc<dyn LanguageCatalog>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub notifications: Arc<dyn NotificationSink>,
}

/// Who is signed in and where
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    /// Data source the user authenticated against
    pub data_source: String,
    /// Every data source the user has an identity in
    pub available_data_sources: Vec<String>,
}

/// The settings screen of the currently authenticated user
pub struct SettingsScreen {
    services: Services,
    session: Session,
    state: ScreenState,
    preferences: Preferences,
    password: PasswordChangeGuard,
    /// Completions of the fetches issued by `activate`
    events: Option<mpsc::UnboundedReceiver<ScreenEvent>>,
}

impl SettingsScreen {
    pub fn new(services: Services, session: Session) -> Self {
        let preferences = services.preferences.load();
        let state = ScreenState::new(&session.username);
        Self {
            services,
            session,
            state,
            preferences,
            password: PasswordChangeGuard::new(),
            events: None,
        }
    }

    /// Issue every fetch the screen needs without waiting on any of them.
    ///
    /// Completions are applied as they are pulled with [`Self::process_next`];
    /// there is no point at which the screen waits for all of them together.
    /// Each activation starts from an empty state.
    pub fn activate(&mut self) {
        self.state = ScreenState::new(&self.session.username);
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(rx);

        let username = self.session.username.clone();
        let data_source = self.session.data_source.clone();
        tracing::info!(
            %username,
            %data_source,
            sources = self.session.available_data_sources.len(),
            "Activating preferences screen"
        );

        let oracle = Arc::clone(&self.services.permissions);
        let (ds, user) = (data_source.clone(), username.clone());
        spawn_fetch(&tx, async move {
            match oracle.get_effective_permissions(&ds, &user).await {
                Ok(permissions) => ScreenEvent::PermissionsLoaded(permissions),
                Err(err) => ScreenEvent::PermissionsFailed(err),
            }
        });

        let users = Arc::clone(&self.services.users);
        let (ds, user) = (data_source, username);
        spawn_fetch(&tx, async move {
            match users.get_user(&ds, &user).await {
                Ok(record) => ScreenEvent::UserLoaded(record),
                Err(err) => ScreenEvent::UserFailed(err),
            }
        });

        let catalog = Arc::clone(&self.services.languages);
        spawn_fetch(&tx, async move {
            match catalog.get_languages().await {
                Ok(languages) => ScreenEvent::LanguagesLoaded(languages),
                Err(err) => ScreenEvent::LanguagesFailed(err),
            }
        });

        for source in &self.session.available_data_sources {
            let schema = Arc::clone(&self.services.schema);
            let source = source.clone();
            spawn_fetch(&tx, async move {
                match schema.get_user_preference_attributes(&source).await {
                    Ok(forms) => ScreenEvent::FormsRegistered { source, forms },
                    Err(error) => ScreenEvent::FormsFailed { source, error },
                }
            });
        }
    }

    /// Wait for the next fetch to complete and apply it.
    ///
    /// Returns `false` once every fetch has reported, or if the screen was
    /// never activated.
    pub async fn process_next(&mut self) -> bool {
        let event = match self.events.as_mut() {
            Some(events) => events.recv().await,
            None => return false,
        };
        match event {
            Some(event) => {
                self.apply(event);
                true
            }
            None => {
                self.events = None;
                false
            }
        }
    }

    /// Apply completions until all outstanding fetches have reported
    pub async fn settle(&mut self) {
        while self.process_next().await {}
    }

    /// Stop listening for completions. Fetches still in flight finish on
    /// their own and their results are dropped.
    pub fn deactivate(&mut self) {
        self.events = None;
    }

    /// Fold one completion into the screen state
    pub fn apply(&mut self, event: ScreenEvent) {
        tracing::debug!(event = event.label(), "Applying screen event");
        match &event {
            ScreenEvent::PermissionsFailed(err) => {
                tracing::warn!("Unable to determine permissions, password change disabled: {err}");
            }
            ScreenEvent::UserFailed(err) => {
                tracing::warn!(username = %self.session.username, "Unable to load user: {err}");
                self.notify(Notification::error(err.to_string()));
            }
            ScreenEvent::LanguagesFailed(err) => {
                tracing::warn!("Unable to load available languages: {err}");
            }
            ScreenEvent::FormsFailed { source, error } => {
                tracing::warn!(%source, "Skipping attribute forms of data source: {error}");
            }
            ScreenEvent::FormsRegistered { source, forms } => {
                tracing::debug!(%source, forms = forms.len(), "Registering attribute forms");
            }
            _ => {}
        }
        self.state = std::mem::take(&mut self.state).reduce(event);
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    /// Merged attribute forms in display order
    pub fn display_forms(&self) -> &[AttributeForm] {
        &self.state.display_forms
    }

    /// Password changes are allowed only once the permission lookup has
    /// positively granted them
    pub fn can_change_password(&self) -> bool {
        self.state.can_change_password.unwrap_or(false)
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    // --- Password ---

    pub fn password_mut(&mut self) -> &mut PasswordChangeRequest {
        &mut self.password.request
    }

    pub fn password_phase(&self) -> &PasswordPhase {
        self.password.phase()
    }

    /// Submit the password form, reporting the outcome in a dialog
    pub async fn change_password(&mut self) -> Result<(), PasswordChangeError> {
        let result = self
            .password
            .submit(
                self.services.users.as_ref(),
                &self.session.data_source,
                &self.session.username,
            )
            .await;

        match &result {
            Ok(()) => {
                tracing::info!(username = %self.session.username, "Password changed");
                self.notify(Notification::info(PASSWORD_TITLE, PASSWORD_CHANGED));
            }
            Err(PasswordChangeError::Validation(validation)) => {
                self.notify(validation_notification(*validation));
            }
            Err(PasswordChangeError::Remote(err)) => {
                tracing::warn!(username = %self.session.username, "Password change rejected: {err}");
                self.notify(Notification::error(err.to_string()));
            }
        }
        result
    }

    /// Close the current dialog
    pub fn acknowledge(&mut self) {
        self.password.acknowledge();
        self.services.notifications.show_status(None);
    }

    // --- Attributes ---

    /// Edit an attribute of the held user record. `None` clears it.
    pub fn set_attribute(&mut self, name: &str, value: Option<String>) -> Result<(), SettingsError> {
        let user = self.state.user.as_mut().ok_or(SettingsError::UserNotLoaded)?;
        user.set_attribute(name, value);
        Ok(())
    }

    /// Write the whole user record back to its data source
    pub async fn save_user(&mut self) -> Result<(), SettingsError> {
        let user = self.state.user.as_ref().ok_or(SettingsError::UserNotLoaded)?;

        match self
            .services
            .users
            .save_user(&self.session.data_source, user)
            .await
        {
            Ok(()) => {
                tracing::info!(username = %user.username, "User attributes saved");
                self.notify(Notification::info(ATTRIBUTES_TITLE, ATTRIBUTES_SAVED));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(username = %user.username, "Unable to save user: {err}");
                self.notify(Notification::error(err.to_string()));
                Err(err.into())
            }
        }
    }

    // --- Locale ---

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Available languages, empty until fetched
    pub fn languages(&self) -> BTreeMap<String, String> {
        self.state.languages.clone().unwrap_or_default()
    }

    /// Switch the interface language and persist the choice
    pub fn set_language(&mut self, key: &str) -> Result<(), SettingsError> {
        let known = self
            .state
            .languages
            .as_ref()
            .is_some_and(|languages| languages.contains_key(key));
        if !known {
            return Err(SettingsError::UnknownLanguage(key.to_string()));
        }

        let mut preferences = self.preferences.clone();
        preferences.language = key.to_string();
        if let Err(err) = self.services.preferences.save(&preferences) {
            self.notify(Notification::error(err.to_string()));
            return Err(err.into());
        }

        tracing::info!(language = key, "Language changed");
        self.preferences = preferences;
        Ok(())
    }

    fn notify(&self, notification: Notification) {
        self.services.notifications.show_status(Some(notification));
    }
}

/// Local rejections are shown as errors with a translated body
fn validation_notification(validation: PasswordValidation) -> Notification {
    Notification::info(ERROR_TITLE, validation.message_key())
}

/// Run one fetch in the background and report its completion to the screen
fn spawn_fetch<F>(tx: &mpsc::UnboundedSender<ScreenEvent>, fetch: F)
where
    F: Future<Output = ScreenEvent> + Send + 'static,
{
    let tx = tx.clone();
    tokio::spawn(async move {
        let event = fetch.await;
        if let Err(mpsc::error::SendError(event)) = tx.send(event) {
            tracing::debug!(event = event.label(), "Screen closed, discarding late completion");
        }
    });
}
