//! Gateway settings - preferences screen logic for the remote desktop gateway
//!
//! Loads the signed-in user's settings screen against a JSON directory,
//! merges the attribute forms every data source declares, applies any
//! requested changes (language, attributes, password) and prints the
//! resulting form layout with the user's current values.

mod app;
mod config;
mod error;
mod services;
mod state;

use anyhow::{bail, Context, Result};
use app::{Services, Session, SettingsScreen};
use config::{ScreenActions, SettingsConfig};
use services::{DirectoryBackend, FilePreferenceStore, LogNotifier};
use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gateway_settings=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = SettingsConfig::load()?.with_env_overrides();
    let actions = ScreenActions::from_env()?;

    let directory_path = config
        .directory_path
        .clone()
        .context("no directory configured (set GATEWAY_SETTINGS_DIRECTORY)")?;
    let username = config
        .username
        .clone()
        .context("no user configured (set GATEWAY_SETTINGS_USER)")?;

    let backend = Arc::new(
        DirectoryBackend::load(&directory_path)
            .with_context(|| format!("failed to load {}", directory_path.display()))?,
    );
    let available_data_sources = backend.data_source_names().await;
    let data_source = config
        .data_source
        .clone()
        .or_else(|| available_data_sources.first().cloned())
        .context("the directory defines no data sources")?;

    let services = Services {
        schema: backend.clone(),
        users: backend.clone(),
        permissions: backend.clone(),
        languages: backend,
        preferences: Arc::new(FilePreferenceStore::new(config.preferences_path())),
        notifications: Arc::new(LogNotifier::new()),
    };
    let session = Session {
        username,
        data_source,
        available_data_sources,
    };

    let mut screen = SettingsScreen::new(services, session);
    screen.activate();

    let timeout = config.load_timeout();
    if tokio::time::timeout(timeout, screen.settle()).await.is_err() {
        tracing::warn!(?timeout, "Gave up waiting for data sources");
        screen.deactivate();
    }

    let state = screen.state();
    tracing::info!(
        loaded = screen.is_loaded(),
        can_change_password = screen.can_change_password(),
        language = %screen.preferences().language,
        languages = screen.languages().len(),
        forms = state.registry.len(),
        sources_settled = state.sources_settled(),
        sources_failed = state.sources_failed.len(),
        "Preferences screen loaded"
    );
    if state.registry.is_empty() {
        tracing::warn!("No data source declared any user attributes");
    }
    for form in screen.display_forms() {
        tracing::debug!(form = %form.name, fields = ?form.field_names(), "Attribute form");
    }

    let rejected = apply_actions(&mut screen, actions).await;

    println!("{}", serde_json::to_string_pretty(&layout(&screen))?);

    if rejected > 0 {
        bail!("{rejected} requested change(s) were rejected");
    }
    Ok(())
}

/// Apply the requested changes one after another, dismissing each outcome
/// dialog. Returns how many were rejected.
async fn apply_actions(screen: &mut SettingsScreen, actions: ScreenActions) -> usize {
    if actions.is_empty() {
        return 0;
    }
    let mut rejected = 0;

    if let Some(language) = &actions.language {
        if let Err(err) = screen.set_language(language) {
            tracing::error!("Unable to change language: {err}");
            rejected += 1;
        }
        screen.acknowledge();
    }

    if !actions.attributes.is_empty() {
        let edited = actions
            .attributes
            .into_iter()
            .try_for_each(|(name, value)| screen.set_attribute(&name, value));
        let saved = match edited {
            Ok(()) => screen.save_user().await,
            Err(err) => Err(err),
        };
        if let Err(err) = saved {
            tracing::error!("Unable to save attributes: {err}");
            rejected += 1;
        }
        screen.acknowledge();
    }

    if let Some(request) = actions.password {
        if screen.can_change_password() {
            *screen.password_mut() = request;
            if let Err(err) = screen.change_password().await {
                tracing::error!(phase = ?screen.password_phase(), "Password not changed: {err}");
                rejected += 1;
            }
            screen.acknowledge();
        } else {
            tracing::error!("Not permitted to change the password");
            rejected += 1;
        }
    }

    rejected
}

/// Merged forms plus the user's current value for every field shown
fn layout(screen: &SettingsScreen) -> serde_json::Value {
    let user = screen.state().user.as_ref();
    let values: BTreeMap<&str, Option<&str>> = screen
        .display_forms()
        .iter()
        .flat_map(|form| &form.fields)
        .map(|field| {
            let value = user.and_then(|u| u.attribute(&field.name));
            (field.name.as_str(), value)
        })
        .collect();

    serde_json::json!({
        "forms": screen.display_forms(),
        "values": values,
    })
}
