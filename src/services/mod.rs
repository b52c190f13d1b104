//! Collaborators of the settings screen

mod directory;
mod notifier;
mod preferences;
mod traits;

pub use directory::DirectoryBackend;
pub use notifier::LogNotifier;
pub use preferences::FilePreferenceStore;
pub use traits::{
    LanguageCatalog, NotificationSink, PermissionOracle, PreferenceStore, SchemaProvider,
    UserStore,
};

#[cfg(test)]
pub use traits::{
    MockLanguageCatalog, MockNotificationSink, MockPermissionOracle, MockPreferenceStore,
    MockSchemaProvider, MockUserStore,
};
