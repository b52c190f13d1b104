//! Notification sink that reports dialogs through the log

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::traits::NotificationSink;
use crate::state::Notification;

/// Logs every status change and remembers the one currently shown
#[derive(Debug, Default)]
pub struct LogNotifier {
    current: Mutex<Option<Notification>>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// The dialog currently on screen, if any
    #[cfg(test)]
    pub fn current(&self) -> Option<Notification> {
        self.slot().clone()
    }

    /// A panic while the slot was held cannot leave it half-written, so a
    /// poisoned lock is taken over as is.
    fn slot(&self) -> MutexGuard<'_, Option<Notification>> {
        self.current.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Notification slot was poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }
}

impl NotificationSink for LogNotifier {
    fn show_status(&self, status: Option<Notification>) {
        match &status {
            Some(n) if n.is_error() => {
                tracing::error!(title = %n.title, "{}", n.text.fallback_text())
            }
            Some(n) => tracing::info!(title = %n.title, "{}", n.text.fallback_text()),
            None => tracing::debug!("Status dismissed"),
        }
        *self.slot() = status;
    }
}
