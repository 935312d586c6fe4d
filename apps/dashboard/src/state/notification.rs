//! # Notification State
//!
//! The notification center, persisted under `notification-storage`.
//!
//! Every mutation recomputes `unread_count` from the list, so the count can
//! never drift from the `is_read` flags, including after a restore from a
//! hand-edited blob.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;
use vigil_core::{NewNotification, Notification, NotificationKind};

use super::persist::{Persisted, StateStorage};

/// Persisted `{notifications, unreadCount}` layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSnapshot {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

impl NotificationSnapshot {
    fn new(notifications: Vec<Notification>) -> Self {
        let mut snapshot = NotificationSnapshot {
            notifications,
            unread_count: 0,
        };
        snapshot.recount();
        snapshot
    }

    fn recount(&mut self) {
        self.unread_count = self.notifications.iter().filter(|n| !n.is_read).count();
    }
}

/// What a fresh install shows: two unread alerts, two read messages.
pub fn seed_notifications() -> Vec<Notification> {
    let now = Utc::now();
    let seed = |id: &str, title: &str, message: &str, kind, is_read, age: Duration| Notification {
        id: id.to_string(),
        title: title.to_string(),
        message: message.to_string(),
        kind,
        is_read,
        timestamp: now - age,
        link: None,
    };

    vec![
        seed(
            "notif-1",
            "Temperature Alert",
            "Living Room Sensor reported high temperature!",
            NotificationKind::Warning,
            false,
            Duration::minutes(15),
        ),
        seed(
            "notif-2",
            "Device Offline",
            "Garage Sensor is offline for more than 24 hours.",
            NotificationKind::Error,
            false,
            Duration::hours(24),
        ),
        seed(
            "notif-3",
            "Battery Low",
            "Bedroom Sensor battery level is below 20%.",
            NotificationKind::Warning,
            true,
            Duration::hours(2),
        ),
        seed(
            "notif-4",
            "System Update",
            "A new system update is available for your devices.",
            NotificationKind::Info,
            true,
            Duration::days(3),
        ),
    ]
}

#[derive(Debug)]
pub struct NotificationState {
    snapshot: Mutex<NotificationSnapshot>,
    persisted: Persisted<NotificationSnapshot>,
}

impl NotificationState {
    pub const STORAGE_KEY: &'static str = "notification-storage";

    /// Restores the persisted list, or seeds a fresh install.
    pub fn new(storage: Arc<dyn StateStorage>) -> Self {
        let persisted: Persisted<NotificationSnapshot> = Persisted::new(storage, Self::STORAGE_KEY);
        let snapshot = match persisted.restore() {
            Some(restored) => NotificationSnapshot::new(restored.notifications),
            None => {
                debug!("Seeding notification center");
                NotificationSnapshot::new(seed_notifications())
            }
        };

        NotificationState {
            snapshot: Mutex::new(snapshot),
            persisted,
        }
    }

    /// Executes a function with read access to the snapshot.
    pub fn with_snapshot<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&NotificationSnapshot) -> R,
    {
        let snapshot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        f(&snapshot)
    }

    /// Mutates, recounts and persists.
    fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Vec<Notification>) -> R,
    {
        let mut snapshot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut snapshot.notifications);
        snapshot.recount();
        self.persisted.commit(&snapshot);
        result
    }

    pub fn snapshot(&self) -> NotificationSnapshot {
        self.with_snapshot(|s| s.clone())
    }

    /// Newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.with_snapshot(|s| s.notifications.clone())
    }

    pub fn unread(&self) -> Vec<Notification> {
        self.with_snapshot(|s| s.notifications.iter().filter(|n| !n.is_read).cloned().collect())
    }

    pub fn unread_count(&self) -> usize {
        self.with_snapshot(|s| s.unread_count)
    }

    /// Prepends an unread notification stamped now.
    pub fn add(&self, input: NewNotification) -> Notification {
        let notification = Notification {
            id: format!("notif-{}", Uuid::new_v4()),
            title: input.title,
            message: input.message,
            kind: input.kind,
            is_read: false,
            timestamp: Utc::now(),
            link: input.link,
        };

        info!(id = %notification.id, kind = ?notification.kind, "Notification added");
        self.update(|list| list.insert(0, notification.clone()));
        notification
    }

    /// Marks one notification read. Unknown ids are ignored.
    pub fn mark_as_read(&self, id: &str) {
        self.update(|list| {
            if let Some(n) = list.iter_mut().find(|n| n.id == id) {
                n.is_read = true;
            }
        });
    }

    pub fn mark_all_as_read(&self) {
        self.update(|list| list.iter_mut().for_each(|n| n.is_read = true));
        debug!("All notifications marked read");
    }

    /// Removes one notification. Unknown ids are ignored.
    pub fn remove(&self, id: &str) {
        self.update(|list| list.retain(|n| n.id != id));
    }

    pub fn clear(&self) {
        self.update(Vec::clear);
        debug!("Notifications cleared");
    }
}
