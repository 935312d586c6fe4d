//! # Domain Types
//!
//! Core domain types shared by the mock backend and the dashboard stores.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │     Device      │   │  Notification   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  name, email    │   │  name, type     │   │  title, message │       │
//! │  │  role           │   │  status         │   │  type, isRead   │       │
//! │  │  avatar?        │   │  readings       │   │  timestamp      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Role       │   │  DeviceStatus   │   │NotificationKind │       │
//! │  │  Owner          │   │  Online         │   │  Info / Success │       │
//! │  │  Guest          │   │  Offline        │   │  Warning        │       │
//! │  └─────────────────┘   │  Warning        │   │  Error          │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Every type serializes with camelCase field names (`batteryLevel`,
//! `lastUpdated`, `isRead`) and lowercase enum values, which is the JSON
//! shape the browser client reads and persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// `lastUpdated` label written by every local or remote device edit.
pub const JUST_NOW: &str = "just now";

// =============================================================================
// Role
// =============================================================================

/// The role a signed-in user acts under.
///
/// ## Rights
/// - `Owner`: full CRUD over devices
/// - `Guest`: read-only device access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Guest,
}

impl Role {
    /// Returns true if this role may add, edit or delete devices.
    #[inline]
    pub const fn can_manage_devices(&self) -> bool {
        matches!(self, Role::Owner)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Guest => write!(f, "guest"),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A dashboard user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Avatar URL or data URL. Empty string and `None` both mean "no avatar".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    /// Returns a copy of this user acting under a different role.
    pub fn with_role(&self, role: Role) -> Self {
        User {
            role,
            ..self.clone()
        }
    }
}

/// Successful authentication result: the user plus a bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

// =============================================================================
// Device
// =============================================================================

/// Connectivity / health status reported for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
    Warning,
}

/// A monitored IoT sensor and its latest reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Server-assigned identifier, unique within a collection.
    pub id: String,

    pub name: String,

    /// Free-form sensor category ("Temperature", "Humidity", "Combined", ...).
    #[serde(rename = "type")]
    pub kind: String,

    pub status: DeviceStatus,

    /// Degrees Celsius, one decimal place.
    pub temperature: f64,

    /// Relative humidity, percent.
    pub humidity: u8,

    /// Battery charge, 0-100.
    pub battery_level: u8,

    /// Human-readable age of the reading ("10 min ago", "just now").
    pub last_updated: String,
}

impl Device {
    /// Applies a name/type edit the way both the backend and the optimistic
    /// local write do it.
    pub fn apply_update(&mut self, update: &DeviceUpdate) {
        self.name = update.name.clone();
        self.kind = update.kind.clone();
        self.last_updated = JUST_NOW.to_string();
    }
}

/// Input for registering a new device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub serial_number: String,
}

impl NewDevice {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        serial_number: impl Into<String>,
    ) -> Self {
        NewDevice {
            name: name.into(),
            kind: kind.into(),
            serial_number: serial_number.into(),
        }
    }
}

/// Editable device fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpdate {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl DeviceUpdate {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        DeviceUpdate {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

// =============================================================================
// Notification
// =============================================================================

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
    Success,
}

/// An entry in the notification center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub is_read: bool,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    /// In-app route to open when the notification is clicked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Caller-supplied part of a notification; id, timestamp and read flag are
/// assigned by the notification store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl NewNotification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        NewNotification {
            title: title.into(),
            message: message.into(),
            kind,
            link: None,
        }
    }

    /// Attaches an in-app route.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_device() -> Device {
        Device {
            id: "device-1".to_string(),
            name: "Living Room Sensor".to_string(),
            kind: "Temperature".to_string(),
            status: DeviceStatus::Online,
            temperature: 22.5,
            humidity: 45,
            battery_level: 78,
            last_updated: "10 min ago".to_string(),
        }
    }

    #[test]
    fn test_device_serializes_camel_case() {
        let json = serde_json::to_value(sample_device()).unwrap();
        assert_eq!(json["type"], "Temperature");
        assert_eq!(json["batteryLevel"], 78);
        assert_eq!(json["lastUpdated"], "10 min ago");
        assert_eq!(json["status"], "online");
    }

    #[test]
    fn test_apply_update_touches_only_edit_fields() {
        let mut device = sample_device();
        device.apply_update(&DeviceUpdate::new("Den Sensor", "Combined"));

        assert_eq!(device.name, "Den Sensor");
        assert_eq!(device.kind, "Combined");
        assert_eq!(device.last_updated, JUST_NOW);
        assert_eq!(device.temperature, 22.5);
        assert_eq!(device.battery_level, 78);
    }

    #[test]
    fn test_user_without_avatar_deserializes() {
        let user: User = serde_json::from_str(
            r#"{"id":"user-1","name":"John Doe","email":"owner@example.com","role":"owner"}"#,
        )
        .unwrap();
        assert_eq!(user.role, Role::Owner);
        assert!(user.avatar.is_none());
    }

    #[test]
    fn test_with_role_keeps_identity() {
        let user = User {
            id: "user-1".to_string(),
            name: "John Doe".to_string(),
            email: "owner@example.com".to_string(),
            role: Role::Owner,
            avatar: None,
        };
        let guest = user.with_role(Role::Guest);
        assert_eq!(guest.id, user.id);
        assert_eq!(guest.role, Role::Guest);
    }

    #[test]
    fn test_role_rights() {
        assert!(Role::Owner.can_manage_devices());
        assert!(!Role::Guest.can_manage_devices());
    }
}
