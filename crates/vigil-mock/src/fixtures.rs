//! # Demo Fixtures
//!
//! The accounts and sensors every fresh mock backend starts with.
//!
//! ```text
//! ┌──────────────────────┬─────────────┬─────────┬───────────────────────┐
//! │ Account              │ Password    │ Role    │ Token                 │
//! ├──────────────────────┼─────────────┼─────────┼───────────────────────┤
//! │ owner@example.com    │ password123 │ owner   │ mock-jwt-token-owner  │
//! │ guest@example.com    │ guest123    │ guest   │ mock-jwt-token-guest  │
//! └──────────────────────┴─────────────┴─────────┴───────────────────────┘
//! ```

use vigil_core::{Device, DeviceStatus, Role, User};

pub const OWNER_EMAIL: &str = "owner@example.com";
pub const OWNER_PASSWORD: &str = "password123";
pub const OWNER_TOKEN: &str = "mock-jwt-token-owner";

pub const GUEST_EMAIL: &str = "guest@example.com";
pub const GUEST_PASSWORD: &str = "guest123";
pub const GUEST_TOKEN: &str = "mock-jwt-token-guest";

/// A fixed demo account.
#[derive(Debug, Clone)]
pub struct DemoAccount {
    pub user: User,
    pub password: &'static str,
    pub token: &'static str,
}

pub fn owner_user() -> User {
    User {
        id: "user-1".to_string(),
        name: "John Doe".to_string(),
        email: OWNER_EMAIL.to_string(),
        role: Role::Owner,
        avatar: None,
    }
}

pub fn guest_user() -> User {
    User {
        id: "user-2".to_string(),
        name: "Guest User".to_string(),
        email: GUEST_EMAIL.to_string(),
        role: Role::Guest,
        avatar: None,
    }
}

pub fn demo_accounts() -> Vec<DemoAccount> {
    vec![
        DemoAccount {
            user: owner_user(),
            password: OWNER_PASSWORD,
            token: OWNER_TOKEN,
        },
        DemoAccount {
            user: guest_user(),
            password: GUEST_PASSWORD,
            token: GUEST_TOKEN,
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn device(
    id: &str,
    name: &str,
    kind: &str,
    status: DeviceStatus,
    temperature: f64,
    humidity: u8,
    battery_level: u8,
    last_updated: &str,
) -> Device {
    Device {
        id: id.to_string(),
        name: name.to_string(),
        kind: kind.to_string(),
        status,
        temperature,
        humidity,
        battery_level,
        last_updated: last_updated.to_string(),
    }
}

/// The four sensors shown on a fresh dashboard.
pub fn seed_devices() -> Vec<Device> {
    vec![
        device("device-1", "Living Room Sensor", "Temperature", DeviceStatus::Online, 22.5, 45, 78, "10 min ago"),
        device("device-2", "Kitchen Sensor", "Humidity", DeviceStatus::Online, 24.1, 52, 92, "5 min ago"),
        device("device-3", "Bedroom Sensor", "Combined", DeviceStatus::Warning, 19.8, 38, 15, "2 hours ago"),
        device("device-4", "Garage Sensor", "Motion", DeviceStatus::Offline, 18.2, 60, 0, "1 day ago"),
    ]
}
