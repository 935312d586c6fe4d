//! # Simulated Network
//!
//! Every mock call waits for an artificial delay before touching data, so
//! callers exercise their loading states, and may be told to fail.
//!
//! ## Round Trip
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  call(op) ──► sleep(profile.delay(op)) ──► fault pending? ──► data     │
//! │                                                 │                       │
//! │                                                 └─ yes ─► Unavailable   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BackendError, BackendResult};

// =============================================================================
// Operation
// =============================================================================

/// A backend call, used to pick its delay and to target injected faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Login,
    Register,
    ChangePassword,
    ListDevices,
    GetDevice,
    AddDevice,
    UpdateDevice,
    DeleteDevice,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Login => "login",
            Operation::Register => "register",
            Operation::ChangePassword => "change_password",
            Operation::ListDevices => "list_devices",
            Operation::GetDevice => "get_device",
            Operation::AddDevice => "add_device",
            Operation::UpdateDevice => "update_device",
            Operation::DeleteDevice => "delete_device",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Latency Profile
// =============================================================================

/// Artificial delay per operation, in milliseconds.
///
/// ## Defaults
/// ```text
/// login 1000 • register 1500 • change_password 1000
/// list 100 • get 500 • add 1000 • update 300 • delete 300
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyProfile {
    pub login_ms: u64,
    pub register_ms: u64,
    pub change_password_ms: u64,
    pub list_devices_ms: u64,
    pub get_device_ms: u64,
    pub add_device_ms: u64,
    pub update_device_ms: u64,
    pub delete_device_ms: u64,
}

impl LatencyProfile {
    /// The delays the hosted demo used.
    pub fn realistic() -> Self {
        LatencyProfile {
            login_ms: 1000,
            register_ms: 1500,
            change_password_ms: 1000,
            list_devices_ms: 100,
            get_device_ms: 500,
            add_device_ms: 1000,
            update_device_ms: 300,
            delete_device_ms: 300,
        }
    }

    /// No delay at all; for tests.
    pub fn none() -> Self {
        LatencyProfile {
            login_ms: 0,
            register_ms: 0,
            change_password_ms: 0,
            list_devices_ms: 0,
            get_device_ms: 0,
            add_device_ms: 0,
            update_device_ms: 0,
            delete_device_ms: 0,
        }
    }

    /// Returns the delay configured for `op`.
    pub fn delay(&self, op: Operation) -> Duration {
        let ms = match op {
            Operation::Login => self.login_ms,
            Operation::Register => self.register_ms,
            Operation::ChangePassword => self.change_password_ms,
            Operation::ListDevices => self.list_devices_ms,
            Operation::GetDevice => self.get_device_ms,
            Operation::AddDevice => self.add_device_ms,
            Operation::UpdateDevice => self.update_device_ms,
            Operation::DeleteDevice => self.delete_device_ms,
        };
        Duration::from_millis(ms)
    }
}

impl Default for LatencyProfile {
    fn default() -> Self {
        LatencyProfile::realistic()
    }
}

// =============================================================================
// Simulated Network
// =============================================================================

/// Latency plus pending faults, shared by every repository of one backend.
#[derive(Debug, Default)]
pub struct SimulatedNetwork {
    latency: LatencyProfile,
    faults: Mutex<HashMap<Operation, u32>>,
}

impl SimulatedNetwork {
    pub fn new(latency: LatencyProfile) -> Self {
        SimulatedNetwork {
            latency,
            faults: Mutex::new(HashMap::new()),
        }
    }

    /// Makes the next `times` calls of `op` fail with
    /// [`BackendError::Unavailable`].
    pub fn fail_next(&self, op: Operation, times: u32) {
        let mut faults = self.faults.lock().unwrap_or_else(PoisonError::into_inner);
        *faults.entry(op).or_insert(0) += times;
        debug!(operation = %op, times, "Fault injected");
    }

    /// Drops every pending fault.
    pub fn clear_faults(&self) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Waits out the delay for `op`, then consumes one pending fault if any.
    pub async fn round_trip(&self, op: Operation) -> BackendResult<()> {
        let delay = self.latency.delay(op);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut faults = self.faults.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(remaining) = faults.get_mut(&op) {
            if *remaining > 0 {
                *remaining -= 1;
                warn!(operation = %op, "Injected backend fault");
                return Err(BackendError::Unavailable { operation: op });
            }
        }

        Ok(())
    }
}
