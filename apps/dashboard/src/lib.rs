//! # vigil-dashboard: IoT Dashboard State Layer
//!
//! Auth, device and notification state for the Vigil sensor dashboard,
//! wired to the mock backend and persisted to disk.
//!
//! ## Module Organization
//! ```text
//! vigil-dashboard/
//! ├── lib.rs           ◄─── You are here (Dashboard facade, logging)
//! ├── main.rs          ◄─── Demo session driver
//! ├── config.rs        ◄─── DashboardConfig (defaults → toml → env)
//! ├── error.rs         ◄─── StoreError {code, message}
//! └── state/
//!     ├── auth.rs          ◄─── AuthState (persisted session)
//!     ├── device.rs        ◄─── DeviceState (optimistic writes)
//!     ├── notification.rs  ◄─── NotificationState (persisted)
//!     └── persist.rs       ◄─── StateStorage, Persisted<T>
//! ```
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Dashboard::delete_device("device-3")                 │
//! │                                                                         │
//! │  1. Role gate ─────────► signed in? owner?  else NOT_AUTHENTICATED /    │
//! │                                                  PERMISSION_DENIED      │
//! │  2. Form validation ───► (add / update only)                            │
//! │  3. DeviceState ───────► optimistic patch → backend → reconcile         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod state;

pub use config::{ConfigError, DashboardConfig, StorageBackend};
pub use error::{ErrorCode, StoreError, StoreResult};
pub use state::{
    AuthState, DeviceState, FileStorage, LoadPhase, MemoryStorage, NotificationState,
    PersistError, RollbackStrategy, StateStorage,
};

use std::sync::Arc;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vigil_core::validation::{
    validate_device_update, validate_login, validate_new_device, validate_registration,
};
use vigil_core::{Device, DeviceUpdate, NewDevice, Role};
use vigil_mock::MockBackend;

/// Route the login page lives at.
pub const LOGIN_ROUTE: &str = "/login";
/// Route signed-in users land on.
pub const DASHBOARD_ROUTE: &str = "/dashboard";

// =============================================================================
// Dashboard Facade
// =============================================================================

/// Config, backend, storage and the three state containers in one place.
///
/// Adds the role policy on top of the stores: device mutations need an
/// owner session, reads need any session.
///
/// ## Usage
/// ```rust,ignore
/// let dashboard = Dashboard::new(DashboardConfig::load_or_default(None))?;
/// dashboard.sign_in("owner@example.com", "password123").await?;
/// dashboard.refresh_devices().await?;
/// dashboard.delete_device("device-4").await?;
/// ```
#[derive(Debug)]
pub struct Dashboard {
    config: DashboardConfig,
    backend: MockBackend,
    auth: AuthState,
    devices: DeviceState,
    notifications: NotificationState,
}

impl Dashboard {
    /// Builds a dashboard with the storage the config names.
    pub fn new(config: DashboardConfig) -> Result<Self, PersistError> {
        let storage: Arc<dyn StateStorage> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
            StorageBackend::File => {
                let dir = config.storage.resolve_dir().ok_or_else(|| {
                    PersistError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "Could not determine app data directory",
                    ))
                })?;
                Arc::new(FileStorage::new(dir)?)
            }
        };
        Ok(Self::with_storage(config, storage))
    }

    /// Builds a dashboard over a fresh seeded mock backend.
    pub fn with_storage(config: DashboardConfig, storage: Arc<dyn StateStorage>) -> Self {
        let backend = MockBackend::new(config.backend.latency_profile());
        Self::with_parts(config, backend, storage)
    }

    /// Builds a dashboard from explicit parts.
    pub fn with_parts(
        config: DashboardConfig,
        backend: MockBackend,
        storage: Arc<dyn StateStorage>,
    ) -> Self {
        let auth = AuthState::new(backend.auth_handle(), storage.clone());
        let devices = DeviceState::new(backend.device_handle(), config.devices.rollback);
        let notifications = NotificationState::new(storage);

        debug!(rollback = %config.devices.rollback, "Dashboard state initialized");
        Dashboard {
            config,
            backend,
            auth,
            devices,
            notifications,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn backend(&self) -> &MockBackend {
        &self.backend
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn devices(&self) -> &DeviceState {
        &self.devices
    }

    pub fn notifications(&self) -> &NotificationState {
        &self.notifications
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    /// Validates the login form, then signs in.
    pub async fn sign_in(&self, email: &str, password: &str) -> StoreResult<()> {
        validate_login(email, password)?;
        self.auth.login(email.trim(), password).await
    }

    /// Validates the registration form, then creates the account.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> StoreResult<()> {
        validate_registration(name, email, password)?;
        self.auth.register(name, email.trim(), password).await
    }

    /// The role-switch dialog: verify owner credentials, then promote.
    pub async fn switch_to_owner(&self, email: &str, password: &str) -> StoreResult<()> {
        self.require_session()?;
        validate_login(email, password)?;
        let grant = self.auth.authorize_owner(email.trim(), password).await?;
        self.auth.switch_to_owner(grant);
        Ok(())
    }

    /// Where the app should land: the dashboard when signed in, the login
    /// page otherwise. Prefixed with the configured base path.
    pub fn landing_route(&self) -> String {
        if self.auth.is_authenticated() {
            self.config.app.route(DASHBOARD_ROUTE)
        } else {
            self.config.app.route(LOGIN_ROUTE)
        }
    }

    fn require_session(&self) -> StoreResult<Role> {
        self.auth.role().ok_or_else(StoreError::not_authenticated)
    }

    fn require_owner(&self, action: &str) -> StoreResult<()> {
        if self.require_session()?.can_manage_devices() {
            Ok(())
        } else {
            info!(action = %action, "Refused device change for guest");
            Err(StoreError::permission_denied(action))
        }
    }

    // -------------------------------------------------------------------------
    // Devices
    // -------------------------------------------------------------------------

    /// Reloads the device list. Fetch failures land in the device state's
    /// `error`, not in the result.
    pub async fn refresh_devices(&self) -> StoreResult<()> {
        self.require_session()?;
        self.devices.fetch_devices().await;
        Ok(())
    }

    pub async fn add_device(&self, input: &NewDevice) -> StoreResult<Device> {
        self.require_owner("add devices")?;
        validate_new_device(input)?;
        self.devices.add_device(input).await
    }

    pub async fn update_device(&self, id: &str, update: &DeviceUpdate) -> StoreResult<Device> {
        self.require_owner("edit devices")?;
        validate_device_update(update)?;
        self.devices.update_device(id, update).await
    }

    pub async fn delete_device(&self, id: &str) -> StoreResult<()> {
        self.require_owner("delete devices")?;
        self.devices.delete_device(id).await
    }

    // -------------------------------------------------------------------------
    // Notifications
    // -------------------------------------------------------------------------

    /// Marks a notification read and returns the route it links to, if any.
    pub fn open_notification(&self, id: &str) -> Option<String> {
        self.notifications.mark_as_read(id);
        let link = self.notifications.with_snapshot(|s| {
            s.notifications
                .iter()
                .find(|n| n.id == id)
                .and_then(|n| n.link.clone())
        })?;
        Some(self.config.app.route(&link))
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=vigil_mock=trace` - Trace the mock backend only
/// - Default: INFO, DEBUG for the `vigil_*` crates
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,vigil=debug"));

    // A subscriber may already be installed by an embedding host
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
