//! # Repository Module
//!
//! The backend seam the dashboard stores talk to.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  DeviceState / AuthState                                               │
//! │       │                                                                 │
//! │       │  Arc<dyn DeviceRepository>, Arc<dyn AuthBackend>               │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────┐   ┌───────────────────────────────┐     │
//! │  │ InMemoryDeviceRepository  │   │ (a real HTTP client would     │     │
//! │  │ MockAuthBackend           │   │  implement the same traits)   │     │
//! │  └───────────────────────────┘   └───────────────────────────────┘     │
//! │                                                                         │
//! │  Stores never reach for global state: every test builds its own        │
//! │  backend and hands it in.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Implementations
//!
//! - [`InMemoryDeviceRepository`] - Device CRUD over a shared `Vec`
//! - [`MockAuthBackend`] - Fixed demo accounts

pub mod auth;
pub mod device;

use async_trait::async_trait;
use vigil_core::{AuthSession, Device, DeviceUpdate, NewDevice};

use crate::error::BackendResult;

pub use auth::MockAuthBackend;
pub use device::InMemoryDeviceRepository;

/// Account operations.
#[async_trait]
pub trait AuthBackend: Send + Sync + std::fmt::Debug {
    /// Exchanges credentials for a session.
    ///
    /// ## Errors
    /// [`BackendError::AuthenticationFailed`](crate::BackendError::AuthenticationFailed)
    /// when the pair matches no account.
    async fn login(&self, email: &str, password: &str) -> BackendResult<AuthSession>;

    /// Creates an account and signs it in.
    async fn register(&self, name: &str, email: &str, password: &str) -> BackendResult<AuthSession>;

    /// Changes the password of the account holding `token`.
    async fn change_password(&self, token: &str, current: &str, new: &str) -> BackendResult<()>;
}

/// Device CRUD.
#[async_trait]
pub trait DeviceRepository: Send + Sync + std::fmt::Debug {
    /// Returns the whole collection in display order.
    async fn get_all(&self) -> BackendResult<Vec<Device>>;

    /// Returns one device, `None` if the id is unknown.
    async fn get_by_id(&self, id: &str) -> BackendResult<Option<Device>>;

    /// Registers a device; the backend assigns id, status and readings.
    async fn add(&self, input: &NewDevice) -> BackendResult<Device>;

    /// Renames / retypes a device.
    ///
    /// ## Errors
    /// [`BackendError::NotFound`](crate::BackendError::NotFound) for an unknown id.
    async fn update(&self, id: &str, update: &DeviceUpdate) -> BackendResult<Device>;

    /// Removes a device.
    ///
    /// ## Errors
    /// [`BackendError::NotFound`](crate::BackendError::NotFound) for an unknown id.
    async fn delete(&self, id: &str) -> BackendResult<()>;
}
