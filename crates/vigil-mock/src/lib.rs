//! # vigil-mock: Mock Backend for the Vigil Dashboard
//!
//! An in-memory stand-in for the dashboard's network service: two demo
//! accounts, a shared device collection, per-operation latency and fault
//! injection.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vigil Data Flow                                  │
//! │                                                                         │
//! │  DeviceState::fetch_devices()                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   vigil-mock (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ MockBackend   │    │ Repositories  │    │ Simulated    │  │   │
//! │  │   │ (lib.rs)      │───►│ device.rs     │───►│ Network      │  │   │
//! │  │   │               │    │ auth.rs       │    │ latency.rs   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vigil_mock::{LatencyProfile, MockBackend, Operation};
//!
//! let backend = MockBackend::new(LatencyProfile::none());
//! let devices = backend.devices().get_all().await?;
//!
//! // Make the next delete fail to exercise rollback
//! backend.fail_next(Operation::DeleteDevice, 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fixtures;
pub mod latency;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{BackendError, BackendResult};
pub use latency::{LatencyProfile, Operation, SimulatedNetwork};
pub use repository::{AuthBackend, DeviceRepository, InMemoryDeviceRepository, MockAuthBackend};

use std::sync::Arc;

use vigil_core::Device;

/// Both mock services over one simulated network.
///
/// Cloning yields another handle onto the same data and faults.
#[derive(Debug, Clone)]
pub struct MockBackend {
    network: Arc<SimulatedNetwork>,
    auth: MockAuthBackend,
    devices: InMemoryDeviceRepository,
}

impl MockBackend {
    /// Creates a backend seeded with the demo sensors.
    pub fn new(latency: LatencyProfile) -> Self {
        Self::with_devices(latency, fixtures::seed_devices())
    }

    /// Creates a backend over a custom device collection.
    pub fn with_devices(latency: LatencyProfile, devices: Vec<Device>) -> Self {
        let network = Arc::new(SimulatedNetwork::new(latency));
        MockBackend {
            auth: MockAuthBackend::new(network.clone()),
            devices: InMemoryDeviceRepository::new(network.clone(), devices),
            network,
        }
    }

    pub fn auth(&self) -> &MockAuthBackend {
        &self.auth
    }

    pub fn devices(&self) -> &InMemoryDeviceRepository {
        &self.devices
    }

    /// Shared handle for stores that take `Arc<dyn AuthBackend>`.
    pub fn auth_handle(&self) -> Arc<dyn AuthBackend> {
        Arc::new(self.auth.clone())
    }

    /// Shared handle for stores that take `Arc<dyn DeviceRepository>`.
    pub fn device_handle(&self) -> Arc<dyn DeviceRepository> {
        Arc::new(self.devices.clone())
    }

    /// Makes the next `times` calls of `op` fail.
    pub fn fail_next(&self, op: Operation, times: u32) {
        self.network.fail_next(op, times);
    }

    pub fn clear_faults(&self) {
        self.network.clear_faults();
    }
}
