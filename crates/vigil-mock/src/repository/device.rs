//! # Device Repository
//!
//! In-memory device collection with simulated latency.
//!
//! Clones share the same collection, the way every page of the browser
//! client saw one module-level array. Two separately constructed
//! repositories are fully isolated.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;
use uuid::Uuid;
use vigil_core::history::round_tenths;
use vigil_core::{Device, DeviceStatus, DeviceUpdate, NewDevice, JUST_NOW};

use super::DeviceRepository;
use crate::error::{BackendError, BackendResult};
use crate::latency::{Operation, SimulatedNetwork};

/// Repository for device operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = InMemoryDeviceRepository::new(network, fixtures::seed_devices());
///
/// let devices = repo.get_all().await?;
/// let added = repo.add(&NewDevice::new("Attic Sensor", "Temperature", "SN-1")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryDeviceRepository {
    devices: Arc<Mutex<Vec<Device>>>,
    network: Arc<SimulatedNetwork>,
}

impl InMemoryDeviceRepository {
    /// Creates a repository over `devices`.
    pub fn new(network: Arc<SimulatedNetwork>, devices: Vec<Device>) -> Self {
        InMemoryDeviceRepository {
            devices: Arc::new(Mutex::new(devices)),
            network,
        }
    }

    /// Number of stored devices, without simulated latency.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Device>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Builds the record for a newly registered device with mock readings:
    /// temperature 15-30 °C, humidity 30-70 %, battery 70-100 %.
    fn provision(input: &NewDevice) -> Device {
        let mut rng = rand::rng();
        Device {
            id: format!("device-{}", Uuid::new_v4()),
            name: input.name.trim().to_string(),
            kind: input.kind.trim().to_string(),
            status: DeviceStatus::Online,
            temperature: round_tenths(rng.random_range(15.0..=30.0)),
            humidity: rng.random_range(30..=70),
            battery_level: rng.random_range(70..=100),
            last_updated: JUST_NOW.to_string(),
        }
    }
}

#[async_trait]
impl DeviceRepository for InMemoryDeviceRepository {
    async fn get_all(&self) -> BackendResult<Vec<Device>> {
        self.network.round_trip(Operation::ListDevices).await?;

        let devices = self.lock().clone();
        debug!(count = devices.len(), "Listed devices");
        Ok(devices)
    }

    async fn get_by_id(&self, id: &str) -> BackendResult<Option<Device>> {
        self.network.round_trip(Operation::GetDevice).await?;

        Ok(self.lock().iter().find(|d| d.id == id).cloned())
    }

    async fn add(&self, input: &NewDevice) -> BackendResult<Device> {
        self.network.round_trip(Operation::AddDevice).await?;

        let device = Self::provision(input);
        self.lock().push(device.clone());

        debug!(
            device_id = %device.id,
            serial_number = %input.serial_number,
            "Device added"
        );
        Ok(device)
    }

    async fn update(&self, id: &str, update: &DeviceUpdate) -> BackendResult<Device> {
        self.network.round_trip(Operation::UpdateDevice).await?;

        let mut devices = self.lock();
        let device = devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| BackendError::not_found("Device", id))?;

        device.apply_update(update);
        debug!(device_id = %id, "Device updated");
        Ok(device.clone())
    }

    async fn delete(&self, id: &str) -> BackendResult<()> {
        self.network.round_trip(Operation::DeleteDevice).await?;

        let mut devices = self.lock();
        let index = devices
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| BackendError::not_found("Device", id))?;

        devices.remove(index);
        debug!(device_id = %id, "Device deleted");
        Ok(())
    }
}
