//! # Device State
//!
//! The device collection as the dashboard last saw it, plus loading / error
//! flags for the list view.
//!
//! ## Optimistic Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    update_device / delete_device                        │
//! │                                                                         │
//! │  1. Snapshot ──────► keep a copy of the collection                     │
//! │  2. Local patch ───► rewrite / remove the device immediately           │
//! │  3. Remote call ───► repository.update / repository.delete             │
//! │         │                                                               │
//! │         ├── Ok ────► done (local patch already matches)                │
//! │         │                                                               │
//! │         └── Err ───► reconcile per RollbackStrategy                    │
//! │                        Refetch: collection = repository.get_all()      │
//! │                                 (falls back to the snapshot if the     │
//! │                                  refetch fails too)                    │
//! │                        Restore: collection = snapshot                  │
//! │                      error = "Failed to ... device", Err returned      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `add_device` is not optimistic: the backend assigns id and readings, so
//! the device is appended once the call resolves.
//!
//! ## Concurrency
//! The snapshot mutex is released before every `.await`. Two in-flight
//! writes to the same id are not serialized; whichever resolves last wins.

use std::sync::{Arc, Mutex, PoisonError};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use vigil_core::{synthesize_history, Device, DeviceUpdate, HistoricalSample, NewDevice, TimeRange};
use vigil_mock::DeviceRepository;

use crate::error::{StoreError, StoreResult};

pub const FETCH_FAILED: &str = "Failed to fetch devices";
pub const ADD_FAILED: &str = "Failed to add device";
pub const UPDATE_FAILED: &str = "Failed to update device";
pub const DELETE_FAILED: &str = "Failed to delete device";

// =============================================================================
// Rollback Strategy
// =============================================================================

/// How local state is reconciled after a failed optimistic write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackStrategy {
    /// Replace the collection with a fresh `get_all`
    #[default]
    Refetch,
    /// Put back the collection as it was before the write
    Restore,
}

impl std::fmt::Display for RollbackStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RollbackStrategy::Refetch => write!(f, "refetch"),
            RollbackStrategy::Restore => write!(f, "restore"),
        }
    }
}

impl std::str::FromStr for RollbackStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "refetch" => Ok(RollbackStrategy::Refetch),
            "restore" => Ok(RollbackStrategy::Restore),
            _ => Err(format!("Unknown rollback strategy: {}", s)),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Where the list view is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPhase {
    /// Nothing requested yet
    Idle,
    Loading,
    /// Last operation failed; `error` holds the message
    Error,
    Ready,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSnapshot {
    pub devices: Vec<Device>,
    pub loading: bool,
    pub error: Option<String>,
    /// Set once the first fetch succeeded.
    pub has_loaded: bool,
}

impl DeviceSnapshot {
    pub fn phase(&self) -> LoadPhase {
        if self.loading {
            LoadPhase::Loading
        } else if self.error.is_some() {
            LoadPhase::Error
        } else if self.has_loaded {
            LoadPhase::Ready
        } else {
            LoadPhase::Idle
        }
    }
}

// =============================================================================
// Device State
// =============================================================================

#[derive(Debug)]
pub struct DeviceState {
    repository: Arc<dyn DeviceRepository>,
    snapshot: Mutex<DeviceSnapshot>,
    rollback: RollbackStrategy,
}

impl DeviceState {
    /// Creates an empty state; call [`fetch_devices`](Self::fetch_devices)
    /// to populate it.
    pub fn new(repository: Arc<dyn DeviceRepository>, rollback: RollbackStrategy) -> Self {
        DeviceState {
            repository,
            snapshot: Mutex::new(DeviceSnapshot::default()),
            rollback,
        }
    }

    pub fn rollback_strategy(&self) -> RollbackStrategy {
        self.rollback
    }

    /// Executes a function with read access to the snapshot.
    pub fn with_snapshot<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&DeviceSnapshot) -> R,
    {
        let snapshot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        f(&snapshot)
    }

    fn with_snapshot_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut DeviceSnapshot) -> R,
    {
        let mut snapshot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut snapshot)
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        self.with_snapshot(|s| s.clone())
    }

    pub fn devices(&self) -> Vec<Device> {
        self.with_snapshot(|s| s.devices.clone())
    }

    pub fn device(&self, id: &str) -> Option<Device> {
        self.with_snapshot(|s| s.devices.iter().find(|d| d.id == id).cloned())
    }

    pub fn is_loading(&self) -> bool {
        self.with_snapshot(|s| s.loading)
    }

    pub fn error(&self) -> Option<String> {
        self.with_snapshot(|s| s.error.clone())
    }

    pub fn phase(&self) -> LoadPhase {
        self.with_snapshot(DeviceSnapshot::phase)
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Loads the collection from the repository.
    ///
    /// Failures are recorded in `error` and not returned; the previous
    /// collection stays in place.
    pub async fn fetch_devices(&self) {
        self.with_snapshot_mut(|s| {
            s.loading = true;
            s.error = None;
        });

        match self.repository.get_all().await {
            Ok(devices) => {
                info!(count = devices.len(), "Devices loaded");
                self.with_snapshot_mut(|s| {
                    s.devices = devices;
                    s.loading = false;
                    s.has_loaded = true;
                });
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch devices");
                self.with_snapshot_mut(|s| {
                    s.loading = false;
                    s.error = Some(FETCH_FAILED.to_string());
                });
            }
        }
    }

    /// Registers a device and appends the backend's record.
    pub async fn add_device(&self, input: &NewDevice) -> StoreResult<Device> {
        self.with_snapshot_mut(|s| {
            s.loading = true;
            s.error = None;
        });

        match self.repository.add(input).await {
            Ok(device) => {
                info!(device_id = %device.id, name = %device.name, "Device added");
                self.with_snapshot_mut(|s| {
                    s.devices.push(device.clone());
                    s.loading = false;
                });
                Ok(device)
            }
            Err(e) => {
                error!(error = %e, "Failed to add device");
                self.with_snapshot_mut(|s| {
                    s.loading = false;
                    s.error = Some(ADD_FAILED.to_string());
                });
                Err(e.into())
            }
        }
    }

    /// Renames / retypes a device optimistically.
    pub async fn update_device(&self, id: &str, update: &DeviceUpdate) -> StoreResult<Device> {
        let before = self.with_snapshot_mut(|s| {
            let before = s.devices.clone();
            if let Some(device) = s.devices.iter_mut().find(|d| d.id == id) {
                device.apply_update(update);
            }
            before
        });

        match self.repository.update(id, update).await {
            Ok(device) => {
                debug!(device_id = %id, "Device update confirmed");
                Ok(device)
            }
            Err(e) => {
                error!(device_id = %id, error = %e, "Failed to update device");
                self.fail_write(UPDATE_FAILED, before).await;
                Err(e.into())
            }
        }
    }

    /// Removes a device optimistically.
    pub async fn delete_device(&self, id: &str) -> StoreResult<()> {
        let before = self.with_snapshot_mut(|s| {
            let before = s.devices.clone();
            s.devices.retain(|d| d.id != id);
            before
        });

        match self.repository.delete(id).await {
            Ok(()) => {
                debug!(device_id = %id, "Device delete confirmed");
                Ok(())
            }
            Err(e) => {
                error!(device_id = %id, error = %e, "Failed to delete device");
                self.fail_write(DELETE_FAILED, before).await;
                Err(e.into())
            }
        }
    }

    /// Records the failure and reconciles the optimistic patch.
    async fn fail_write(&self, message: &str, before: Vec<Device>) {
        self.with_snapshot_mut(|s| s.error = Some(message.to_string()));

        let devices = match self.rollback {
            RollbackStrategy::Restore => before,
            RollbackStrategy::Refetch => match self.repository.get_all().await {
                Ok(devices) => devices,
                Err(e) => {
                    warn!(error = %e, "Refetch after failed write failed; restoring snapshot");
                    before
                }
            },
        };

        debug!(strategy = %self.rollback, count = devices.len(), "Reconciled devices");
        self.with_snapshot_mut(|s| s.devices = devices);
    }

    // -------------------------------------------------------------------------
    // Charts
    // -------------------------------------------------------------------------

    /// Chart series for a device; empty for an unknown id.
    ///
    /// Every call draws fresh jitter.
    pub fn historical_data(&self, id: &str, range: TimeRange) -> Vec<HistoricalSample> {
        self.historical_data_with(id, range, &mut rand::rng())
    }

    /// Like [`historical_data`](Self::historical_data) with a caller-supplied
    /// random source.
    pub fn historical_data_with<R: Rng>(
        &self,
        id: &str,
        range: TimeRange,
        rng: &mut R,
    ) -> Vec<HistoricalSample> {
        match self.device(id) {
            Some(device) => synthesize_history(&device, range, rng),
            None => {
                debug!(device_id = %id, "No history for unknown device");
                Vec::new()
            }
        }
    }

    /// Parses a range label ("24h", "7d", "30d") and builds the series.
    pub fn historical_data_for(&self, id: &str, range: &str) -> StoreResult<Vec<HistoricalSample>> {
        let range: TimeRange = range.parse().map_err(StoreError::from)?;
        Ok(self.historical_data(id, range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use vigil_mock::{LatencyProfile, MockBackend, Operation};

    fn state(rollback: RollbackStrategy) -> (MockBackend, DeviceState) {
        let backend = MockBackend::new(LatencyProfile::none());
        let state = DeviceState::new(backend.device_handle(), rollback);
        (backend, state)
    }

    async fn loaded(rollback: RollbackStrategy) -> (MockBackend, DeviceState) {
        let (backend, state) = state(rollback);
        state.fetch_devices().await;
        (backend, state)
    }

    fn ids(state: &DeviceState) -> Vec<String> {
        state.devices().into_iter().map(|d| d.id).collect()
    }

    #[tokio::test]
    async fn test_fetch_devices() {
        let (_, state) = state(RollbackStrategy::Refetch);
        assert_eq!(state.phase(), LoadPhase::Idle);

        state.fetch_devices().await;
        assert_eq!(state.phase(), LoadPhase::Ready);
        assert_eq!(ids(&state), vec!["device-1", "device-2", "device-3", "device-4"]);
        assert!(!state.is_loading());
        assert_eq!(state.error(), None);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_collection() {
        let (backend, state) = loaded(RollbackStrategy::Refetch).await;
        backend.fail_next(Operation::ListDevices, 1);

        state.fetch_devices().await;
        assert_eq!(state.devices().len(), 4);
        assert_eq!(state.error().as_deref(), Some(FETCH_FAILED));
        assert_eq!(state.phase(), LoadPhase::Error);

        // A later success clears the error
        state.fetch_devices().await;
        assert_eq!(state.phase(), LoadPhase::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_flag_while_in_flight() {
        let backend = MockBackend::new(LatencyProfile::realistic());
        let state = Arc::new(DeviceState::new(backend.device_handle(), RollbackStrategy::Refetch));

        let task = tokio::spawn({
            let state = state.clone();
            async move { state.fetch_devices().await }
        });
        tokio::task::yield_now().await;
        assert_eq!(state.phase(), LoadPhase::Loading);

        task.await.unwrap();
        assert_eq!(state.phase(), LoadPhase::Ready);
    }

    #[tokio::test]
    async fn test_add_device_appends() {
        let (_, state) = loaded(RollbackStrategy::Refetch).await;
        let device = state
            .add_device(&NewDevice::new("New Sensor", "Combined", "SN123"))
            .await
            .unwrap();

        assert_eq!(state.devices().len(), 5);
        assert_eq!(state.devices().last(), Some(&device));
        assert!(!state.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_device_shows_loading_until_resolved() {
        let backend = MockBackend::new(LatencyProfile::realistic());
        let state = Arc::new(DeviceState::new(backend.device_handle(), RollbackStrategy::Refetch));
        state.fetch_devices().await;

        let task = tokio::spawn({
            let state = state.clone();
            async move {
                state
                    .add_device(&NewDevice::new("Garage Sensor", "Temperature", "SN-GARAGE"))
                    .await
            }
        });
        tokio::task::yield_now().await;
        assert_eq!(state.phase(), LoadPhase::Loading);
        assert_eq!(state.devices().len(), 4);

        let device = task.await.unwrap().unwrap();
        assert_eq!(state.phase(), LoadPhase::Ready);
        assert_eq!(state.device(&device.id), Some(device));
    }

    #[tokio::test]
    async fn test_add_device_failure() {
        let (backend, state) = loaded(RollbackStrategy::Refetch).await;
        backend.fail_next(Operation::AddDevice, 1);

        let err = state
            .add_device(&NewDevice::new("New Sensor", "Combined", "SN123"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BackendUnavailable);
        assert_eq!(state.devices().len(), 4);
        assert_eq!(state.error().as_deref(), Some(ADD_FAILED));
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_update_device_changes_only_name_and_type() {
        let (backend, state) = loaded(RollbackStrategy::Refetch).await;
        let before = state.device("device-2").unwrap();

        state
            .update_device("device-2", &DeviceUpdate::new("Pantry Sensor", "Combined"))
            .await
            .unwrap();

        let after = state.device("device-2").unwrap();
        assert_eq!(after.name, "Pantry Sensor");
        assert_eq!(after.kind, "Combined");
        assert_eq!(after.last_updated, vigil_core::JUST_NOW);
        assert_eq!(after.temperature, before.temperature);
        assert_eq!(after.humidity, before.humidity);
        assert_eq!(after.battery_level, before.battery_level);
        assert_eq!(after.status, before.status);
        assert_eq!(backend.devices().get_by_id("device-2").await.unwrap(), Some(after));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_is_visible_before_backend_confirms() {
        let backend = MockBackend::new(LatencyProfile::realistic());
        let state = Arc::new(DeviceState::new(backend.device_handle(), RollbackStrategy::Refetch));
        state.fetch_devices().await;

        let task = tokio::spawn({
            let state = state.clone();
            async move {
                state
                    .update_device("device-1", &DeviceUpdate::new("Lounge Sensor", "Temperature"))
                    .await
            }
        });
        tokio::task::yield_now().await;
        assert_eq!(state.device("device-1").unwrap().name, "Lounge Sensor");
        assert_eq!(state.phase(), LoadPhase::Ready);

        let confirmed = task.await.unwrap().unwrap();
        assert_eq!(confirmed.name, "Lounge Sensor");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_is_visible_before_backend_confirms() {
        let backend = MockBackend::new(LatencyProfile::realistic());
        let state = Arc::new(DeviceState::new(backend.device_handle(), RollbackStrategy::Refetch));
        state.fetch_devices().await;

        let task = tokio::spawn({
            let state = state.clone();
            async move { state.delete_device("device-3").await }
        });
        tokio::task::yield_now().await;
        assert!(state.device("device-3").is_none());
        assert!(!task.is_finished());
        assert_eq!(state.phase(), LoadPhase::Ready);

        task.await.unwrap().unwrap();
        assert!(state.device("device-3").is_none());
        assert_eq!(state.devices().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_update_refetches() {
        let (backend, state) = loaded(RollbackStrategy::Refetch).await;
        backend.fail_next(Operation::UpdateDevice, 1);

        let err = state
            .update_device("device-1", &DeviceUpdate::new("Lounge Sensor", "Temperature"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::BackendUnavailable);
        assert_eq!(state.error().as_deref(), Some(UPDATE_FAILED));
        assert_eq!(state.devices(), backend.devices().get_all().await.unwrap());
        assert_eq!(state.device("device-1").unwrap().name, "Living Room Sensor");
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let (_, state) = loaded(RollbackStrategy::Refetch).await;
        let before = state.devices();

        let err = state
            .update_device("device-99", &DeviceUpdate::new("Ghost", "Motion"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(state.devices(), before);
        assert_eq!(state.error().as_deref(), Some(UPDATE_FAILED));
    }

    #[tokio::test]
    async fn test_failed_delete_refetches() {
        let (backend, state) = loaded(RollbackStrategy::Refetch).await;
        backend.fail_next(Operation::DeleteDevice, 1);

        let err = state.delete_device("device-3").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BackendUnavailable);
        assert_eq!(state.error().as_deref(), Some(DELETE_FAILED));
        assert!(state.device("device-3").is_some());
        assert_eq!(state.devices(), backend.devices().get_all().await.unwrap());
    }

    #[tokio::test]
    async fn test_restore_strategy_puts_back_snapshot() {
        let (backend, state) = loaded(RollbackStrategy::Restore).await;
        let before = state.devices();

        backend.fail_next(Operation::DeleteDevice, 1);
        state.delete_device("device-1").await.unwrap_err();
        assert_eq!(state.devices(), before);

        backend.fail_next(Operation::UpdateDevice, 1);
        state
            .update_device("device-2", &DeviceUpdate::new("Pantry Sensor", "Combined"))
            .await
            .unwrap_err();
        assert_eq!(state.devices(), before);
    }

    #[tokio::test]
    async fn test_refetch_failure_falls_back_to_snapshot() {
        let (backend, state) = loaded(RollbackStrategy::Refetch).await;
        let before = state.devices();

        backend.fail_next(Operation::DeleteDevice, 1);
        backend.fail_next(Operation::ListDevices, 1);
        let err = state.delete_device("device-4").await.unwrap_err();

        // The delete failure is reported, not the refetch one
        assert_eq!(err.code, ErrorCode::BackendUnavailable);
        assert!(err.message.contains("delete_device"));
        assert_eq!(state.devices(), before);
    }

    #[tokio::test]
    async fn test_delete_device() {
        let (backend, state) = loaded(RollbackStrategy::Refetch).await;
        state.delete_device("device-2").await.unwrap();

        assert_eq!(ids(&state), vec!["device-1", "device-3", "device-4"]);
        assert_eq!(backend.devices().len(), 3);
    }

    #[tokio::test]
    async fn test_historical_data() {
        let (_, state) = loaded(RollbackStrategy::Refetch).await;
        let mut rng = StdRng::seed_from_u64(42);

        let week = state.historical_data_with("device-1", TimeRange::Week, &mut rng);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].time, "Mon");
        for sample in &week {
            assert!((sample.temperature - 22.5).abs() <= 2.0 + 1e-9);
            assert!((40..=50).contains(&sample.humidity));
        }

        assert_eq!(state.historical_data("device-1", TimeRange::Day).len(), 24);
        assert!(state.historical_data("device-99", TimeRange::Month).is_empty());
    }

    #[tokio::test]
    async fn test_historical_data_for_label() {
        let (_, state) = loaded(RollbackStrategy::Refetch).await;
        assert_eq!(state.historical_data_for("device-1", "30d").unwrap().len(), 30);

        let err = state.historical_data_for("device-1", "1y").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_rollback_strategy_parsing() {
        assert_eq!("refetch".parse::<RollbackStrategy>().unwrap(), RollbackStrategy::Refetch);
        assert_eq!("RESTORE".parse::<RollbackStrategy>().unwrap(), RollbackStrategy::Restore);
        assert!("undo".parse::<RollbackStrategy>().is_err());
    }
}
