//! End-to-end flows through the `Dashboard` facade.

use std::sync::Arc;

use vigil_core::{DeviceStatus, DeviceUpdate, NewDevice, NewNotification, NotificationKind, Role, TimeRange};
use vigil_dashboard::{
    Dashboard, DashboardConfig, DeviceState, ErrorCode, FileStorage, LoadPhase, MemoryStorage,
    RollbackStrategy, StateStorage,
};
use vigil_mock::fixtures::*;
use vigil_mock::{LatencyProfile, MockBackend, Operation};

fn dashboard() -> Dashboard {
    Dashboard::with_storage(DashboardConfig::ephemeral(), Arc::new(MemoryStorage::new()))
}

async fn owner_dashboard() -> Dashboard {
    let dashboard = dashboard();
    dashboard.sign_in(OWNER_EMAIL, OWNER_PASSWORD).await.unwrap();
    dashboard.refresh_devices().await.unwrap();
    dashboard
}

// =============================================================================
// Session
// =============================================================================

#[tokio::test]
async fn test_owner_login_scenario() {
    let dashboard = dashboard();
    dashboard.sign_in(OWNER_EMAIL, OWNER_PASSWORD).await.unwrap();

    let auth = dashboard.auth();
    assert!(auth.is_authenticated());
    assert_eq!(auth.role(), Some(Role::Owner));
    assert_eq!(auth.token().as_deref(), Some("mock-jwt-token-owner"));
}

#[tokio::test]
async fn test_only_fixed_pairs_sign_in() {
    let dashboard = dashboard();
    for (email, password, role) in [
        (OWNER_EMAIL, OWNER_PASSWORD, Role::Owner),
        (GUEST_EMAIL, GUEST_PASSWORD, Role::Guest),
    ] {
        dashboard.sign_in(email, password).await.unwrap();
        assert_eq!(dashboard.auth().role(), Some(role));
    }

    let before = dashboard.auth().session();
    for (email, password) in [
        (OWNER_EMAIL, GUEST_PASSWORD),
        (GUEST_EMAIL, OWNER_PASSWORD),
        ("intruder@example.com", "password123"),
    ] {
        let err = dashboard.sign_in(email, password).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthenticationFailed);
        assert_eq!(dashboard.auth().session(), before);
    }
}

#[tokio::test]
async fn test_malformed_form_never_reaches_backend() {
    let dashboard = dashboard();
    let err = dashboard.sign_in("not-an-email", "password123").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let err = dashboard.sign_up("", "jane@example.com", "secret1").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert!(!dashboard.auth().is_authenticated());
}

#[tokio::test]
async fn test_role_switch_round_trip() {
    let dashboard = owner_dashboard().await;

    for _ in 0..3 {
        dashboard.auth().switch_role();
        assert_eq!(dashboard.auth().role(), Some(Role::Guest));
    }

    let err = dashboard
        .switch_to_owner(GUEST_EMAIL, GUEST_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotOwner);
    assert_eq!(dashboard.auth().role(), Some(Role::Guest));

    dashboard.switch_to_owner(OWNER_EMAIL, OWNER_PASSWORD).await.unwrap();
    assert_eq!(dashboard.auth().role(), Some(Role::Owner));
}

#[tokio::test]
async fn test_landing_route_follows_session_and_base_path() {
    let mut config = DashboardConfig::ephemeral();
    config.app.base_path = "/iot-dashboard/".into();
    let dashboard = Dashboard::with_storage(config, Arc::new(MemoryStorage::new()));

    assert_eq!(dashboard.landing_route(), "/iot-dashboard/login");
    dashboard.sign_in(GUEST_EMAIL, GUEST_PASSWORD).await.unwrap();
    assert_eq!(dashboard.landing_route(), "/iot-dashboard/dashboard");
}

// =============================================================================
// Devices
// =============================================================================

#[tokio::test]
async fn test_reads_need_a_session() {
    let dashboard = dashboard();
    let err = dashboard.refresh_devices().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotAuthenticated);
    assert_eq!(dashboard.devices().phase(), LoadPhase::Idle);
}

#[tokio::test]
async fn test_guest_is_read_only() {
    let dashboard = dashboard();
    dashboard.sign_in(GUEST_EMAIL, GUEST_PASSWORD).await.unwrap();
    dashboard.refresh_devices().await.unwrap();
    assert_eq!(dashboard.devices().devices().len(), 4);

    let err = dashboard
        .add_device(&NewDevice::new("Attic Sensor", "Combined", "SN1"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let err = dashboard
        .update_device("device-1", &DeviceUpdate::new("Lounge Sensor", "Temperature"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let err = dashboard.delete_device("device-1").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    assert_eq!(dashboard.devices().devices().len(), 4);
    assert_eq!(dashboard.backend().devices().len(), 4);
}

#[tokio::test]
async fn test_owner_demoted_to_guest_loses_write_access() {
    let dashboard = owner_dashboard().await;
    dashboard.auth().switch_role();

    let err = dashboard.delete_device("device-2").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    assert!(dashboard.devices().device("device-2").is_some());
}

#[tokio::test]
async fn test_invalid_device_form_changes_nothing() {
    let dashboard = owner_dashboard().await;
    let before = dashboard.devices().snapshot();

    let err = dashboard
        .add_device(&NewDevice::new("AB", "Combined", "SN1"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let err = dashboard
        .update_device("device-1", &DeviceUpdate::new("Lounge Sensor", ""))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    assert_eq!(dashboard.devices().snapshot(), before);
}

#[tokio::test]
async fn test_add_device_to_empty_store() {
    let backend = MockBackend::with_devices(LatencyProfile::none(), Vec::new());
    let state = DeviceState::new(backend.device_handle(), RollbackStrategy::Refetch);

    let device = state
        .add_device(&NewDevice::new("New Sensor", "Combined", "SN123"))
        .await
        .unwrap();

    let devices = state.devices();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0], device);
    assert_eq!(device.status, DeviceStatus::Online);
    assert!((70..=100).contains(&device.battery_level));
}

#[tokio::test]
async fn test_owner_crud_cycle() {
    let dashboard = owner_dashboard().await;

    let added = dashboard
        .add_device(&NewDevice::new("Attic Sensor", "Combined", "SN-ATTIC"))
        .await
        .unwrap();
    assert_eq!(dashboard.devices().devices().last(), Some(&added));

    let others_before: Vec<_> = dashboard
        .devices()
        .devices()
        .into_iter()
        .filter(|d| d.id != added.id)
        .collect();

    dashboard
        .update_device(&added.id, &DeviceUpdate::new("Loft Sensor", "Temperature"))
        .await
        .unwrap();
    let others_after: Vec<_> = dashboard
        .devices()
        .devices()
        .into_iter()
        .filter(|d| d.id != added.id)
        .collect();
    assert_eq!(others_before, others_after);
    assert_eq!(dashboard.devices().device(&added.id).unwrap().name, "Loft Sensor");

    dashboard.delete_device(&added.id).await.unwrap();
    assert_eq!(dashboard.devices().devices().len(), 4);
    assert!(dashboard.devices().device(&added.id).is_none());
}

#[tokio::test]
async fn test_failed_delete_restores_backend_view() {
    let dashboard = owner_dashboard().await;
    dashboard.backend().fail_next(Operation::DeleteDevice, 1);

    let err = dashboard.delete_device("device-1").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::BackendUnavailable);
    assert_eq!(dashboard.devices().devices().len(), 4);
    assert_eq!(dashboard.devices().phase(), LoadPhase::Error);
}

#[tokio::test]
async fn test_restore_rollback_from_config() {
    let mut config = DashboardConfig::ephemeral();
    config.devices.rollback = RollbackStrategy::Restore;
    let dashboard = Dashboard::with_storage(config, Arc::new(MemoryStorage::new()));
    dashboard.sign_in(OWNER_EMAIL, OWNER_PASSWORD).await.unwrap();
    dashboard.refresh_devices().await.unwrap();
    let before = dashboard.devices().devices();

    dashboard.backend().fail_next(Operation::UpdateDevice, 1);
    dashboard
        .update_device("device-3", &DeviceUpdate::new("Nursery Sensor", "Combined"))
        .await
        .unwrap_err();
    assert_eq!(dashboard.devices().devices(), before);
}

#[tokio::test]
async fn test_day_chart_labels() {
    let dashboard = owner_dashboard().await;
    let series = dashboard.devices().historical_data("device-2", TimeRange::Day);

    let labels: Vec<_> = series.iter().map(|s| s.time.clone()).collect();
    let expected: Vec<_> = (0..24).map(|h| format!("{}:00", h)).collect();
    assert_eq!(labels, expected);
    assert!(dashboard.devices().historical_data("device-99", TimeRange::Day).is_empty());
}

// =============================================================================
// Notifications & Persistence
// =============================================================================

#[tokio::test]
async fn test_open_notification_routes_under_base_path() {
    let mut config = DashboardConfig::ephemeral();
    config.app.base_path = "/iot-dashboard/".into();
    let dashboard = Dashboard::with_storage(config, Arc::new(MemoryStorage::new()));

    let notice = dashboard.notifications().add(
        NewNotification::new(NotificationKind::Info, "Firmware", "Update ready").with_link("/settings"),
    );
    assert_eq!(dashboard.notifications().unread_count(), 3);

    assert_eq!(
        dashboard.open_notification(&notice.id).as_deref(),
        Some("/iot-dashboard/settings")
    );
    assert_eq!(dashboard.notifications().unread_count(), 2);

    // Seeded notifications carry no link
    assert_eq!(dashboard.open_notification("notif-1"), None);
    assert_eq!(dashboard.notifications().unread_count(), 1);
}

#[tokio::test]
async fn test_state_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let open = || -> Dashboard {
        let storage: Arc<dyn StateStorage> = Arc::new(FileStorage::new(dir.path()).unwrap());
        Dashboard::with_storage(DashboardConfig::ephemeral(), storage)
    };

    {
        let dashboard = open();
        dashboard.sign_in(OWNER_EMAIL, OWNER_PASSWORD).await.unwrap();
        dashboard.auth().switch_role();
        dashboard.notifications().mark_as_read("notif-2");
    }

    let dashboard = open();
    assert_eq!(dashboard.auth().role(), Some(Role::Guest));
    assert_eq!(dashboard.auth().token().as_deref(), Some(OWNER_TOKEN));
    assert_eq!(dashboard.notifications().unread_count(), 1);
    assert!(dir.path().join("auth-storage.json").exists());
    assert!(dir.path().join("notification-storage.json").exists());

    // Device state is not persisted; it reloads from the backend
    assert_eq!(dashboard.devices().phase(), LoadPhase::Idle);
}

#[tokio::test]
async fn test_corrupt_blobs_fall_back_to_defaults() {
    let storage = MemoryStorage::new();
    storage.save("auth-storage", "{\"state\": 12}").unwrap();
    storage.save("notification-storage", "[]").unwrap();

    let dashboard = Dashboard::with_storage(DashboardConfig::ephemeral(), Arc::new(storage));
    assert!(!dashboard.auth().is_authenticated());
    assert_eq!(dashboard.notifications().notifications().len(), 4);
    assert_eq!(dashboard.notifications().unread_count(), 2);
}

#[tokio::test]
async fn test_new_builds_memory_dashboard_from_config() {
    let dashboard = Dashboard::new(DashboardConfig::ephemeral()).unwrap();
    dashboard.sign_in(OWNER_EMAIL, OWNER_PASSWORD).await.unwrap();
    assert_eq!(dashboard.config().devices.rollback, RollbackStrategy::Refetch);
}
