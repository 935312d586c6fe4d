//! # Vigil Dashboard Demo
//!
//! Drives one scripted session through the state layer and logs each step.
//!
//! ## Session Script
//! 1. Sign in as the demo owner and load the devices
//! 2. Register a sensor and chart its last 24 hours
//! 3. Drop to guest and get refused a delete
//! 4. Switch back to owner with the owner's credentials
//! 5. Rename a sensor while the backend is down (rollback)
//! 6. Work the notification center, then sign out
//!
//! Run with `VIGIL_LATENCY=none` to skip the simulated network delays.

use vigil_core::{DeviceUpdate, NewDevice, NewNotification, NotificationKind, TimeRange};
use vigil_dashboard::{init_tracing, Dashboard, DashboardConfig};
use vigil_mock::fixtures::{GUEST_EMAIL, OWNER_EMAIL, OWNER_PASSWORD};
use vigil_mock::Operation;

use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        error!(error = %e, "Demo session aborted");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = DashboardConfig::load_or_default(None);
    info!(
        storage = ?config.storage.backend,
        rollback = %config.devices.rollback,
        "Starting Vigil dashboard demo"
    );

    let dashboard = Dashboard::new(config)?;
    info!(route = %dashboard.landing_route(), "Landing");

    // 1. Owner session
    if dashboard.sign_in(GUEST_EMAIL, OWNER_PASSWORD).await.is_err() {
        warn!("Mismatched credentials rejected, as expected");
    }
    dashboard.sign_in(OWNER_EMAIL, OWNER_PASSWORD).await?;
    dashboard.refresh_devices().await?;
    info!(
        route = %dashboard.landing_route(),
        devices = dashboard.devices().devices().len(),
        "Dashboard loaded"
    );

    // 2. New sensor and its chart
    let added = dashboard
        .add_device(&NewDevice::new("Attic Sensor", "Combined", "SN-ATTIC-01"))
        .await?;
    let series = dashboard.devices().historical_data(&added.id, TimeRange::Day);
    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        info!(
            device_id = %added.id,
            points = series.len(),
            first = %first.temperature,
            last = %last.temperature,
            "Charted last 24h"
        );
    }

    // 3. Guests are read-only
    dashboard.auth().switch_role();
    match dashboard.delete_device(&added.id).await {
        Ok(()) => warn!("Guest delete unexpectedly succeeded"),
        Err(e) => info!(code = ?e.code, "Guest delete refused"),
    }

    // 4. Back to owner
    dashboard.switch_to_owner(OWNER_EMAIL, OWNER_PASSWORD).await?;
    info!(role = ?dashboard.auth().role(), "Owner rights restored");

    // 5. Failed rename rolls back
    dashboard.backend().fail_next(Operation::UpdateDevice, 1);
    let rename = DeviceUpdate::new("Loft Sensor", "Combined");
    if let Err(e) = dashboard.update_device(&added.id, &rename).await {
        let name = dashboard.devices().device(&added.id).map(|d| d.name);
        info!(error = %e, name = ?name, "Rename rolled back");
    }
    dashboard.update_device(&added.id, &rename).await?;

    // 6. Notifications
    let notice = dashboard.notifications().add(
        NewNotification::new(NotificationKind::Success, "Device Added", "Attic Sensor is online.")
            .with_link(format!("/dashboard?device={}", added.id)),
    );
    let target = dashboard.open_notification(&notice.id);
    info!(target = ?target, unread = dashboard.notifications().unread_count(), "Opened notification");

    dashboard.notifications().mark_all_as_read();
    dashboard.auth().logout();
    info!(route = %dashboard.landing_route(), "Session finished");

    Ok(())
}
