//! # Dashboard Configuration
//!
//! Configuration management for the dashboard state layer.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     VIGIL_STORAGE_DIR=/tmp/vigil                                       │
//! │     VIGIL_LATENCY=none                                                 │
//! │     VIGIL_ROLLBACK=restore                                             │
//! │     VIGIL_BASE_PATH=/iot-dashboard/                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/dashboard/dashboard.toml (Linux)                         │
//! │     ~/Library/Application Support/com.vigil.dashboard/dashboard.toml   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     file storage in the data dir, realistic latency, refetch rollback  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # dashboard.toml
//! [storage]
//! backend = "file"          # file | memory
//! dir = "/var/lib/vigil"    # optional, defaults to the platform data dir
//!
//! [backend]
//! latency = "realistic"     # realistic | none
//!
//! [backend.delays]          # optional per-operation override (ms)
//! login_ms = 200
//!
//! [devices]
//! rollback = "refetch"      # refetch | restore
//!
//! [app]
//! base_path = "/"
//! ```

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use vigil_mock::LatencyProfile;

use crate::state::RollbackStrategy;

// =============================================================================
// Config Error
// =============================================================================

/// Errors while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Storage Settings
// =============================================================================

/// Where persisted state lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One JSON file per key
    #[default]
    File,
    /// Process memory; nothing survives a restart
    Memory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for file storage. `None` means the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl StorageSettings {
    /// Resolves the directory file storage should write to.
    pub fn resolve_dir(&self) -> Option<PathBuf> {
        self.dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
    }
}

// =============================================================================
// Backend Settings
// =============================================================================

/// Named latency presets for the mock backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencyPreset {
    /// The delays of the hosted demo
    #[default]
    Realistic,
    /// Every call resolves immediately
    #[serde(rename = "none")]
    Instant,
}

impl std::str::FromStr for LatencyPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "realistic" => Ok(LatencyPreset::Realistic),
            "none" | "off" | "0" => Ok(LatencyPreset::Instant),
            _ => Err(format!("Unknown latency preset: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub latency: LatencyPreset,

    /// Explicit per-operation delays; wins over `latency` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delays: Option<LatencyProfile>,
}

impl BackendSettings {
    /// The latency profile the mock backend should run with.
    pub fn latency_profile(&self) -> LatencyProfile {
        match (&self.delays, self.latency) {
            (Some(delays), _) => delays.clone(),
            (None, LatencyPreset::Realistic) => LatencyProfile::realistic(),
            (None, LatencyPreset::Instant) => LatencyProfile::none(),
        }
    }
}

// =============================================================================
// Device / App Settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSettings {
    #[serde(default)]
    pub rollback: RollbackStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Prefix every in-app route is mounted under (e.g. "/iot-dashboard/").
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

fn default_base_path() -> String {
    "/".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            base_path: default_base_path(),
        }
    }
}

impl AppSettings {
    /// Joins an in-app path onto the base path.
    ///
    /// ```rust,ignore
    /// // base_path = "/iot-dashboard/"
    /// assert_eq!(app.route("/devices"), "/iot-dashboard/devices");
    /// ```
    pub fn route(&self, path: &str) -> String {
        format!("{}{}", self.base_path, path.trim_start_matches('/'))
    }
}

// =============================================================================
// Dashboard Config
// =============================================================================

/// Complete dashboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub devices: DeviceSettings,

    #[serde(default)]
    pub app: AppSettings,
}

impl DashboardConfig {
    /// Loads configuration: defaults, then the TOML file, then `VIGIL_*`
    /// environment variables, then validation.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading dashboard config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Like [`load`](Self::load) but never fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load dashboard config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// An in-memory, zero-latency configuration for tests and demos.
    pub fn ephemeral() -> Self {
        DashboardConfig {
            storage: StorageSettings {
                backend: StorageBackend::Memory,
                dir: None,
            },
            backend: BackendSettings {
                latency: LatencyPreset::Instant,
                delays: None,
            },
            ..Self::default()
        }
    }

    /// `dashboard.toml` in the platform config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("dashboard.toml"))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `VIGIL_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("VIGIL_STORAGE_DIR") {
            debug!(dir = %dir, "Overriding storage dir from environment");
            self.storage.backend = StorageBackend::File;
            self.storage.dir = Some(PathBuf::from(dir));
        }

        if let Some(latency) = lookup("VIGIL_LATENCY") {
            match latency.parse() {
                Ok(preset) => {
                    debug!(latency = %latency, "Overriding latency from environment");
                    self.backend.latency = preset;
                    self.backend.delays = None;
                }
                Err(e) => warn!("{}", e),
            }
        }

        if let Some(rollback) = lookup("VIGIL_ROLLBACK") {
            match rollback.parse() {
                Ok(strategy) => {
                    debug!(rollback = %rollback, "Overriding rollback strategy from environment");
                    self.devices.rollback = strategy;
                }
                Err(e) => warn!("{}", e),
            }
        }

        if let Some(base_path) = lookup("VIGIL_BASE_PATH") {
            self.app.base_path = base_path;
        }
    }

    /// Checks cross-field rules after all sources are merged.
    pub fn validate(&self) -> ConfigResult<()> {
        let base = &self.app.base_path;
        if !base.starts_with('/') || !base.ends_with('/') {
            return Err(ConfigError::Invalid(format!(
                "base_path must start and end with '/', got: {}",
                base
            )));
        }

        if self.storage.backend == StorageBackend::File && self.storage.resolve_dir().is_none() {
            return Err(ConfigError::Invalid(
                "no storage dir configured and no platform data dir available".into(),
            ));
        }

        Ok(())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "vigil", "dashboard")
}
