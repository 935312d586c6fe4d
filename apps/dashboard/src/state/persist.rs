//! # Scoped Persistence
//!
//! Durable key/value storage for state snapshots, plus the [`Persisted`]
//! decorator the persisted stores write through.
//!
//! ## Blob Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Persisted Snapshot                                   │
//! │                                                                         │
//! │  key: "auth-storage"                                                   │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │ {                                                               │   │
//! │  │   "state": { "user": {...}, "token": "...",                     │   │
//! │  │              "isAuthenticated": true },                         │   │
//! │  │   "version": 0                                                  │   │
//! │  │ }                                                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  StateStorage                                                          │
//! │  ├── FileStorage    <dir>/<key>.json                                   │
//! │  └── MemoryStorage  HashMap, tests and ephemeral sessions              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes are fire-and-forget: a failed save is logged and the in-memory
//! state stays authoritative.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Snapshot format version written next to every blob.
pub const SNAPSHOT_VERSION: u32 = 0;

// =============================================================================
// Persist Error
// =============================================================================

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Keys become file names, so they are restricted to `[A-Za-z0-9_-]`.
    #[error("Invalid storage key: '{0}'")]
    InvalidKey(String),
}

pub type PersistResult<T> = Result<T, PersistError>;

// =============================================================================
// Storage Trait
// =============================================================================

/// Raw key/value storage for serialized snapshots.
pub trait StateStorage: Send + Sync + fmt::Debug {
    /// Returns the stored value, `None` if the key was never written.
    fn load(&self, key: &str) -> PersistResult<Option<String>>;

    fn save(&self, key: &str, value: &str) -> PersistResult<()>;

    /// Deletes the key; removing a missing key is not an error.
    fn remove(&self, key: &str) -> PersistResult<()>;
}

// =============================================================================
// File Storage
// =============================================================================

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates the storage, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> PersistResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        debug!(?dir, "File storage ready");
        Ok(FileStorage { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PersistResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PersistError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl StateStorage for FileStorage {
    fn load(&self, key: &str) -> PersistResult<Option<String>> {
        match std::fs::read_to_string(self.path(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> PersistResult<()> {
        let path = self.path(key)?;
        // Write-then-rename so a crash never leaves a half-written blob
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> PersistResult<()> {
        match std::fs::remove_file(self.path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Memory Storage
// =============================================================================

/// In-process storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value, for inspection in tests.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> PersistResult<Option<String>> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &str) -> PersistResult<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PersistResult<()> {
        self.lock().remove(key);
        Ok(())
    }
}

// =============================================================================
// Persisted Decorator
// =============================================================================

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    state: &'a T,
    version: u32,
}

#[derive(Deserialize)]
struct Envelope<T> {
    state: T,
    version: u32,
}

/// Binds a snapshot type to one storage key.
///
/// ## Usage
/// ```rust,ignore
/// let persisted = Persisted::<SessionSnapshot>::new(storage, "auth-storage");
/// let restored = persisted.restore().unwrap_or_default();
/// // ... mutate ...
/// persisted.commit(&SessionSnapshot::from(&state));
/// ```
pub struct Persisted<T> {
    storage: Arc<dyn StateStorage>,
    key: &'static str,
    _snapshot: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for Persisted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persisted")
            .field("storage", &self.storage)
            .field("key", &self.key)
            .finish()
    }
}

impl<T: Serialize + DeserializeOwned> Persisted<T> {
    pub fn new(storage: Arc<dyn StateStorage>, key: &'static str) -> Self {
        Persisted {
            storage,
            key,
            _snapshot: PhantomData,
        }
    }

    /// Reads the stored snapshot.
    ///
    /// Missing, unreadable, corrupt and foreign-version blobs all yield
    /// `None`; everything but "missing" is logged.
    pub fn restore(&self) -> Option<T> {
        let raw = match self.storage.load(self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = self.key, "No persisted snapshot");
                return None;
            }
            Err(e) => {
                warn!(key = self.key, error = %e, "Failed to read persisted snapshot");
                return None;
            }
        };

        match serde_json::from_str::<Envelope<T>>(&raw) {
            Ok(envelope) if envelope.version == SNAPSHOT_VERSION => {
                debug!(key = self.key, "Restored persisted snapshot");
                Some(envelope.state)
            }
            Ok(envelope) => {
                warn!(
                    key = self.key,
                    version = envelope.version,
                    "Ignoring snapshot with unsupported version"
                );
                None
            }
            Err(e) => {
                warn!(key = self.key, error = %e, "Ignoring corrupt persisted snapshot");
                None
            }
        }
    }

    /// Writes `state`. Failures are logged, never returned.
    pub fn commit(&self, state: &T) {
        if let Err(e) = self.try_commit(state) {
            warn!(key = self.key, error = %e, "Failed to persist snapshot");
        }
    }

    fn try_commit(&self, state: &T) -> PersistResult<()> {
        let blob = serde_json::to_string(&EnvelopeRef {
            state,
            version: SNAPSHOT_VERSION,
        })?;
        self.storage.save(self.key, &blob)
    }

    /// Drops the stored snapshot.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(self.key) {
            warn!(key = self.key, error = %e, "Failed to remove persisted snapshot");
        }
    }
}
