//! # Backend Error Types
//!
//! Errors a (simulated) network call can produce.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Mock backend call                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BackendError (this module)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (dashboard) ← adds state-layer context, error code         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Presentation shows a toast / form error                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::latency::Operation;

/// Simulated backend failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Email/password pair matches no account.
    #[error("Invalid credentials")]
    AuthenticationFailed,

    /// Entity not found.
    ///
    /// ## When This Occurs
    /// - `update` / `delete` with an id that is not in the collection
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The call was rejected before reaching the data (injected fault).
    #[error("Backend unavailable during {operation}")]
    Unavailable { operation: Operation },
}

impl BackendError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        BackendError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
