//! # Store Error Type
//!
//! Unified error type returned by the dashboard state layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Dashboard                          │
//! │                                                                         │
//! │  Presentation                State Layer                                │
//! │  ────────────                ───────────                                │
//! │                                                                         │
//! │  dashboard.add_device(..)                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Store Operation                                                 │  │
//! │  │  Result<T, StoreError>                                           │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Guest session? ─── PERMISSION_DENIED ─────────────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Form invalid? ─── ValidationError ───────────► StoreError ────►│  │
//! │  │         │                                          ▲            │  │
//! │  │         ▼                                          │            │  │
//! │  │  Backend failed? ─── BackendError ─────────────────┘            │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  match err.code {                                                       │
//! │      ErrorCode::ValidationError => show_form_error(&err.message),      │
//! │      _ => toast(&err.message),                                         │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! Errors serialize as `{"code": "...", "message": "..."}` so a web or
//! desktop shell can forward them unchanged.

use serde::Serialize;
use vigil_core::{CoreError, ValidationError};
use vigil_mock::BackendError;

/// Error returned from state operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "AUTHENTICATION_FAILED",
///   "message": "Invalid credentials"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for state operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Email / password pair rejected
    AuthenticationFailed,

    /// Entity not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Backend call failed (network, injected fault)
    BackendUnavailable,

    /// Operation needs a signed-in session
    NotAuthenticated,

    /// Signed in, but the role lacks the right
    PermissionDenied,

    /// Credentials offered for an owner switch belong to a non-owner
    NotOwner,

    /// Malformed argument (e.g. unknown chart range)
    InvalidInput,
}

impl StoreError {
    /// Creates a new store error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        StoreError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not authenticated error.
    pub fn not_authenticated() -> Self {
        StoreError::new(ErrorCode::NotAuthenticated, "You must be signed in")
    }

    /// Creates a permission error naming the refused action.
    pub fn permission_denied(action: &str) -> Self {
        StoreError::new(
            ErrorCode::PermissionDenied,
            format!("Only owners can {}", action),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::new(ErrorCode::ValidationError, message)
    }
}

/// Converts backend errors to store errors.
impl From<BackendError> for StoreError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::AuthenticationFailed => {
                StoreError::new(ErrorCode::AuthenticationFailed, err.to_string())
            }
            BackendError::NotFound { .. } => StoreError::new(ErrorCode::NotFound, err.to_string()),
            BackendError::Unavailable { operation } => {
                tracing::error!(%operation, "Backend call failed");
                StoreError::new(ErrorCode::BackendUnavailable, err.to_string())
            }
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::validation(err.to_string())
    }
}

/// Converts core errors to store errors.
impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotOwner => StoreError::new(ErrorCode::NotOwner, err.to_string()),
            CoreError::UnknownTimeRange(_) => {
                StoreError::new(ErrorCode::InvalidInput, err.to_string())
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for StoreError {}

/// Result type for state operations.
pub type StoreResult<T> = Result<T, StoreError>;
