//! # Error Types
//!
//! Domain-specific error types for vigil-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vigil-core errors (this file)                                         │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Form input failures                            │
//! │                                                                         │
//! │  vigil-mock errors (separate crate)                                    │
//! │  └── BackendError     - Simulated network failures                     │
//! │                                                                         │
//! │  dashboard errors (in app)                                             │
//! │  └── StoreError       - What the presentation layer sees               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError ← BackendError         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An account without owner rights was offered as proof of ownership.
    ///
    /// ## When This Occurs
    /// The role-switch dialog authenticates the guest account and tries to
    /// use it to promote the session.
    #[error("This account does not have owner privileges")]
    NotOwner,

    /// A chart range label other than "24h", "7d" or "30d".
    #[error("Unknown time range: '{0}'. Valid options: 24h, 7d, 30d")]
    UnknownTimeRange(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, mirroring the dashboard's form rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g. malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two fields that must agree do not (password confirmation).
    #[error("{field} must match {other}")]
    Mismatch { field: String, other: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CoreError::NotOwner.to_string(),
            "This account does not have owner privileges"
        );
        assert_eq!(
            CoreError::UnknownTimeRange("1y".to_string()).to_string(),
            "Unknown time range: '1y'. Valid options: 24h, 7d, 30d"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        };
        assert_eq!(err.to_string(), "password must be at least 6 characters");

        let err = ValidationError::Mismatch {
            field: "confirmPassword".to_string(),
            other: "newPassword".to_string(),
        };
        assert_eq!(err.to_string(), "confirmPassword must match newPassword");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
