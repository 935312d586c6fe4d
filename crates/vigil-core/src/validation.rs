//! # Validation Module
//!
//! Form input validation for the dashboard.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form (presentation)                                          │
//! │  └── Immediate field feedback                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Store operation                                              │
//! │  └── THIS MODULE: rejects bad input before any state change            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Credential checks, id lookups                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vigil_core::validation::{validate_email, validate_password};
//!
//! validate_email("owner@example.com").unwrap();
//! assert!(validate_password("short").is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{DeviceUpdate, NewDevice};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length accepted by login, register and password change.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum device name length accepted by the device forms.
pub const MIN_DEVICE_NAME_LEN: usize = 3;

/// Upper bound for free-text fields (names, types, serial numbers).
pub const MAX_TEXT_LEN: usize = 100;

// =============================================================================
// Field Helpers
// =============================================================================

fn require<'a>(field: &str, value: &'a str) -> ValidationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(value)
}

fn bounded(field: &str, value: &str, min: usize, max: usize) -> ValidationResult<()> {
    let value = require(field, value)?;
    let len = value.chars().count();

    if len < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }

    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Account Validators
// =============================================================================

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Exactly one `@` with a non-empty local part
/// - Domain contains a dot that is neither first nor last
/// - No whitespace
///
/// ## Example
/// ```rust
/// use vigil_core::validation::validate_email;
///
/// assert!(validate_email("guest@example.com").is_ok());
/// assert!(validate_email("guest@").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = require("email", email)?;

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(invalid("must contain a single '@'")),
    };

    if local.is_empty() {
        return Err(invalid("missing name before '@'"));
    }

    if domain.starts_with('.') || domain.ends_with('.') || !domain.contains('.') {
        return Err(invalid("missing or malformed domain"));
    }

    Ok(())
}

/// Validates a password: required, at least [`MIN_PASSWORD_LEN`] characters.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Validates a person's display name.
pub fn validate_user_name(name: &str) -> ValidationResult<()> {
    bounded("name", name, 1, MAX_TEXT_LEN)
}

/// Validates the login form.
pub fn validate_login(email: &str, password: &str) -> ValidationResult<()> {
    validate_email(email)?;
    validate_password(password)
}

/// Validates the registration form.
pub fn validate_registration(name: &str, email: &str, password: &str) -> ValidationResult<()> {
    validate_user_name(name)?;
    validate_email(email)?;
    validate_password(password)
}

/// Validates the profile form on the settings page.
pub fn validate_profile(name: &str, email: &str) -> ValidationResult<()> {
    validate_user_name(name)?;
    validate_email(email)
}

/// Validates the change-password form.
///
/// ## Rules
/// - Current password is required
/// - New password follows [`validate_password`]
/// - Confirmation must equal the new password
pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> ValidationResult<()> {
    if current.is_empty() {
        return Err(ValidationError::Required {
            field: "currentPassword".to_string(),
        });
    }

    validate_password(new).map_err(|err| match err {
        ValidationError::Required { .. } => ValidationError::Required {
            field: "newPassword".to_string(),
        },
        ValidationError::TooShort { min, .. } => ValidationError::TooShort {
            field: "newPassword".to_string(),
            min,
        },
        other => other,
    })?;

    if confirm.is_empty() {
        return Err(ValidationError::Required {
            field: "confirmPassword".to_string(),
        });
    }

    if confirm != new {
        return Err(ValidationError::Mismatch {
            field: "confirmPassword".to_string(),
            other: "newPassword".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Device Validators
// =============================================================================

/// Validates a device name: 3 to 100 characters after trimming.
///
/// ## Example
/// ```rust
/// use vigil_core::validation::validate_device_name;
///
/// assert!(validate_device_name("Attic Sensor").is_ok());
/// assert!(validate_device_name("AB").is_err());
/// ```
pub fn validate_device_name(name: &str) -> ValidationResult<()> {
    bounded("name", name, MIN_DEVICE_NAME_LEN, MAX_TEXT_LEN)
}

/// Validates a device type label.
pub fn validate_device_type(kind: &str) -> ValidationResult<()> {
    bounded("type", kind, 1, MAX_TEXT_LEN)
}

/// Validates the add-device form.
pub fn validate_new_device(input: &NewDevice) -> ValidationResult<()> {
    validate_device_name(&input.name)?;
    validate_device_type(&input.kind)?;
    bounded("serialNumber", &input.serial_number, 1, MAX_TEXT_LEN)
}

/// Validates the edit-device form.
pub fn validate_device_update(update: &DeviceUpdate) -> ValidationResult<()> {
    validate_device_name(&update.name)?;
    validate_device_type(&update.kind)
}

// =============================================================================
// Unit Tests
// =============================================================================
