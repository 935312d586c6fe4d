//! # vigil-core: Pure Domain Logic for the Vigil Dashboard
//!
//! This crate holds everything the dashboard knows about users, devices and
//! notifications that does not need a backend, a clock or a disk.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Vigil Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Presentation (browser client)                  │   │
//! │  │      Login ──► Dashboard ──► Device chart ──► Notifications     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               dashboard (AuthState, DeviceState, ...)           │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────┐  ┌────────────▼────────────────────┐  │
//! │  │  ★ vigil-core (THIS CRATE) │  │  vigil-mock                      │  │
//! │  │  types • session • history  │  │  in-memory backend + latency    │  │
//! │  │  validation • errors        │  │                                  │  │
//! │  └─────────────────────────────┘  └──────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Device, Notification, ...)
//! - [`session`] - Owner/guest session state machine
//! - [`history`] - Chart series synthesis
//! - [`validation`] - Form input rules
//! - [`error`] - Domain error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod history;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use history::{synthesize_history, HistoricalSample, TimeRange};
pub use session::{OwnerGrant, SessionSnapshot, SessionState};
pub use types::*;
