//! # State Module
//!
//! The dashboard's state containers.
//!
//! One type per concern instead of a single `AppState`: callers borrow only
//! what they read, and a slow device call never blocks the auth state.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │  AuthState   │  │ DeviceState  │  │ NotificationState│              │
//! │  │              │  │              │  │                  │              │
//! │  │  Mutex<      │  │  Mutex<      │  │  Mutex<          │              │
//! │  │   Session    │  │   Device     │  │   Notification   │              │
//! │  │   State>     │  │   Snapshot>  │  │   Snapshot>      │              │
//! │  └──────┬───────┘  └──────┬───────┘  └────────┬─────────┘              │
//! │         │                 │                   │                         │
//! │         ▼                 ▼                   ▼                         │
//! │   Persisted<..>    Arc<dyn Device      Persisted<..>                   │
//! │   "auth-storage"    Repository>        "notification-storage"          │
//! │                                                                         │
//! │  LOCKING:                                                              │
//! │  • Every Mutex is held only for synchronous reads / swaps              │
//! │  • No lock is ever held across an .await                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod auth;
mod device;
mod notification;
pub mod persist;

pub use auth::AuthState;
pub use device::{
    DeviceSnapshot, DeviceState, LoadPhase, RollbackStrategy, ADD_FAILED, DELETE_FAILED,
    FETCH_FAILED, UPDATE_FAILED,
};
pub use notification::{seed_notifications, NotificationSnapshot, NotificationState};
pub use persist::{FileStorage, MemoryStorage, PersistError, Persisted, StateStorage};
