//! # Auth State
//!
//! The signed-in session, persisted under `auth-storage`.
//!
//! ## Role Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Lifecycle                                    │
//! │                                                                         │
//! │              login / register                                           │
//! │  Anonymous ───────────────────► Owner ◄──────────────┐                  │
//! │      ▲            │               │                  │                  │
//! │      │            │ (guest acct)  │ switch_role()    │ switch_to_owner  │
//! │      │            ▼               ▼                  │ (OwnerGrant)     │
//! │      │          Guest ◄──────── Guest ───────────────┘                  │
//! │      │            │                                                     │
//! │      └────────────┴── logout() (from any state)                         │
//! │                                                                         │
//! │  Demotion is free. Promotion requires an OwnerGrant, which only        │
//! │  authorize_owner() (a fresh owner login) can produce.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking
//! The session sits behind a `std::sync::Mutex` that is only taken for
//! synchronous reads and swaps, never across a backend call.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};
use vigil_core::validation::{validate_password_change, validate_profile};
use vigil_core::{OwnerGrant, Role, SessionSnapshot, SessionState, User};
use vigil_mock::AuthBackend;

use super::persist::{Persisted, StateStorage};
use crate::error::{StoreError, StoreResult};

/// Managed auth state.
#[derive(Debug)]
pub struct AuthState {
    backend: Arc<dyn AuthBackend>,
    session: Mutex<SessionState>,
    persisted: Persisted<SessionSnapshot>,
}

impl AuthState {
    pub const STORAGE_KEY: &'static str = "auth-storage";

    /// Creates the state and restores any persisted session.
    pub fn new(backend: Arc<dyn AuthBackend>, storage: Arc<dyn StateStorage>) -> Self {
        let persisted: Persisted<SessionSnapshot> = Persisted::new(storage, Self::STORAGE_KEY);
        let session = persisted
            .restore()
            .map(SessionState::from)
            .unwrap_or_default();

        if let Some(user) = session.user() {
            info!(user_id = %user.id, role = %user.role, "Restored session");
        }

        AuthState {
            backend,
            session: Mutex::new(session),
            persisted,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Executes a function with read access to the session.
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SessionState) -> R,
    {
        let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&session)
    }

    pub fn session(&self) -> SessionState {
        self.with_session(|s| s.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.with_session(|s| s.user().cloned())
    }

    pub fn token(&self) -> Option<String> {
        self.with_session(|s| s.token().map(str::to_string))
    }

    pub fn role(&self) -> Option<Role> {
        self.with_session(SessionState::role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.with_session(SessionState::is_authenticated)
    }

    /// The `{user, token, isAuthenticated}` view that gets persisted.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.with_session(|s| SessionSnapshot::from(s))
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Applies a transition and persists the result.
    fn transition<F>(&self, f: F) -> SessionState
    where
        F: FnOnce(SessionState) -> SessionState,
    {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        let current = std::mem::take(&mut *session);
        *session = f(current);
        self.persisted.commit(&SessionSnapshot::from(&*session));
        session.clone()
    }

    /// Signs in with email and password.
    ///
    /// On failure the current session is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> StoreResult<()> {
        debug!(email = %email, "Logging in");

        let session = self.backend.login(email, password).await.map_err(|e| {
            warn!(email = %email, error = %e, "Login failed");
            StoreError::from(e)
        })?;

        let state = self.transition(|_| SessionState::sign_in(session));
        info!(role = ?state.role(), "Signed in");
        Ok(())
    }

    /// Creates an account and signs it in as owner.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> StoreResult<()> {
        debug!(email = %email, "Registering account");

        let session = self
            .backend
            .register(name, email, password)
            .await
            .map_err(|e| {
                warn!(email = %email, error = %e, "Registration failed");
                StoreError::from(e)
            })?;

        let state = self.transition(|_| SessionState::sign_in(session));
        info!(user_id = ?state.user().map(|u| u.id.as_str()), "Registered and signed in");
        Ok(())
    }

    /// Clears the session. No backend call.
    ///
    /// The persisted blob is dropped rather than overwritten.
    pub fn logout(&self) {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        *session = SessionState::Anonymous;
        self.persisted.clear();
        info!("Signed out");
    }

    /// Owner → guest. Guests and anonymous sessions are unchanged.
    pub fn switch_role(&self) {
        let state = self.transition(SessionState::switch_to_guest);
        debug!(role = ?state.role(), "Role switched");
    }

    /// Verifies owner credentials without touching the current session.
    ///
    /// ## Errors
    /// - `AUTHENTICATION_FAILED` for a wrong pair
    /// - `NOT_OWNER` when the pair belongs to a guest account
    pub async fn authorize_owner(&self, email: &str, password: &str) -> StoreResult<OwnerGrant> {
        let session = self.backend.login(email, password).await?;
        let grant = OwnerGrant::new(session).map_err(|e| {
            warn!(email = %email, "Owner switch refused for non-owner account");
            StoreError::from(e)
        })?;
        debug!(user_id = %grant.user().id, "Owner credentials verified");
        Ok(grant)
    }

    /// Installs a verified owner session.
    pub fn switch_to_owner(&self, grant: OwnerGrant) {
        let state = self.transition(|s| s.switch_to_owner(grant));
        info!(user_id = ?state.user().map(|u| u.id.as_str()), "Switched to owner");
    }

    /// Replaces the user record, keeping token and role.
    ///
    /// A signed-out state stays signed out.
    pub fn update_user(&self, user: User) {
        self.transition(|s| s.with_user(user));
    }

    /// Validates and applies a profile edit.
    pub fn update_profile(&self, name: &str, email: &str) -> StoreResult<User> {
        validate_profile(name, email)?;

        let mut user = self.user().ok_or_else(StoreError::not_authenticated)?;
        user.name = name.trim().to_string();
        user.email = email.trim().to_string();

        self.update_user(user.clone());
        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Validates the form and asks the backend to change the password.
    pub async fn change_password(&self, current: &str, new: &str, confirm: &str) -> StoreResult<()> {
        validate_password_change(current, new, confirm)?;
        let token = self.token().ok_or_else(StoreError::not_authenticated)?;

        self.backend.change_password(&token, current, new).await?;
        info!("Password changed");
        Ok(())
    }
}
