//! # Session State Machine
//!
//! Who is signed in, and under which role.
//!
//! ## Role Switching
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Transitions                                │
//! │                                                                         │
//! │                  sign_in(owner)          switch_to_guest()              │
//! │   Anonymous ─────────────────────► Owner ─────────────────► Guest       │
//! │       │                              ▲                        │         │
//! │       │ sign_in(guest)               │ switch_to_owner(grant) │         │
//! │       └──────────────────────────────┼──────────────────────► │         │
//! │                                      └────────────────────────┘         │
//! │                                                                         │
//! │   switch_to_guest() on Guest/Anonymous   → unchanged                   │
//! │   switch_to_owner() needs an OwnerGrant  → only built from an owner    │
//! │                                            account that just logged in │
//! │   sign_out() from anywhere               → Anonymous                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Demotion is free; promotion requires proof. The two transitions take
//! different inputs, so the asymmetry is checked by the compiler rather than
//! by a runtime branch in one "toggle" method.
//!
//! Holding the session as `Option`-shaped enum variants also guarantees
//! `isAuthenticated ⇔ token present ⇔ user present`.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{AuthSession, Role, User};

// =============================================================================
// Owner Grant
// =============================================================================

/// Proof that an owner account has just authenticated.
///
/// The only input accepted by [`SessionState::switch_to_owner`].
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerGrant(AuthSession);

impl OwnerGrant {
    /// Wraps a fresh authentication result, rejecting non-owner accounts.
    pub fn new(session: AuthSession) -> CoreResult<Self> {
        if session.user.role != Role::Owner {
            return Err(CoreError::NotOwner);
        }
        Ok(OwnerGrant(session))
    }

    pub fn user(&self) -> &User {
        &self.0.user
    }

    pub fn into_session(self) -> AuthSession {
        self.0
    }
}

impl TryFrom<AuthSession> for OwnerGrant {
    type Error = CoreError;

    fn try_from(session: AuthSession) -> Result<Self, Self::Error> {
        OwnerGrant::new(session)
    }
}

// =============================================================================
// Session State
// =============================================================================

/// Current authentication state of the dashboard.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Owner(AuthSession),
    Guest(AuthSession),
}

impl SessionState {
    /// Installs a session returned by login or register, classified by the
    /// role the backend assigned.
    pub fn sign_in(session: AuthSession) -> Self {
        match session.user.role {
            Role::Owner => SessionState::Owner(session),
            Role::Guest => SessionState::Guest(session),
        }
    }

    /// Owner → Guest with the same user and token. Any other state is
    /// returned unchanged.
    pub fn switch_to_guest(self) -> Self {
        match self {
            SessionState::Owner(session) => SessionState::Guest(AuthSession {
                user: session.user.with_role(Role::Guest),
                token: session.token,
            }),
            other => other,
        }
    }

    /// Installs an authenticated owner session, replacing whatever was
    /// signed in before.
    pub fn switch_to_owner(self, grant: OwnerGrant) -> Self {
        SessionState::Owner(grant.into_session())
    }

    /// Replaces the user record, keeping the token and the current role.
    ///
    /// Profile edits cannot change rights: a record carrying a different
    /// role is stored under the session's existing role. Anonymous stays
    /// anonymous.
    pub fn with_user(self, user: User) -> Self {
        match self {
            SessionState::Anonymous => SessionState::Anonymous,
            SessionState::Owner(session) => SessionState::Owner(AuthSession {
                user: user.with_role(Role::Owner),
                token: session.token,
            }),
            SessionState::Guest(session) => SessionState::Guest(AuthSession {
                user: user.with_role(Role::Guest),
                token: session.token,
            }),
        }
    }

    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            SessionState::Anonymous => None,
            SessionState::Owner(session) | SessionState::Guest(session) => Some(session),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session().map(|s| s.token.as_str())
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            SessionState::Anonymous => None,
            SessionState::Owner(_) => Some(Role::Owner),
            SessionState::Guest(_) => Some(Role::Guest),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, SessionState::Anonymous)
    }
}

// =============================================================================
// Persisted Snapshot
// =============================================================================

/// Flat `{user, token, isAuthenticated}` layout written to durable storage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
}

impl From<&SessionState> for SessionSnapshot {
    fn from(state: &SessionState) -> Self {
        SessionSnapshot {
            user: state.user().cloned(),
            token: state.token().map(str::to_string),
            is_authenticated: state.is_authenticated(),
        }
    }
}

impl From<SessionSnapshot> for SessionState {
    /// Restores a session. Blobs that break the all-or-nothing invariant
    /// restore as [`SessionState::Anonymous`].
    fn from(snapshot: SessionSnapshot) -> Self {
        match snapshot {
            SessionSnapshot {
                user: Some(user),
                token: Some(token),
                is_authenticated: true,
            } => SessionState::sign_in(AuthSession { user, token }),
            _ => SessionState::Anonymous,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
