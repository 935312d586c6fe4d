//! # Auth Backend
//!
//! Credential checks against the two fixed demo accounts.
//!
//! Registration always succeeds and issues an owner session for a fresh
//! user id; the new account is not added to the credential table, so it
//! cannot log in again after logout (same as the hosted demo).

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;
use vigil_core::{AuthSession, Role, User};

use super::AuthBackend;
use crate::error::{BackendError, BackendResult};
use crate::fixtures::{demo_accounts, DemoAccount};
use crate::latency::{Operation, SimulatedNetwork};

/// Mock account service.
#[derive(Debug, Clone)]
pub struct MockAuthBackend {
    accounts: Arc<Vec<DemoAccount>>,
    network: Arc<SimulatedNetwork>,
}

impl MockAuthBackend {
    pub fn new(network: Arc<SimulatedNetwork>) -> Self {
        MockAuthBackend {
            accounts: Arc::new(demo_accounts()),
            network,
        }
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn login(&self, email: &str, password: &str) -> BackendResult<AuthSession> {
        self.network.round_trip(Operation::Login).await?;

        let account = self
            .accounts
            .iter()
            .find(|a| a.user.email == email && a.password == password)
            .ok_or_else(|| {
                warn!(email = %email, "Rejected credentials");
                BackendError::AuthenticationFailed
            })?;

        info!(user_id = %account.user.id, role = %account.user.role, "Login accepted");
        Ok(AuthSession {
            user: account.user.clone(),
            token: account.token.to_string(),
        })
    }

    async fn register(&self, name: &str, email: &str, _password: &str) -> BackendResult<AuthSession> {
        self.network.round_trip(Operation::Register).await?;

        let user = User {
            id: format!("user-{}", Uuid::new_v4()),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            role: Role::Owner,
            avatar: None,
        };
        let token = format!("mock-jwt-token-{}", user.id);

        info!(user_id = %user.id, "Account registered");
        Ok(AuthSession { user, token })
    }

    async fn change_password(&self, token: &str, _current: &str, _new: &str) -> BackendResult<()> {
        self.network.round_trip(Operation::ChangePassword).await?;
        debug!(token_len = token.len(), "Password change accepted");
        Ok(())
    }
}
