//! Token-based implementation of the `AuthService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db::Store;
use crate::domain::Principal;
use crate::services::auth_service::{AccessToken, AuthError, AuthService, CredentialStore};
use crate::services::password::PasswordHasher;
use crate::services::token::TokenCodec;

#[async_trait]
impl CredentialStore for Store {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Principal>> {
        self.get_user_by_username(username).await
    }
}

pub struct TokenAuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    codec: TokenCodec,
}

impl TokenAuthService {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher, codec: TokenCodec) -> Self {
        Self {
            store,
            hasher,
            codec,
        }
    }
}

#[async_trait]
impl AuthService for TokenAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<AccessToken, AuthError> {
        self.hasher.check_length(password)?;

        let user = self.store.find_by_username(username).await?;

        // An unknown user still pays for one verification.
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let is_valid = self
            .hasher
            .verify_blocking(password.to_string(), stored_hash)
            .await;

        let Some(user) = user.filter(|_| is_valid) else {
            warn!(username = %username, "Login failed");
            metrics::counter!("auth_login_total", "outcome" => "failure").increment(1);
            return Err(AuthError::InvalidCredentials);
        };

        let token = self.codec.issue(&user.username)?;

        info!(username = %user.username, role = %user.role, "Login succeeded");
        metrics::counter!("auth_login_total", "outcome" => "success").increment(1);

        Ok(AccessToken::bearer(token))
    }

    async fn resolve(&self, token: &str) -> Result<Principal, AuthError> {
        let subject = self.codec.decode(token).map_err(|e| {
            debug!(reason = e.reason(), "Rejected bearer token");
            metrics::counter!("auth_resolve_failures_total", "reason" => e.reason()).increment(1);
            AuthError::from(e)
        })?;

        let Some(principal) = self.store.find_by_username(&subject).await? else {
            debug!(username = %subject, "Token subject no longer exists");
            metrics::counter!("auth_resolve_failures_total", "reason" => "unknown_subject")
                .increment(1);
            return Err(AuthError::Unauthorized);
        };

        Ok(principal)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::domain::{Role, UserId};
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    /// In-memory credential store for service tests.
    #[derive(Default)]
    pub struct MemoryCredentialStore {
        users: RwLock<HashMap<String, Principal>>,
    }

    impl MemoryCredentialStore {
        pub async fn insert(&self, id: i32, username: &str, password_hash: String, role: Role) {
            let principal = Principal {
                id: UserId::new(id),
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash,
                role,
                created_at: chrono::Utc::now().to_rfc3339(),
            };
            self.users
                .write()
                .await
                .insert(username.to_string(), principal);
        }

        pub async fn remove(&self, username: &str) {
            self.users.write().await.remove(username);
        }

        pub async fn set_role(&self, username: &str, role: Role) {
            if let Some(user) = self.users.write().await.get_mut(username) {
                user.role = role;
            }
        }
    }

    #[async_trait]
    impl CredentialStore for MemoryCredentialStore {
        async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Principal>> {
            Ok(self.users.read().await.get(username).cloned())
        }
    }
}
