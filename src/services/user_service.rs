//! Domain service for provisioning users.

use crate::domain::{Principal, Role};
use crate::services::auth_service::AuthError;

/// Request to create a user. `role` defaults to staff.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Validates, hashes the password, and inserts the user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] or [`AuthError::PasswordTooLong`] for
    /// bad input and [`AuthError::Conflict`] if the username or email is taken.
    async fn create_user(&self, request: CreateUser) -> Result<Principal, AuthError>;

    /// Creates the user unless the username already exists.
    /// Returns `true` if a user was created.
    async fn ensure_user(&self, request: CreateUser) -> Result<bool, AuthError>;
}
