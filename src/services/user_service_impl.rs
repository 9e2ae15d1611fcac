//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{DuplicateUser, NewUser, Store};
use crate::domain::Principal;
use crate::services::auth_service::AuthError;
use crate::services::password::PasswordHasher;
use crate::services::user_service::{CreateUser, UserService};

const MAX_USERNAME_LEN: usize = 50;

pub struct SeaOrmUserService {
    store: Store,
    hasher: PasswordHasher,
    min_password_length: usize,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, hasher: PasswordHasher, min_password_length: usize) -> Self {
        Self {
            store,
            hasher,
            min_password_length,
        }
    }

    fn validate(&self, request: &CreateUser) -> Result<(), AuthError> {
        validate_username(&request.username)?;
        validate_email(&request.email)?;

        if request.password.chars().count() < self.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }
        self.hasher.check_length(&request.password)
    }
}

pub fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::Validation("Username cannot be empty".to_string()));
    }

    if username.len() > MAX_USERNAME_LEN {
        return Err(AuthError::Validation(format!(
            "Username must be {MAX_USERNAME_LEN} characters or less"
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return Err(AuthError::Validation(
            "Username can only contain letters, numbers, dots, hyphens, and underscores"
                .to_string(),
        ));
    }

    Ok(())
}

/// Shape check only: one `@`, a non-empty local part, and a dotted domain.
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    let invalid = || AuthError::Validation(format!("Invalid email address: {email}"));

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let mut labels = domain.split('.');
    let has_dot = domain.contains('.');
    if !has_dot || labels.any(str::is_empty) {
        return Err(invalid());
    }

    Ok(())
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn create_user(&self, request: CreateUser) -> Result<Principal, AuthError> {
        self.validate(&request)?;

        if self.store.username_exists(&request.username).await? {
            return Err(AuthError::Conflict(format!(
                "Username '{}' is already registered",
                request.username
            )));
        }

        if self.store.email_exists(&request.email).await? {
            return Err(AuthError::Conflict(format!(
                "Email '{}' is already registered",
                request.email
            )));
        }

        let password_hash = self.hasher.hash_blocking(request.password).await?;
        let role = request.role.unwrap_or_default();

        // A concurrent insert can still win between the checks above and here.
        let user = self
            .store
            .create_user(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e.downcast::<DuplicateUser>() {
                Ok(dup) => AuthError::Conflict(dup.to_string()),
                Err(e) => AuthError::from(e),
            })?;

        info!(user_id = %user.id, username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    async fn ensure_user(&self, request: CreateUser) -> Result<bool, AuthError> {
        if self.store.username_exists(&request.username).await? {
            return Ok(false);
        }

        self.create_user(request).await?;
        Ok(true)
    }
}
