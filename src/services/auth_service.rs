//! Domain service for authentication.
//!
//! Handles login (credential check plus token minting) and resolving a
//! presented bearer token back to a live user record.

use serde::Serialize;
use thiserror::Error;

use crate::constants::auth::TOKEN_TYPE;
use crate::domain::Principal;
use crate::services::token::TokenError;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password; the two are deliberately
    /// indistinguishable.
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Password must be at most {max} bytes")]
    PasswordTooLong { max: usize },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(msg) => Self::Internal(msg),
            TokenError::Malformed | TokenError::BadSignature | TokenError::Expired => {
                Self::Unauthorized
            }
        }
    }
}

/// Read-only user lookup the auth layer depends on.
///
/// Implementations must match usernames exactly (case-sensitive) and return
/// the current row, not a cached copy.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Principal>>;
}

/// Successful login response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

impl AccessToken {
    #[must_use]
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
        }
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and mints a fresh bearer token.
    ///
    /// Read-only and idempotent: every successful call returns a new,
    /// independent token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown user or a wrong
    /// password, and [`AuthError::PasswordTooLong`] before any lookup if the
    /// password exceeds the hashing limit.
    async fn login(&self, username: &str, password: &str) -> Result<AccessToken, AuthError>;

    /// Resolves a bearer token to the user it names, as currently stored.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] if the token does not decode, has
    /// expired, or names a user that no longer exists.
    async fn resolve(&self, token: &str) -> Result<Principal, AuthError>;
}
