//! Argon2id password hashing.
//!
//! Hashing is CPU-bound on purpose. Async callers should use the `*_blocking`
//! variants, which move the work onto tokio's blocking pool.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use std::sync::Arc;
use tokio::task;

use crate::config::SecurityConfig;
use crate::services::auth_service::AuthError;

/// Verified against when a login names an unknown user, so both failure paths
/// pay the same hashing cost.
const DUMMY_PASSWORD: &str = "reportkeep-timing-equalizer";

#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    max_bytes: usize,
    dummy_hash: Arc<str>,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}

impl PasswordHasher {
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if the Argon2 params are out of range.
    pub fn new(
        memory_cost_kib: u32,
        time_cost: u32,
        parallelism: u32,
        max_bytes: usize,
    ) -> Result<Self, AuthError> {
        let params = Params::new(memory_cost_kib, time_cost, parallelism, None)
            .map_err(|e| AuthError::Internal(format!("Invalid Argon2 params: {e}")))?;

        let mut hasher = Self {
            params,
            max_bytes,
            dummy_hash: Arc::from(""),
        };
        hasher.dummy_hash = Arc::from(hasher.hash(DUMMY_PASSWORD)?);
        Ok(hasher)
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, AuthError> {
        Self::new(
            config.argon2_memory_cost_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
            config.max_password_bytes,
        )
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Rejects input over the byte limit instead of letting it be truncated.
    pub fn check_length(&self, plaintext: &str) -> Result<(), AuthError> {
        if plaintext.len() > self.max_bytes {
            return Err(AuthError::PasswordTooLong {
                max: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Hashes with a fresh random salt; the same input never hashes twice to
    /// the same string.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        self.check_length(plaintext)?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(format!("Failed to hash password: {e}")))?;

        Ok(hash.to_string())
    }

    /// Never errors: malformed hashes and over-length input simply fail.
    #[must_use]
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        if plaintext.len() > self.max_bytes {
            return false;
        }

        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };

        // params are read back from the PHC string, so older hashes still verify
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Burns one verification's worth of CPU and always returns `false`.
    pub fn verify_dummy(&self, plaintext: &str) -> bool {
        let _ = self.verify(plaintext, &self.dummy_hash);
        false
    }

    pub async fn hash_blocking(&self, plaintext: String) -> Result<String, AuthError> {
        let hasher = self.clone();
        task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task panicked: {e}")))?
    }

    pub async fn verify_blocking(&self, plaintext: String, hash: Option<String>) -> bool {
        let hasher = self.clone();
        let result = task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&plaintext, &hash),
            None => hasher.verify_dummy(&plaintext),
        })
        .await;

        match result {
            Ok(valid) => valid,
            Err(e) => {
                tracing::error!("Password verification task panicked: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(1024, 1, 1, 72).expect("cheap test params")
}
