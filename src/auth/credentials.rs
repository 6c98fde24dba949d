//! Credential verification.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;
use thiserror::Error;

use crate::config::CredentialsConfig;

/// Errors raised while preparing credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("configured password hash is not a valid PHC string: {0}")]
    InvalidHash(String),

    #[error("no password or password hash configured")]
    MissingPassword,
}

/// Decides whether a username/password pair is acceptable.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Hash a password with Argon2id and a random salt, returning a PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|e| AuthError::Hash(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// A single username with an Argon2 password hash.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    username: String,
    password_hash: String,
}

impl StaticCredentials {
    /// Build from a username and an existing PHC hash string.
    pub fn with_hash(username: impl Into<String>, password_hash: impl Into<String>) -> Result<Self, AuthError> {
        let password_hash = password_hash.into();
        PasswordHash::new(&password_hash).map_err(|e| AuthError::InvalidHash(e.to_string()))?;
        Ok(Self {
            username: username.into(),
            password_hash,
        })
    }

    /// Build from a username and a plaintext password, hashing it now.
    pub fn with_password(username: impl Into<String>, password: &str) -> Result<Self, AuthError> {
        let password_hash = hash_password(password)?;
        Ok(Self {
            username: username.into(),
            password_hash,
        })
    }

    /// Build from configuration. A configured hash wins over a password.
    pub fn from_config(config: &CredentialsConfig) -> Result<Self, AuthError> {
        match (&config.password_hash, &config.password) {
            (Some(hash), _) => Self::with_hash(config.username.clone(), hash.clone()),
            (None, Some(password)) => Self::with_password(config.username.clone(), password),
            (None, None) => Err(AuthError::MissingPassword),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        // Hash every attempt so a wrong username costs as much as a wrong password.
        let password_ok = match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::error!(error = %e, "Stored password hash is unreadable");
                false
            }
        };
        password_ok && username == self.username
    }
}
