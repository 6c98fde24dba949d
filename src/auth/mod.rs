//! Credential checking for the login flow.

pub mod credentials;

pub use credentials::{hash_password, AuthError, CredentialVerifier, StaticCredentials};
