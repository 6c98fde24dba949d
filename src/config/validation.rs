//! Configuration validation.
//!
//! Serde handles the syntax; this module checks values that parse fine but
//! cannot work at runtime. All problems are reported, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// Minimum length of a configured signing key, in bytes.
pub const MIN_KEY_LEN: usize = 32;

/// Longest cookie or session lifetime accepted, in seconds (400 days).
pub const MAX_LIFETIME_SECS: u64 = 400 * 24 * 60 * 60;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("session.ttl_secs must be greater than zero")]
    ZeroSessionTtl,

    #[error("{field} must not exceed {max} seconds", max = MAX_LIFETIME_SECS)]
    LifetimeTooLong { field: &'static str },

    #[error("{field} must be at least {min} bytes", min = MIN_KEY_LEN)]
    ShortKey { field: &'static str },

    #[error("{field} must be a non-empty cookie token")]
    CookieName { field: &'static str },

    #[error("session.cookie_name and csrf.cookie_name must differ")]
    CookieCollision,

    #[error("credentials.username must not be empty")]
    EmptyUsername,

    #[error("credentials need either `password` or `password_hash`")]
    MissingPassword,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.session.ttl_secs == 0 {
        errors.push(ValidationError::ZeroSessionTtl);
    }

    if config.session.ttl_secs > MAX_LIFETIME_SECS {
        errors.push(ValidationError::LifetimeTooLong { field: "session.ttl_secs" });
    }

    if config.csrf.max_age_secs > MAX_LIFETIME_SECS {
        errors.push(ValidationError::LifetimeTooLong { field: "csrf.max_age_secs" });
    }

    if let Some(key) = &config.session.signing_key {
        if key.len() < MIN_KEY_LEN {
            errors.push(ValidationError::ShortKey { field: "session.signing_key" });
        }
    }

    if let Some(key) = &config.csrf.signing_key {
        if key.len() < MIN_KEY_LEN {
            errors.push(ValidationError::ShortKey { field: "csrf.signing_key" });
        }
    }

    if !is_cookie_token(&config.session.cookie_name) {
        errors.push(ValidationError::CookieName { field: "session.cookie_name" });
    }

    if !is_cookie_token(&config.csrf.cookie_name) {
        errors.push(ValidationError::CookieName { field: "csrf.cookie_name" });
    }

    if config.session.cookie_name == config.csrf.cookie_name {
        errors.push(ValidationError::CookieCollision);
    }

    if config.credentials.username.is_empty() {
        errors.push(ValidationError::EmptyUsername);
    }

    if config.credentials.password.is_none() && config.credentials.password_hash.is_none() {
        errors.push(ValidationError::MissingPassword);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// RFC 6265 cookie-name: visible ASCII minus separators.
fn is_cookie_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b)
        })
}
