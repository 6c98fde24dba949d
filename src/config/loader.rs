//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `session.signing_key`.
pub const SESSION_KEY_ENV: &str = "SESSION_KEY";
/// Environment variable overriding `csrf.signing_key`.
pub const CSRF_KEY_ENV: &str = "CSRF_KEY";
/// Environment variable overriding `credentials.password`.
pub const LOGIN_PASSWORD_ENV: &str = "LOGIN_PASSWORD";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a configuration from TOML text without validating it.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Load a configuration from a TOML file, without validating it.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Apply secret overrides from the process environment.
pub fn apply_env_overrides(config: &mut ServerConfig) {
    apply_overrides_from(config, |name| std::env::var(name).ok());
}

/// Apply secret overrides from an arbitrary variable lookup.
///
/// Empty values are ignored so an exported-but-blank variable does not wipe
/// a configured key.
pub fn apply_overrides_from<F>(config: &mut ServerConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(key) = lookup(SESSION_KEY_ENV) {
        config.session.signing_key = Some(key);
    }
    if let Some(key) = lookup(CSRF_KEY_ENV) {
        config.csrf.signing_key = Some(key);
    }
    if let Some(password) = lookup(LOGIN_PASSWORD_ENV) {
        config.credentials.password = Some(password);
        config.credentials.password_hash = None;
    }
}

/// Validate a fully assembled configuration.
pub fn finalize(config: ServerConfig) -> Result<ServerConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_replace_secrets() {
        let env: HashMap<&str, &str> = [
            (SESSION_KEY_ENV, "0123456789abcdef0123456789abcdef"),
            (LOGIN_PASSWORD_ENV, "hunter22"),
            (CSRF_KEY_ENV, ""),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config.credentials.password_hash = Some("$argon2id$stale".into());
        apply_overrides_from(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(
            config.session.signing_key.as_deref(),
            Some("0123456789abcdef0123456789abcdef")
        );
        assert_eq!(config.credentials.password.as_deref(), Some("hunter22"));
        assert!(config.credentials.password_hash.is_none());
        assert!(config.csrf.signing_key.is_none());
    }

    #[test]
    fn finalize_surfaces_validation_errors() {
        let config = parse_config("[timeouts]\nrequest_secs = 0\n").unwrap();
        match finalize(config) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors, vec![ValidationError::ZeroTimeout]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn parse_errors_are_reported() {
        assert!(matches!(parse_config("variant = 3"), Err(ConfigError::Parse(_))));
    }
}
