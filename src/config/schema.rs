//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the example servers.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Which example server to run.
    pub variant: Variant,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Static file serving.
    pub assets: AssetsConfig,

    /// Session cookie settings.
    pub session: SessionConfig,

    /// CSRF protection settings.
    pub csrf: CsrfConfig,

    /// The single login identity.
    pub credentials: CredentialsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// The example servers, in order of increasing hardening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Bare responder echoing the request path.
    Hello,
    /// Same responder with hardening headers.
    Hardened,
    /// Responder plus a static file tree.
    Fileserver,
    /// Explicit route table with path prefixes.
    Router,
    /// Responder rendered through an HTML layout.
    Templates,
    /// Cookie-session login with CSRF protection.
    #[default]
    Login,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Hello => "hello",
            Variant::Hardened => "hardened",
            Variant::Fileserver => "fileserver",
            Variant::Router => "router",
            Variant::Templates => "templates",
            Variant::Login => "login",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory served under `/static/`.
    pub static_dir: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            static_dir: "static".to_string(),
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie.
    pub cookie_name: String,

    /// Session lifetime in seconds (cookie Max-Age and store TTL).
    pub ttl_secs: u64,

    /// Mark the cookie `Secure` (HTTPS only).
    pub secure: bool,

    /// Key used to sign session cookies. Overridden by `SESSION_KEY`.
    /// When unset, a random key is generated at startup.
    pub signing_key: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session".to_string(),
            ttl_secs: 86_400,
            secure: false,
            signing_key: None,
        }
    }
}

/// CSRF protection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CsrfConfig {
    /// Name of the cookie holding the signed base token.
    pub cookie_name: String,

    /// Form field carrying the masked token.
    pub field_name: String,

    /// Request header carrying the masked token.
    pub header_name: String,

    /// Mark the cookie `Secure` (HTTPS only).
    pub secure: bool,

    /// Cookie lifetime in seconds.
    pub max_age_secs: u64,

    /// Key used to sign the CSRF cookie. Overridden by `CSRF_KEY`.
    pub signing_key: Option<String>,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: "csrf".to_string(),
            field_name: "CSRFToken".to_string(),
            header_name: "X-CSRF-Token".to_string(),
            secure: false,
            max_age_secs: 12 * 3600,
            signing_key: None,
        }
    }
}

/// The single login identity accepted by the `login` variant.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub username: String,

    /// Plaintext password, hashed at startup. Overridden by `LOGIN_PASSWORD`.
    pub password: Option<String>,

    /// Pre-computed Argon2 PHC string. Takes precedence over `password`.
    pub password_hash: Option<String>,

    /// Name greeted after a successful login.
    pub display_name: String,
}

/// Built-in demo password, only acceptable for local experiments.
pub const DEFAULT_PASSWORD: &str = "testpass";

impl CredentialsConfig {
    /// Whether the login still accepts the built-in demo password.
    pub fn uses_default_password(&self) -> bool {
        self.password_hash.is_none() && self.password.as_deref() == Some(DEFAULT_PASSWORD)
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            username: "testuser".to_string(),
            password: Some(DEFAULT_PASSWORD.to_string()),
            password_hash: None,
            display_name: "Test".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
