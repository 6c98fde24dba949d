//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (secrets)
//!     → command line overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Secrets come from the environment, never from literals in code
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{
    AssetsConfig, CredentialsConfig, CsrfConfig, ListenerConfig, ObservabilityConfig,
    ServerConfig, SessionConfig, TimeoutConfig, Variant,
};
