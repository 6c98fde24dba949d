//! Example web servers showing progressively more security-conscious
//! handler patterns: a bare responder, hardening headers, static files,
//! explicit routing, templates, and a cookie-session login with CSRF
//! protection and password hashing.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod session;
pub mod views;

pub use config::{ServerConfig, Variant};
pub use http::{build_app, HttpServer};
pub use lifecycle::Shutdown;
pub use session::{Access, LoginOutcome, SessionGate};
