//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Every response:
//!     → headers.rs (hardening headers per variant policy)
//!
//! /login and /secret:
//!     → csrf.rs (token cookie, masked token check on unsafe methods)
//!     → handler
//! ```
//!
//! # Design Decisions
//! - Headers override anything a handler set
//! - CSRF failures are 403 before the handler runs

pub mod csrf;
pub mod headers;

pub use csrf::{CsrfProtection, CsrfToken};
pub use headers::HeaderPolicy;
