//! Pages served by the example variants.
//!
//! # Design Decisions
//! - Templates are embedded at compile time; a render failure is a 500
//! - Login failures re-render the same form without saying which field was wrong

pub mod handlers;
pub mod templates;

pub use handlers::LoginState;
pub use templates::{PageData, Templates};
