//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, graceful shutdown)
//!     → request.rs (request id, trace span)
//!     → security headers, timeout
//!     → routes.rs (variant route table)
//!     → views (pages) / response.rs (internal errors → 500)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod routes;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::AppError;
pub use server::{build_app, App, HttpServer, StartupError};
