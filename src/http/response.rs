//! Error responses.
//!
//! Expected outcomes (bad credentials, missing session) are ordinary
//! responses built by the handlers. Anything else becomes an `AppError`,
//! is logged, and is answered with a bare 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::session::SessionError;

/// Internal failure while handling a request.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("template rendering failed: {0}")]
    Render(#[from] minijinja::Error),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
