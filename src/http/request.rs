//! Request identification and tracing.
//!
//! Every request gets an `x-request-id` (a UUID v4 unless the client sent
//! one) as early as possible, so the trace span and the response carry it.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, Request};
use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request id from headers, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Wrap `router` with request-id assignment, propagation and a trace span.
pub fn with_request_tracing(router: Router) -> Router {
    router
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id(request.headers()),
            )
        }))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum::routing::get;
    use tower::ServiceExt;

    fn app() -> Router {
        with_request_tracing(Router::new().route(
            "/",
            get(|headers: HeaderMap| async move { request_id(&headers).to_owned() }),
        ))
    }

    #[tokio::test]
    async fn assigns_and_echoes_request_id() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let id = response.headers()[X_REQUEST_ID].to_str().unwrap().to_owned();
        assert_eq!(id.len(), 36);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, id.as_bytes());
    }

    #[tokio::test]
    async fn keeps_client_supplied_id() {
        let response = app()
            .oneshot(
                Request::get("/")
                    .header(X_REQUEST_ID, HeaderValue::from_static("abc-123"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "abc-123");
    }

    #[test]
    fn missing_id_reads_unknown() {
        assert_eq!(request_id(&HeaderMap::new()), "unknown");
    }
}
