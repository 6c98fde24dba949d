//! Security response headers.
//!
//! Each header is a `SetResponseHeaderLayer` that overrides whatever the
//! handler set, so every response of a variant carries the full policy,
//! redirects and error pages included.

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

pub const X_CLACKS_OVERHEAD: HeaderName = HeaderName::from_static("x-clacks-overhead");
pub const CLACKS_VALUE: &str = "GNU Terry Pratchett";
pub const NOSNIFF: &str = "nosniff";
pub const FRAME_DENY: &str = "deny";
pub const CSP: &str = "default-src 'self'; frame-ancestors 'none';";

/// Which hardening headers a server sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPolicy {
    /// No extra headers.
    None,
    /// Marker header plus `X-Content-Type-Options`.
    Basic,
    /// Basic plus framing and content security policy.
    Strict,
}

impl HeaderPolicy {
    /// Headers in the order they are applied.
    pub fn headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        let basic = [
            (X_CLACKS_OVERHEAD, HeaderValue::from_static(CLACKS_VALUE)),
            (
                axum::http::header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static(NOSNIFF),
            ),
        ];
        let strict = [
            (
                axum::http::header::X_FRAME_OPTIONS,
                HeaderValue::from_static(FRAME_DENY),
            ),
            (
                axum::http::header::CONTENT_SECURITY_POLICY,
                HeaderValue::from_static(CSP),
            ),
        ];

        match self {
            HeaderPolicy::None => Vec::new(),
            HeaderPolicy::Basic => basic.to_vec(),
            HeaderPolicy::Strict => basic.into_iter().chain(strict).collect(),
        }
    }

    /// Wrap every route of `router` with this policy.
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.headers()
            .into_iter()
            .fold(router, |router, (name, value)| {
                router.layer(SetResponseHeaderLayer::overriding(name, value))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    #[test]
    fn strict_extends_basic() {
        let basic = HeaderPolicy::Basic.headers();
        let strict = HeaderPolicy::Strict.headers();
        assert_eq!(basic.len(), 2);
        assert_eq!(strict.len(), 4);
        assert_eq!(&strict[..2], &basic[..]);
        assert!(HeaderPolicy::None.headers().is_empty());
    }

    #[tokio::test]
    async fn headers_reach_unmatched_routes_too() {
        let app = HeaderPolicy::Strict.apply(Router::new().route("/", get(|| async { "ok" })));
        let response = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let headers = response.headers();
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "deny");
        assert_eq!(headers["content-security-policy"], CSP);
        assert_eq!(headers["x-clacks-overhead"], CLACKS_VALUE);
    }
}
