//! Route tables for each example variant.
//!
//! # Variants
//! ```text
//! hello       /*            → hello
//! hardened    /*            → hello                          + basic headers
//! fileserver  /static/*     → ServeDir, /* → hello           + basic headers
//! router      /, /{*path}   → hello, /static/* → ServeDir    + basic headers
//! templates   /static/*     → ServeDir, /* → layout page     + basic headers
//! login       /login, /secret (CSRF), /static/*, /* → layout + strict headers
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{any, get};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;

use crate::config::{ServerConfig, Variant};
use crate::http::request::with_request_tracing;
use crate::security::csrf::{csrf_middleware, CsrfProtection};
use crate::security::headers::HeaderPolicy;
use crate::session::SessionGate;
use crate::views::handlers::{hello, layout_page, login_form, login_submit, secret, LoginState};
use crate::views::Templates;

/// Header policy each variant ships with.
pub fn header_policy(variant: Variant) -> HeaderPolicy {
    match variant {
        Variant::Hello => HeaderPolicy::None,
        Variant::Login => HeaderPolicy::Strict,
        _ => HeaderPolicy::Basic,
    }
}

/// Every path answers with the plain greeting.
pub fn hello_routes() -> Router {
    Router::new().fallback(hello)
}

/// Greeting plus the static tree, mounted beside a catch-all fallback.
pub fn fileserver_routes(config: &ServerConfig) -> Router {
    Router::new()
        .nest_service("/static", static_files(config))
        .fallback(hello)
}

/// Same surface as the file server, spelled out as explicit routes.
pub fn router_routes(config: &ServerConfig) -> Router {
    Router::new()
        .route("/", any(hello))
        .route("/{*path}", any(hello))
        .nest_service("/static", static_files(config))
}

/// Static tree plus the layout page for every other path.
pub fn template_routes(config: &ServerConfig, templates: Templates) -> Router {
    Router::new()
        .nest_service("/static", static_files(config))
        .fallback(layout_page)
        .with_state(templates)
}

/// Login form, protected page, static tree and layout page.
///
/// CSRF checks cover `/login` and `/secret` only.
pub fn login_routes(
    config: &ServerConfig,
    templates: Templates,
    gate: Arc<SessionGate>,
    csrf: Arc<CsrfProtection>,
) -> Router {
    let state = LoginState {
        templates,
        gate,
        display_name: Arc::from(config.credentials.display_name.as_str()),
    };

    Router::new()
        .route("/login", get(login_form).post(login_submit))
        .route("/secret", get(secret))
        .route_layer(axum::middleware::from_fn_with_state(csrf, csrf_middleware))
        .nest_service("/static", static_files(config))
        .fallback(layout_page)
        .with_state(state)
}

/// Wrap variant routes with the cross-cutting layers.
///
/// Headers sit outside the timeout so a 408 carries them too.
#[allow(deprecated)]
pub fn finish(config: &ServerConfig, routes: Router) -> Router {
    let routes = routes.layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));
    let routes = header_policy(config.variant).apply(routes);
    with_request_tracing(routes)
}

fn static_files(config: &ServerConfig) -> ServeDir {
    ServeDir::new(&config.assets.static_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::AppError;
    use crate::security::headers::{CLACKS_VALUE, CSP};
    use crate::session::SessionError;
    use axum::body::Body;
    use axum::http::{HeaderMap, Request, StatusCode};
    use tower::ServiceExt;

    fn assert_strict_headers(headers: &HeaderMap) {
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "deny");
        assert_eq!(headers["content-security-policy"], CSP);
        assert_eq!(headers["x-clacks-overhead"], CLACKS_VALUE);
    }

    fn app() -> Router {
        let mut config = ServerConfig::default();
        config.timeouts.request_secs = 1;

        let routes = Router::new()
            .route(
                "/fail",
                get(|| async { Err::<String, _>(AppError::Session(SessionError::Store("down".into()))) }),
            )
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    "late"
                }),
            );
        finish(&config, routes)
    }

    #[tokio::test]
    async fn internal_errors_carry_security_headers() {
        let response = app()
            .oneshot(Request::get("/fail").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_strict_headers(response.headers());
    }

    #[tokio::test]
    async fn timeouts_carry_security_headers() {
        let response = app()
            .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_strict_headers(response.headers());
    }

    #[test]
    fn header_policy_per_variant() {
        assert_eq!(header_policy(Variant::Hello), HeaderPolicy::None);
        assert_eq!(header_policy(Variant::Hardened), HeaderPolicy::Basic);
        assert_eq!(header_policy(Variant::Login), HeaderPolicy::Strict);
    }
}
