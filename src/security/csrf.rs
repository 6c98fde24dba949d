//! CSRF protection.
//!
//! Each browser holds a signed cookie with a random base token. Pages embed
//! a masked copy of it (`mask || mask ^ token`, base64url) so the value in
//! the HTML changes on every render. State-changing requests must echo a
//! masked token in the configured header or form field; it is unmasked and
//! compared with the cookie token.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{FromRequest, State};
use axum::http::{header, HeaderMap, HeaderName, Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Form;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::config::CsrfConfig;
use crate::observability::metrics;
use crate::session::cookie::{cookie_value, CookieSigner, CookieSpec};

/// Length of the base token, in bytes.
pub const TOKEN_LEN: usize = 32;

/// Largest form body inspected for a token.
const MAX_FORM_BYTES: usize = 64 * 1024;

pub const REJECTION_BODY: &str = "Forbidden - CSRF token invalid";

/// Masked token for the current request, available to handlers as an
/// `Extension<CsrfToken>`.
#[derive(Debug, Clone)]
pub struct CsrfToken {
    masked: String,
    field_name: Arc<str>,
}

impl CsrfToken {
    /// Value to send back in the header or form field.
    pub fn masked(&self) -> &str {
        &self.masked
    }

    /// Name of the form field that carries the token.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }
}

/// CSRF protection settings shared by the middleware.
#[derive(Debug, Clone)]
pub struct CsrfProtection {
    signer: CookieSigner,
    cookie: CookieSpec,
    field_name: Arc<str>,
    header_name: HeaderName,
}

impl CsrfProtection {
    pub fn new(signer: CookieSigner, config: &CsrfConfig) -> Result<Self, header::InvalidHeaderName> {
        Ok(Self {
            signer,
            cookie: CookieSpec {
                name: config.cookie_name.clone(),
                max_age_secs: config.max_age_secs,
                secure: config.secure,
            },
            field_name: Arc::from(config.field_name.as_str()),
            header_name: HeaderName::from_bytes(config.header_name.as_bytes())?,
        })
    }

    /// Base token from a valid CSRF cookie, if the request carries one.
    fn cookie_token(&self, headers: &HeaderMap) -> Option<[u8; TOKEN_LEN]> {
        let raw = cookie_value(headers, &self.cookie.name)?;
        let payload = self.signer.verify(raw)?;
        URL_SAFE_NO_PAD.decode(payload).ok()?.try_into().ok()
    }

    fn issue_cookie(&self, token: &[u8; TOKEN_LEN]) -> Option<header::HeaderValue> {
        let signed = self.signer.sign(&URL_SAFE_NO_PAD.encode(token));
        self.cookie.set_cookie(&signed).ok()
    }

    /// Masked token from the header, or failing that from a urlencoded body.
    ///
    /// The body is buffered and handed back inside the returned request.
    async fn submitted_token(&self, request: Request<Body>) -> Result<(Request<Body>, Option<String>), Response> {
        if let Some(token) = request
            .headers()
            .get(&self.header_name)
            .and_then(|v| v.to_str().ok())
        {
            let token = token.to_owned();
            return Ok((request, Some(token)));
        }

        if !is_form(request.headers()) {
            return Ok((request, None));
        }

        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, MAX_FORM_BYTES)
            .await
            .map_err(|_| (StatusCode::PAYLOAD_TOO_LARGE, "Form body too large").into_response())?;

        let probe = Request::builder()
            .method(Method::POST)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(bytes.clone()))
            .map_err(|_| StatusCode::BAD_REQUEST.into_response())?;
        let token = Form::<HashMap<String, String>>::from_request(probe, &())
            .await
            .ok()
            .and_then(|Form(mut fields)| fields.remove(&*self.field_name));

        Ok((Request::from_parts(parts, Body::from(bytes)), token))
    }
}

/// Middleware enforcing CSRF tokens on unsafe methods.
pub async fn csrf_middleware(
    State(csrf): State<Arc<CsrfProtection>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let existing = csrf.cookie_token(request.headers());

    let mut request = if is_safe(request.method()) {
        request
    } else {
        let (request, submitted) = match csrf.submitted_token(request).await {
            Ok(parts) => parts,
            Err(response) => return response,
        };
        let reason = match (&existing, submitted.as_deref().and_then(unmask)) {
            (None, _) => Some("missing_cookie"),
            (Some(_), None) => Some("missing_token"),
            (Some(expected), Some(given)) if !bool::from(expected[..].ct_eq(&given[..])) => Some("mismatch"),
            _ => None,
        };
        if let Some(reason) = reason {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                reason = reason,
                "CSRF check failed"
            );
            metrics::record_csrf_rejection(reason);
            return (StatusCode::FORBIDDEN, REJECTION_BODY).into_response();
        }
        request
    };

    let (token, set_cookie) = match existing {
        Some(token) => (token, None),
        None => {
            let token = generate_token();
            (token, csrf.issue_cookie(&token))
        }
    };

    request.extensions_mut().insert(CsrfToken {
        masked: mask(&token),
        field_name: Arc::clone(&csrf.field_name),
    });

    let mut response = next.run(request).await;
    if let Some(cookie) = set_cookie {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE)
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

fn generate_token() -> [u8; TOKEN_LEN] {
    let mut token = [0u8; TOKEN_LEN];
    rand::thread_rng().fill_bytes(&mut token);
    token
}

/// Encode `mask || mask ^ token` with a fresh random mask.
pub fn mask(token: &[u8; TOKEN_LEN]) -> String {
    let mut mask = [0u8; TOKEN_LEN];
    rand::thread_rng().fill_bytes(&mut mask);

    let mut out = Vec::with_capacity(TOKEN_LEN * 2);
    out.extend_from_slice(&mask);
    out.extend(mask.iter().zip(token).map(|(m, t)| m ^ t));
    URL_SAFE_NO_PAD.encode(out)
}

/// Recover the base token from a masked value.
pub fn unmask(masked: &str) -> Option<[u8; TOKEN_LEN]> {
    let raw = URL_SAFE_NO_PAD.decode(masked.trim()).ok()?;
    if raw.len() != TOKEN_LEN * 2 {
        return None;
    }
    let (mask, xored) = raw.split_at(TOKEN_LEN);
    let mut token = [0u8; TOKEN_LEN];
    for (i, (m, x)) in mask.iter().zip(xored).enumerate() {
        token[i] = m ^ x;
    }
    Some(token)
}
