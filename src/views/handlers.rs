//! Request handlers for the example pages.

use std::sync::Arc;

use axum::extract::{Extension, FromRef, State};
use axum::http::{header, HeaderMap, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use super::templates::{PageData, Templates, LAYOUT, LOGIN, SECRET};
use crate::http::response::AppError;
use crate::security::csrf::CsrfToken;
use crate::session::{Access, LoginOutcome, SessionGate};

/// State for the login variant.
#[derive(Clone)]
pub struct LoginState {
    pub templates: Templates,
    pub gate: Arc<SessionGate>,
    pub display_name: Arc<str>,
}

impl FromRef<LoginState> for Templates {
    fn from_ref(state: &LoginState) -> Self {
        state.templates.clone()
    }
}

/// Submitted login form. Missing fields read as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Plain-text greeting echoing the requested path.
pub async fn hello(uri: Uri) -> String {
    format!("Hello, you've requested: {}\n", uri.path())
}

/// Greeting rendered through the HTML layout.
pub async fn layout_page(State(templates): State<Templates>, uri: Uri) -> Result<Html<String>, AppError> {
    let data = PageData {
        request_path: uri.path(),
        ..Default::default()
    };
    Ok(Html(templates.render(LAYOUT, &data)?))
}

pub async fn login_form(
    State(state): State<LoginState>,
    Extension(csrf): Extension<CsrfToken>,
) -> Result<Html<String>, AppError> {
    render_login(&state.templates, &csrf, None)
}

/// Check submitted credentials; the form is re-rendered either way.
pub async fn login_submit(
    State(state): State<LoginState>,
    Extension(csrf): Extension<CsrfToken>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match state.gate.authenticate(&headers, &form.username, &form.password).await? {
        LoginOutcome::Authenticated { set_cookie } => {
            let page = render_login(&state.templates, &csrf, Some(&*state.display_name))?;
            Ok(([(header::SET_COOKIE, set_cookie)], page).into_response())
        }
        LoginOutcome::Rejected => Ok(render_login(&state.templates, &csrf, None)?.into_response()),
    }
}

/// Protected page; anonymous callers are redirected to the login form.
pub async fn secret(State(state): State<LoginState>, headers: HeaderMap) -> Result<Response, AppError> {
    match state.gate.check_access(&headers) {
        Access::Allow => {
            let page = state.templates.render(SECRET, &PageData::default())?;
            Ok(Html(page).into_response())
        }
        access @ Access::DenyWithRedirect(target) => {
            tracing::debug!(redirect = target, "Anonymous request for protected page");
            Ok((access.status(), [(header::LOCATION, target)]).into_response())
        }
    }
}

fn render_login(templates: &Templates, csrf: &CsrfToken, user: Option<&str>) -> Result<Html<String>, AppError> {
    let data = PageData {
        user,
        csrf_field: csrf.field_name(),
        csrf_token: csrf.masked(),
        ..Default::default()
    };
    Ok(Html(templates.render(LOGIN, &data)?))
}
