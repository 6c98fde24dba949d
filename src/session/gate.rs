//! The authenticated-session gate.
//!
//! Decides, per request, whether the caller holds an authenticated session,
//! and establishes one after a successful credential check.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, HeaderValue, StatusCode};

use super::cookie::{cookie_value, CookieSigner, CookieSpec};
use super::store::SessionStore;
use super::{SessionError, SessionId, SessionState};
use crate::auth::CredentialVerifier;
use crate::config::SessionConfig;
use crate::observability::metrics;

/// Where unauthenticated callers are sent.
pub const LOGIN_PATH: &str = "/login";

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    DenyWithRedirect(&'static str),
}

impl Access {
    /// Status code the decision is served with.
    pub fn status(&self) -> StatusCode {
        match self {
            Access::Allow => StatusCode::OK,
            Access::DenyWithRedirect(_) => StatusCode::FOUND,
        }
    }
}

/// Outcome of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials matched; attach `set_cookie` to the response.
    Authenticated { set_cookie: HeaderValue },
    /// Credentials did not match. Which part was wrong is not revealed.
    Rejected,
}

/// Session gate shared by all request handlers.
#[derive(Clone)]
pub struct SessionGate {
    store: Arc<dyn SessionStore>,
    verifier: Arc<dyn CredentialVerifier>,
    signer: CookieSigner,
    cookie: CookieSpec,
}

impl SessionGate {
    pub fn new(
        store: Arc<dyn SessionStore>,
        verifier: Arc<dyn CredentialVerifier>,
        signer: CookieSigner,
        config: &SessionConfig,
    ) -> Self {
        Self {
            store,
            verifier,
            signer,
            cookie: CookieSpec {
                name: config.cookie_name.clone(),
                max_age_secs: config.ttl_secs,
                secure: config.secure,
            },
        }
    }

    /// Decide whether the request may see protected content.
    ///
    /// Read-only: calling this any number of times changes nothing.
    pub fn check_access(&self, headers: &HeaderMap) -> Access {
        let access = match self.session_state(headers) {
            SessionState::Authenticated => Access::Allow,
            SessionState::Anonymous => Access::DenyWithRedirect(LOGIN_PATH),
        };
        metrics::record_gate_decision(access == Access::Allow);
        access
    }

    /// Resolve the caller's session state.
    ///
    /// Missing, malformed, forged, expired or unreadable sessions are all
    /// `Anonymous`.
    pub fn session_state(&self, headers: &HeaderMap) -> SessionState {
        let Some(id) = self.presented_session(headers) else {
            return SessionState::Anonymous;
        };
        match self.store.load(&id) {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed; treating request as anonymous");
                SessionState::Anonymous
            }
        }
    }

    /// Check credentials and, on success, establish an authenticated session.
    ///
    /// The credential check runs on the blocking pool since password hashing
    /// is CPU-bound. Any session the caller already presented is replaced by
    /// a fresh id.
    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome, SessionError> {
        let verifier = Arc::clone(&self.verifier);
        let (user, pass) = (username.to_owned(), password.to_owned());
        let accepted = tokio::task::spawn_blocking(move || verifier.verify(&user, &pass)).await?;

        metrics::record_login(accepted);
        if !accepted {
            tracing::info!("Login rejected");
            return Ok(LoginOutcome::Rejected);
        }

        if let Some(previous) = self.presented_session(headers) {
            self.store.remove(&previous)?;
        }

        let id = SessionId::generate();
        let ttl = Duration::from_secs(self.cookie.max_age_secs);
        self.store.save(&id, SessionState::Authenticated, ttl)?;

        let set_cookie = self.cookie.set_cookie(&self.signer.sign(&id.to_string()))?;
        tracing::info!("Login accepted; session established");
        Ok(LoginOutcome::Authenticated { set_cookie })
    }

    fn presented_session(&self, headers: &HeaderMap) -> Option<SessionId> {
        let raw = cookie_value(headers, &self.cookie.name)?;
        let payload = self.signer.verify(raw)?;
        payload.parse().ok()
    }
}
