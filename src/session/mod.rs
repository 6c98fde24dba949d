//! Cookie sessions and the authenticated-session gate.
//!
//! # Data Flow
//! ```text
//! Cookie: session=<id>.<tag>
//!     → cookie.rs (find cookie, verify HMAC tag)
//!     → store.rs (id → SessionState, expiry)
//!     → gate.rs (Allow | DenyWithRedirect, establish on login)
//! ```
//!
//! # Design Decisions
//! - A session is Anonymous or Authenticated, nothing in between
//! - Any failure to read a session reads as Anonymous
//! - Successful login always issues a fresh session id

pub mod cookie;
pub mod gate;
pub mod store;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

pub use cookie::{CookieSigner, CookieSpec};
pub use gate::{Access, LoginOutcome, SessionGate};
pub use store::{MemorySessionStore, SessionStore};

/// Value a string-typed store writes for an authenticated session.
pub const AUTHENTICATED_FLAG: &str = "Yes";

/// Authentication state of one browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated,
}

impl SessionState {
    /// Decode a stored flag. Only the exact sentinel authenticates.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(AUTHENTICATED_FLAG) => SessionState::Authenticated,
            _ => SessionState::Anonymous,
        }
    }

    /// Encode for string-typed stores; `None` means "do not store a flag".
    pub fn as_flag(&self) -> Option<&'static str> {
        match self {
            SessionState::Authenticated => Some(AUTHENTICATED_FLAG),
            SessionState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }
}

/// Opaque session identifier carried in the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Errors raised while establishing a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backing store could not complete an operation.
    #[error("session store failure: {0}")]
    Store(String),

    /// A cookie value could not be encoded as a header.
    #[error("invalid cookie header: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),

    /// The credential check task did not complete.
    #[error("credential check aborted: {0}")]
    Verifier(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_sentinel_authenticates() {
        assert_eq!(SessionState::from_flag(Some("Yes")), SessionState::Authenticated);
        for flag in [Some("yes"), Some("YES"), Some("true"), Some(""), None] {
            assert_eq!(SessionState::from_flag(flag), SessionState::Anonymous);
        }
    }

    #[test]
    fn flag_encoding_matches_decoding() {
        for state in [SessionState::Anonymous, SessionState::Authenticated] {
            assert_eq!(SessionState::from_flag(state.as_flag()), state);
        }
    }

    #[test]
    fn session_ids_parse_back() {
        let id = SessionId::generate();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-session".parse::<SessionId>().is_err());
    }
}
