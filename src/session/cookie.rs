//! Signed cookie values.
//!
//! A signed value has the form `<payload>.<tag>` where `tag` is the
//! base64url HMAC-SHA256 of the payload. Payloads must not contain `.`.

use axum::http::{header, HeaderMap, HeaderValue};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of generated keys, in bytes.
const GENERATED_KEY_LEN: usize = 64;

/// Signs and verifies cookie payloads with a process-wide key.
#[derive(Clone)]
pub struct CookieSigner {
    key: Vec<u8>,
}

impl std::fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSigner").finish_non_exhaustive()
    }
}

impl CookieSigner {
    /// Create a signer from raw key bytes.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    /// Create a signer with a freshly generated random key.
    pub fn generate() -> Self {
        let mut key = vec![0u8; GENERATED_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        Self { key }
    }

    /// Use the configured key, or generate one when none is configured.
    ///
    /// `purpose` only labels the warning.
    pub fn from_configured(key: Option<&str>, purpose: &str) -> Self {
        match key {
            Some(key) => Self::new(key.as_bytes()),
            None => {
                tracing::warn!(
                    purpose = purpose,
                    "No signing key configured; generated an ephemeral key (cookies will not survive a restart)"
                );
                Self::generate()
            }
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length")
    }

    /// Sign a payload, returning `<payload>.<tag>`.
    pub fn sign(&self, payload: &str) -> String {
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let tag = mac.finalize().into_bytes();
        format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(tag))
    }

    /// Verify a signed value and return its payload.
    ///
    /// The tag comparison is constant-time.
    pub fn verify<'a>(&self, signed: &'a str) -> Option<&'a str> {
        let (payload, tag) = signed.rsplit_once('.')?;
        let tag = URL_SAFE_NO_PAD.decode(tag).ok()?;
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&tag).ok()?;
        Some(payload)
    }
}

/// Find the value of the named cookie across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"'))
}

/// Attributes applied to every cookie this crate issues.
#[derive(Debug, Clone)]
pub struct CookieSpec {
    pub name: String,
    pub max_age_secs: u64,
    pub secure: bool,
}

impl CookieSpec {
    /// Build a `Set-Cookie` header value for `value`.
    pub fn set_cookie(&self, value: &str) -> Result<HeaderValue, header::InvalidHeaderValue> {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict",
            self.name, value, self.max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_value_verifies() {
        let signer = CookieSigner::new(b"0123456789abcdef0123456789abcdef".to_vec());
        let signed = signer.sign("abc-123");
        assert!(signed.starts_with("abc-123."));
        assert_eq!(signer.verify(&signed), Some("abc-123"));
    }

    #[test]
    fn tampered_values_are_rejected() {
        let signer = CookieSigner::generate();
        let signed = signer.sign("abc-123");

        let tampered = signed.replacen("abc", "abd", 1);
        assert_eq!(signer.verify(&tampered), None);
        assert_eq!(signer.verify("abc-123"), None);
        assert_eq!(signer.verify("abc-123.not base64!"), None);
        assert_eq!(CookieSigner::generate().verify(&signed), None);
    }

    #[test]
    fn finds_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1; session=xyz"));
        headers.append(header::COOKIE, HeaderValue::from_static("csrf=\"q\""));

        assert_eq!(cookie_value(&headers, "session"), Some("xyz"));
        assert_eq!(cookie_value(&headers, "csrf"), Some("q"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn set_cookie_carries_attributes() {
        let spec = CookieSpec {
            name: "session".into(),
            max_age_secs: 60,
            secure: true,
        };
        let value = spec.set_cookie("v").unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "session=v; Path=/; Max-Age=60; HttpOnly; SameSite=Strict; Secure"
        );
    }
}
