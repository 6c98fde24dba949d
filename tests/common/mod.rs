//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, SET_COOKIE};
use secure_handlers::{HttpServer, ServerConfig, Shutdown, Variant};
use tokio::net::TcpListener;

/// A server running on an ephemeral port. Stops when dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Default config for `variant`, serving the repository's static tree.
pub fn config_for(variant: Variant) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.variant = variant;
    config.listener.bind_address = "127.0.0.1:0".into();
    config.assets.static_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("static")
        .to_string_lossy()
        .into_owned();
    config.session.signing_key = Some("integration-session-key-0123456789abcdef".into());
    config.csrf.signing_key = Some("integration-csrf-key-0123456789abcdef0123".into());
    config
}

pub async fn start(config: ServerConfig) -> TestServer {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config).unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Wait until the listener answers.
    for _ in 0..50 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    TestServer { addr, shutdown }
}

/// Client that never follows redirects, so 302s can be asserted.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

/// The `name=value` pair of the named cookie in `Set-Cookie` headers.
pub fn set_cookie_pair(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{}=", name)))
        .map(str::to_owned)
}

/// Value of the hidden CSRF field in a rendered form.
pub fn csrf_field(html: &str) -> Option<String> {
    let marker = r#"name="CSRFToken" value=""#;
    let start = html.find(marker)? + marker.len();
    let len = html[start..].find('"')?;
    Some(html[start..start + len].to_owned())
}

pub fn assert_security_headers(headers: &HeaderMap) {
    let expected = [
        ("x-clacks-overhead", "GNU Terry Pratchett"),
        ("x-content-type-options", "nosniff"),
        ("x-frame-options", "deny"),
        ("content-security-policy", "default-src 'self'; frame-ancestors 'none';"),
    ];
    for (name, value) in expected {
        assert_eq!(
            headers.get(name).and_then(|v| v.to_str().ok()),
            Some(value),
            "header {name}"
        );
    }
}
