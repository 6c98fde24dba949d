//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the services the configured variant needs
//! - Assemble the Axum router with all middleware layers
//! - Serve on a listener until shutdown is signalled
//! - Sweep expired sessions in the background

use std::sync::Arc;
use std::time::Duration;

use axum::http::header::InvalidHeaderName;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::auth::{AuthError, StaticCredentials};
use crate::config::{ServerConfig, Variant};
use crate::http::routes;
use crate::security::csrf::CsrfProtection;
use crate::session::{CookieSigner, MemorySessionStore, SessionGate};
use crate::views::Templates;

/// How often expired sessions are swept from memory.
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Errors raised while assembling the application.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("credential setup failed: {0}")]
    Auth(#[from] AuthError),

    #[error("template compilation failed: {0}")]
    Templates(#[from] minijinja::Error),

    #[error("invalid CSRF header name: {0}")]
    CsrfHeader(#[from] InvalidHeaderName),
}

/// A fully assembled application.
pub struct App {
    pub router: Router,
    /// Session store of the login variant, swept while serving.
    pub sessions: Option<Arc<MemorySessionStore>>,
}

/// Build the router and services for `config.variant`.
pub fn build_app(config: &ServerConfig) -> Result<App, StartupError> {
    let (router, sessions) = match config.variant {
        Variant::Hello | Variant::Hardened => (routes::hello_routes(), None),
        Variant::Fileserver => (routes::fileserver_routes(config), None),
        Variant::Router => (routes::router_routes(config), None),
        Variant::Templates => (routes::template_routes(config, Templates::new()?), None),
        Variant::Login => {
            if config.credentials.uses_default_password() {
                tracing::warn!(
                    username = %config.credentials.username,
                    bind_address = %config.listener.bind_address,
                    "Login accepts the built-in demo password; set LOGIN_PASSWORD or credentials.password_hash"
                );
            }
            let sessions = Arc::new(MemorySessionStore::new());
            let verifier = Arc::new(StaticCredentials::from_config(&config.credentials)?);
            let gate = SessionGate::new(
                sessions.clone(),
                verifier,
                CookieSigner::from_configured(config.session.signing_key.as_deref(), "session"),
                &config.session,
            );
            let csrf = CsrfProtection::new(
                CookieSigner::from_configured(config.csrf.signing_key.as_deref(), "csrf"),
                &config.csrf,
            )?;
            let router = routes::login_routes(config, Templates::new()?, Arc::new(gate), Arc::new(csrf));
            (router, Some(sessions))
        }
    };

    Ok(App {
        router: routes::finish(config, router),
        sessions,
    })
}

/// HTTP server for one example variant.
pub struct HttpServer {
    app: App,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self, StartupError> {
        let app = build_app(&config)?;
        Ok(Self { app, config })
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            variant = %self.config.variant,
            "HTTP server starting"
        );

        if let Some(store) = self.app.sessions.clone() {
            let stop = shutdown.resubscribe();
            tokio::spawn(purge_sessions(store, stop));
        }

        axum::serve(listener, self.app.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

async fn purge_sessions(store: Arc<MemorySessionStore>, mut shutdown: broadcast::Receiver<()>) {
    let mut ticker = tokio::time::interval(PURGE_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let purged = store.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, remaining = store.len(), "Expired sessions purged");
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_login_keeps_a_session_store() {
        for variant in [
            Variant::Hello,
            Variant::Hardened,
            Variant::Fileserver,
            Variant::Router,
            Variant::Templates,
        ] {
            let config = ServerConfig { variant, ..Default::default() };
            assert!(build_app(&config).unwrap().sessions.is_none(), "{variant}");
        }

        let app = build_app(&ServerConfig::default()).unwrap();
        assert!(app.sessions.is_some());
    }

    #[test]
    fn bad_password_hash_fails_startup() {
        let mut config = ServerConfig::default();
        config.credentials.password_hash = Some("not-a-phc-string".into());
        assert!(matches!(build_app(&config), Err(StartupError::Auth(_))));
    }

    #[test]
    fn bad_csrf_header_fails_startup() {
        let mut config = ServerConfig::default();
        config.csrf.header_name = "bad header".into();
        assert!(matches!(build_app(&config), Err(StartupError::CsrfHeader(_))));
    }
}
