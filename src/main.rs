//! Secure handler examples.
//!
//! ```text
//!   Client ──▶ listener ──▶ request id + trace ──▶ security headers ──▶ timeout
//!                                                                         │
//!          ┌──────────────────────────────────────────────────────────────┘
//!          ▼
//!   variant routes:  /static/*  → static files
//!                    /login     → CSRF → credential check → session gate
//!                    /secret    → CSRF → session gate → page | 302 /login
//!                    /*         → greeting (plain or templated)
//! ```

use std::path::PathBuf;

use clap::Parser;

use secure_handlers::config::loader::{apply_env_overrides, finalize, load_config};
use secure_handlers::config::{ServerConfig, Variant};
use secure_handlers::lifecycle::startup;
use secure_handlers::observability::logging;

#[derive(Parser)]
#[command(name = "secure-handlers")]
#[command(about = "Progressively hardened example web servers", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Example server to run (overrides the config file).
    #[arg(short, long, value_enum)]
    variant: Option<Variant>,

    /// Bind address (overrides the config file).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    apply_env_overrides(&mut config);
    if let Some(variant) = cli.variant {
        config.variant = variant;
    }
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    let config = finalize(config)?;

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "secure-handlers starting");

    startup::run(config).await
}
