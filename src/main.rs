//! static-gate
//!
//! Serves a static site and protects its admin page with HTTP Basic
//! authentication, per-client rate limiting and failed-login lockout.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (request ID, trace, timeout, body limit, headers)
//!                         │
//!                         ├── public routes ──▶ http::site ──▶ static files
//!                         │
//!                         ├── honeypot ──────▶ audit + 403
//!                         │
//!                         └── /admin ──▶ admin::auth ──▶ security::guard
//!                                                          │
//!                                     identity → rate limit → lockout → credentials
//!                                                          │
//!                                             audit log + metrics + decision
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use static_gate::config::watcher::ConfigWatcher;
use static_gate::config::{load_config, load_from_env, ConfigError, GateConfig};
use static_gate::http::HttpServer;
use static_gate::lifecycle::{
    check_password_hash, log_startup, spawn_signal_handler, Shutdown, StartupError,
    MISSING_HASH_HELP,
};
use static_gate::net::load_tls_config;
use static_gate::observability::{logging, metrics};
use static_gate::security::credentials::{hash_password, DEFAULT_HASH_COST};

#[derive(Parser)]
#[command(name = "static-gate", version)]
#[command(about = "Static site server with a rate-limited, lockout-protected admin area", long_about = None)]
struct Cli {
    /// TOML configuration file. Without it, defaults plus environment are used.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Generate a bcrypt hash for PASSWORD and print it.
    #[arg(long, value_name = "PASSWORD")]
    gen_hash: Option<String>,

    /// bcrypt cost factor for --gen-hash.
    #[arg(long, default_value_t = DEFAULT_HASH_COST, value_parser = clap::value_parser!(u32).range(4..=31))]
    rounds: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    if let Some(password) = cli.gen_hash {
        let hash = hash_password(&password, cli.rounds)?;
        println!("BCRYPT HASH (copy this into .env as ADMIN_PW_HASH):");
        println!("{hash}");
        return Ok(());
    }

    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if e.is_missing_password_hash() => {
            eprintln!("{MISSING_HASH_HELP}");
            std::process::exit(1);
        }
        Err(e) => return Err(StartupError::from(e).into()),
    };

    logging::init_logging(&config.observability).map_err(StartupError::Logging)?;
    tracing::info!("static-gate v{} starting", env!("CARGO_PKG_VERSION"));
    check_password_hash(&config);

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Arc::new(Shutdown::new());
    spawn_signal_handler(shutdown.clone());

    // The watcher stops when dropped, so it lives until main returns.
    let (config_updates, _watcher) = match cli.config.as_deref() {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(handle) => (rx, Some(handle)),
                Err(e) => {
                    tracing::warn!(error = %e, "Config hot reload disabled");
                    (rx, None)
                }
            }
        }
        None => (mpsc::unbounded_channel().1, None),
    };

    let server = HttpServer::new(config.clone());
    let bind_address = config.listener.bind_address.clone();

    match &config.listener.tls {
        Some(tls) => {
            let addr: SocketAddr = bind_address.parse().map_err(|e| StartupError::Bind {
                address: bind_address.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            })?;
            let tls_config = load_tls_config(tls).await.map_err(StartupError::Tls)?;
            log_startup(&config, addr);
            server
                .run_tls(addr, tls_config, config_updates, shutdown.subscribe())
                .await
                .map_err(StartupError::Serve)?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address)
                .await
                .map_err(|source| StartupError::Bind {
                    address: bind_address.clone(),
                    source,
                })?;
            log_startup(&config, listener.local_addr()?);
            server
                .run(listener, config_updates, shutdown.subscribe())
                .await
                .map_err(StartupError::Serve)?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn load(path: Option<&std::path::Path>) -> Result<GateConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => load_from_env(),
    }
}
