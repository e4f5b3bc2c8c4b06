//! Startup checks and reporting.
//!
//! # Responsibilities
//! - Refuse to start without an admin password hash
//! - Warn about hashes that do not look like bcrypt
//! - Log the effective configuration once everything is ready

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::{ConfigError, GateConfig};

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to initialize logging: {0}")]
    Logging(std::io::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load TLS material: {0}")]
    Tls(std::io::Error),

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Guidance printed when no admin password hash is configured.
pub const MISSING_HASH_HELP: &str = "ERROR: ADMIN_PW_HASH missing. \
Create a .env file with ADMIN_PW_HASH and optionally ADMIN_USER/PORT.
Generate a hash: static-gate --gen-hash \"YourStrongPassword\"";

/// Warn when the configured hash is not in bcrypt's `$2x$` form.
///
/// Returns `false` for hashes that will never verify.
pub fn check_password_hash(config: &GateConfig) -> bool {
    match config.admin.password_hash.as_deref() {
        Some(hash) if hash.starts_with("$2") => true,
        Some(_) => {
            tracing::warn!(
                "ADMIN_PW_HASH does not look like a bcrypt hash; admin logins will fail"
            );
            false
        }
        None => false,
    }
}

pub fn log_startup(config: &GateConfig, address: SocketAddr) {
    let scheme = if config.listener.tls.is_some() {
        "https"
    } else {
        "http"
    };
    tracing::info!(
        address = %address,
        static_dir = %config.site.static_dir,
        admin_user = %config.admin.username,
        honeypot = %config.site.honeypot_path,
        rate_limit = format!(
            "{}/{}s",
            config.admin.rate_max_requests, config.admin.rate_window_secs
        ),
        lockout = format!(
            "{} failures/{}s",
            config.admin.lockout_threshold, config.admin.lockout_period_secs
        ),
        "static-gate ready at {scheme}://{address} (admin at {scheme}://{address}/admin)"
    );
}
