//! Structured logging.
//!
//! Console output follows `RUST_LOG` (or the configured level). Audit
//! events are additionally appended as JSON lines to the audit log file,
//! whatever the console filter says.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::ObservabilityConfig;
use crate::security::audit::AUDIT_TARGET;

/// Default console directives for a configured level.
pub fn default_directives(level: &str) -> String {
    format!("static_gate={level},{AUDIT_TARGET}={level},tower_http={level}")
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), std::io::Error> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let audit_layer = match &config.audit_log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_filter(Targets::new().with_target(AUDIT_TARGET, Level::INFO)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(console_filter))
        .with(audit_layer)
        .init();

    if let Some(path) = &config.audit_log_file {
        tracing::info!(path = %path, "Audit log enabled");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_include_audit() {
        let directives = default_directives("warn");
        assert!(directives.contains("audit=warn"));
        assert!(directives.contains("static_gate=warn"));
        assert!(EnvFilter::try_new(directives).is_ok());
    }
}
