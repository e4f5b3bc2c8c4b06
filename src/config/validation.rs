//! Configuration validation.
//!
//! Serde handles syntax; this module checks the values make sense together.
//! Every problem is reported, not just the first one.

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use crate::config::schema::GateConfig;

/// Upper bound for windows, periods and timeouts (one year).
pub const MAX_PERIOD_SECS: u64 = 365 * 24 * 60 * 60;

/// Upper bound for request and failure counts kept per client.
pub const MAX_ATTEMPTS: usize = 10_000;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("admin password hash is missing; generate one with `static-gate --gen-hash <PASSWORD>` and set ADMIN_PW_HASH")]
    MissingPasswordHash,

    #[error("admin.username must not be empty")]
    EmptyUsername,

    #[error("admin.realm {0:?} cannot be used in a WWW-Authenticate header")]
    InvalidRealm(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: u64 },

    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("proxy.trusted_proxies entry {0:?} is neither an IP address nor \"*\"")]
    InvalidTrustedProxy(String),

    #[error("site.honeypot_path {0:?} must start with '/' and not shadow another route")]
    InvalidHoneypotPath(String),
}

/// Check a parsed configuration before it is accepted into the system.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let admin = &config.admin;

    if admin.password_hash.as_deref().map_or(true, |h| h.trim().is_empty()) {
        errors.push(ValidationError::MissingPasswordHash);
    }
    if admin.username.is_empty() {
        errors.push(ValidationError::EmptyUsername);
    }
    if admin.realm.chars().any(|c| c == '"' || c == '\\' || c.is_control()) {
        errors.push(ValidationError::InvalidRealm(admin.realm.clone()));
    }

    let bounded = [
        ("admin.rate_window_secs", admin.rate_window_secs, MAX_PERIOD_SECS),
        ("admin.rate_max_requests", admin.rate_max_requests as u64, MAX_ATTEMPTS as u64),
        ("admin.lockout_threshold", admin.lockout_threshold as u64, MAX_ATTEMPTS as u64),
        ("admin.lockout_period_secs", admin.lockout_period_secs, MAX_PERIOD_SECS),
        ("timeouts.request_secs", config.timeouts.request_secs, MAX_PERIOD_SECS),
    ];
    for (field, value, max) in bounded {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        } else if value > max {
            errors.push(ValidationError::TooLarge { field, max });
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    for entry in &config.proxy.trusted_proxies {
        let entry = entry.trim();
        if entry != "*" && entry.parse::<IpAddr>().is_err() {
            errors.push(ValidationError::InvalidTrustedProxy(entry.to_string()));
        }
    }

    let honeypot = config.site.honeypot_path.as_str();
    let collides = matches!(honeypot, "/" | "/admin" | "/favicon.ico")
        || honeypot.starts_with("/static/")
        || honeypot.starts_with("/assets/")
        || honeypot.contains(['{', '}']);
    if !honeypot.starts_with('/') || collides {
        errors.push(ValidationError::InvalidHoneypotPath(
            config.site.honeypot_path.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> GateConfig {
        let mut config = GateConfig::default();
        config.admin.password_hash = Some("$2b$04$abcdefghijklmnopqrstuv".to_string());
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_hash_is_rejected() {
        let mut config = valid_config();
        config.admin.password_hash = None;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingPasswordHash]);

        config.admin.password_hash = Some("   ".to_string());
        assert!(validate_config(&config)
            .unwrap_err()
            .contains(&ValidationError::MissingPasswordHash));
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = valid_config();
        config.admin.lockout_threshold = 0;
        config.admin.rate_max_requests = 0;
        config.proxy.trusted_proxies = vec!["10.0.0.1".into(), "proxy.local".into()];
        config.listener.bind_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Zero("admin.lockout_threshold")));
        assert!(errors.contains(&ValidationError::Zero("admin.rate_max_requests")));
        assert!(errors.contains(&ValidationError::InvalidTrustedProxy("proxy.local".into())));
        assert!(errors.contains(&ValidationError::InvalidBindAddress("nowhere".into())));
    }

    #[test]
    fn test_realm_with_quote_rejected() {
        let mut config = valid_config();
        config.admin.realm = "Admin \"Area\"".into();
        assert!(matches!(
            validate_config(&config).unwrap_err()[0],
            ValidationError::InvalidRealm(_)
        ));
    }

    #[test]
    fn test_honeypot_must_not_shadow_routes() {
        for path in ["admin", "/admin", "/static/x", "/assets/x", "/{trap}"] {
            let mut config = valid_config();
            config.site.honeypot_path = path.into();
            assert_eq!(
                validate_config(&config).unwrap_err(),
                vec![ValidationError::InvalidHoneypotPath(path.into())]
            );
        }
    }

    #[test]
    fn test_oversized_limits_rejected() {
        let mut config = valid_config();
        config.admin.lockout_period_secs = u64::MAX;
        config.admin.rate_max_requests = usize::MAX;
        config.admin.lockout_threshold = MAX_ATTEMPTS;
        config.admin.rate_window_secs = MAX_PERIOD_SECS;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::TooLarge {
                    field: "admin.rate_max_requests",
                    max: MAX_ATTEMPTS as u64,
                },
                ValidationError::TooLarge {
                    field: "admin.lockout_period_secs",
                    max: MAX_PERIOD_SECS,
                },
            ]
        );
    }
}
