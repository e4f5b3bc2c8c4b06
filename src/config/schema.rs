//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the static site server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Static site layout.
    pub site: SiteConfig,

    /// Admin area credentials and abuse controls.
    pub admin: AdminConfig,

    /// Reverse proxy trust settings for client identification.
    pub proxy: ProxyTrustConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Security hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Where the site lives on disk and which decoy path to expose.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory holding index.html, admin.html, error pages and assets.
    pub static_dir: String,

    /// Decoy path that is always denied and always audited.
    pub honeypot_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            static_dir: "static".to_string(),
            honeypot_path: "/secret-honeypot".to_string(),
        }
    }
}

/// Admin area configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Expected Basic Auth username.
    pub username: String,

    /// bcrypt hash of the admin password. Required to serve.
    pub password_hash: Option<String>,

    /// Realm advertised in the `WWW-Authenticate` challenge.
    pub realm: String,

    /// Sliding rate window length in seconds.
    pub rate_window_secs: u64,

    /// Requests admitted per identity within one rate window.
    pub rate_max_requests: usize,

    /// Recent failures that trigger a lockout.
    pub lockout_threshold: usize,

    /// Lockout length, and the trailing period failures are counted over.
    pub lockout_period_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password_hash: None,
            realm: "Admin Area".to_string(),
            rate_window_secs: 60,
            rate_max_requests: 15,
            lockout_threshold: 5,
            lockout_period_secs: 300,
        }
    }
}

/// Which peers may vouch for the client address via `X-Forwarded-For`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyTrustConfig {
    /// Peer IPs whose forwarded-for header is honored. `"*"` trusts every peer.
    pub trusted_proxies: Vec<String>,
}

impl Default for ProxyTrustConfig {
    fn default() -> Self {
        Self {
            trusted_proxies: vec!["127.0.0.1".to_string(), "::1".to_string()],
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 64 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// File receiving one JSON line per audit event.
    pub audit_log_file: Option<String>,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            audit_log_file: Some("admin_access.log".to_string()),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_defaults() {
        let admin = AdminConfig::default();
        assert_eq!(admin.username, "admin");
        assert!(admin.password_hash.is_none());
        assert_eq!(admin.rate_window_secs, 60);
        assert_eq!(admin.rate_max_requests, 15);
        assert_eq!(admin.lockout_threshold, 5);
        assert_eq!(admin.lockout_period_secs, 300);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: GateConfig = toml::from_str(
            r#"
            [admin]
            password_hash = "$2b$04$abc"
            lockout_threshold = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.admin.lockout_threshold, 3);
        assert_eq!(config.admin.lockout_period_secs, 300);
        assert_eq!(config.site.honeypot_path, "/secret-honeypot");
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
    }
}
