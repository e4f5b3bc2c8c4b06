//! Admin credential verification.
//!
//! Usernames are compared in constant time and passwords are checked
//! against a bcrypt hash. Both checks always run so the response time
//! does not reveal which one failed.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::ConstantTimeEq;

use crate::config::AdminConfig;
use crate::observability::metrics;

/// Default bcrypt cost used by `--gen-hash`.
pub const DEFAULT_HASH_COST: u32 = 12;

/// Credentials supplied with an HTTP Basic `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    /// Extract Basic credentials from request headers.
    ///
    /// Malformed headers yield `None`, the same as no header at all.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        Self::parse(value)
    }

    /// Parse an `Authorization` header value of the form `Basic <base64>`.
    pub fn parse(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;

        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The configured admin identity.
#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password_hash: Option<String>,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password_hash: Option<String>) -> Self {
        Self {
            username: username.into(),
            password_hash,
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(config.username.clone(), config.password_hash.clone())
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn has_password_hash(&self) -> bool {
        self.password_hash.is_some()
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password_hash", &self.password_hash.as_ref().map(|_| "<set>"))
            .finish()
    }
}

/// Check a claimed username/password pair against the configured values.
///
/// Absent candidates are compared as empty strings. A missing configured
/// hash, or any error from bcrypt, fails verification.
pub fn verify_credentials(
    candidate_username: Option<&str>,
    candidate_password: Option<&str>,
    configured_username: &str,
    configured_password_hash: Option<&str>,
) -> bool {
    let username_ok = usernames_match(candidate_username.unwrap_or(""), configured_username);
    let password_ok = password_matches(candidate_password.unwrap_or(""), configured_password_hash);

    // Non-short-circuiting on purpose.
    username_ok & password_ok
}

fn usernames_match(candidate: &str, configured: &str) -> bool {
    candidate.as_bytes().ct_eq(configured.as_bytes()).into()
}

fn password_matches(candidate: &str, hash: Option<&str>) -> bool {
    let Some(hash) = hash else {
        return false;
    };
    match bcrypt::verify(candidate, hash) {
        Ok(matched) => matched,
        Err(e) => {
            tracing::warn!(error = %e, "Password hash check failed");
            false
        }
    }
}

/// Produce a bcrypt hash suitable for `admin.password_hash`.
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// Verifies admin logins off the async executor.
///
/// Credentials can be swapped at runtime (config reload) without blocking
/// in-flight checks.
pub struct CredentialVerifier {
    credentials: ArcSwap<AdminCredentials>,
}

impl CredentialVerifier {
    pub fn new(credentials: AdminCredentials) -> Self {
        Self {
            credentials: ArcSwap::from_pointee(credentials),
        }
    }

    /// Replace the configured credentials.
    pub fn replace(&self, credentials: AdminCredentials) {
        tracing::info!(user = %credentials.username(), "Admin credentials updated");
        self.credentials.store(Arc::new(credentials));
    }

    pub fn credentials(&self) -> Arc<AdminCredentials> {
        self.credentials.load_full()
    }

    /// Verify a candidate pair on the blocking pool.
    ///
    /// A panicked or cancelled hash task counts as a failed verification.
    pub async fn verify(&self, username: Option<&str>, password: Option<&str>) -> bool {
        let credentials = self.credentials.load_full();
        let username = username.map(str::to_owned);
        let password = password.map(str::to_owned);
        let start = Instant::now();

        let result = tokio::task::spawn_blocking(move || {
            verify_credentials(
                username.as_deref(),
                password.as_deref(),
                &credentials.username,
                credentials.password_hash.as_deref(),
            )
        })
        .await;

        metrics::record_credential_check(start);

        match result {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!(error = %e, "Credential check task failed");
                false
            }
        }
    }
}
