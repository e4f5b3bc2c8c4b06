//! Access guard for the admin area.
//!
//! # Decision order
//! ```text
//! request
//!     → rate window full?          → 429 RATE_LIMIT
//!     → identity locked out?       → 403 LOCKED_ATTEMPT
//!     → no Basic credentials?      → 401 AUTH_CHALLENGE (no failure recorded)
//!     → credentials rejected?      → 401 ADMIN_LOGIN_FAIL (failure recorded)
//!     → granted                    → ADMIN_LOGIN_SUCCESS, failures reset, handler runs
//! ```
//! Every request produces one decision record; a failure that sets a lock
//! adds a LOCKOUT record ahead of it.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::config::{AdminConfig, GateConfig};
use crate::http::request::request_id;
use crate::observability::metrics;
use crate::security::audit::{AuditEvent, AuditRecord, AuditSink, TracingAuditSink};
use crate::security::credentials::{AdminCredentials, BasicCredentials, CredentialVerifier};
use crate::security::identity::{ClientIdentifier, TrustedProxies};
use crate::security::lockout::LockoutTracker;
use crate::security::rate_limit::SlidingWindowLimiter;
use crate::security::store::ClientStore;

/// Everything the guard needs to know about one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub identity: String,
    pub credentials: Option<BasicCredentials>,
    pub path: String,
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn new(identity: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            credentials: None,
            path: path.into(),
            request_id: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Option<BasicCredentials>) -> Self {
        self.credentials = credentials;
        self
    }

    fn claimed_username(&self) -> Option<String> {
        self.credentials.as_ref().map(|c| c.username.clone())
    }
}

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    RateExceeded,
    Locked,
    NoCredentials,
    InvalidCredentials,
}

impl Denial {
    pub fn status(&self) -> StatusCode {
        match self {
            Denial::RateExceeded => StatusCode::TOO_MANY_REQUESTS,
            Denial::Locked => StatusCode::FORBIDDEN,
            Denial::NoCredentials | Denial::InvalidCredentials => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Denial::RateExceeded => "Too many requests",
            Denial::Locked => "Temporarily blocked due to repeated failed attempts.",
            Denial::NoCredentials => "Authentication required",
            Denial::InvalidCredentials => "Invalid credentials",
        }
    }

    /// Whether the response carries a `WWW-Authenticate` challenge.
    pub fn challenges(&self) -> bool {
        matches!(self, Denial::NoCredentials | Denial::InvalidCredentials)
    }

    fn audit_event(&self) -> AuditEvent {
        match self {
            Denial::RateExceeded => AuditEvent::RateLimit,
            Denial::Locked => AuditEvent::LockedAttempt,
            Denial::NoCredentials => AuditEvent::AuthChallenge,
            Denial::InvalidCredentials => AuditEvent::LoginFail,
        }
    }
}

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow { username: String },
    Deny(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }

    fn audit_event(&self) -> AuditEvent {
        match self {
            Decision::Allow { .. } => AuditEvent::LoginSuccess,
            Decision::Deny(denial) => denial.audit_event(),
        }
    }
}

/// Composes identification, rate limiting, lockout and credential checks.
pub struct AccessGuard {
    identifier: ClientIdentifier,
    store: Arc<ClientStore>,
    limiter: SlidingWindowLimiter,
    lockout: LockoutTracker,
    verifier: CredentialVerifier,
    audit: Arc<dyn AuditSink>,
    challenge: HeaderValue,
}

impl AccessGuard {
    pub fn new(
        config: &AdminConfig,
        credentials: AdminCredentials,
        identifier: ClientIdentifier,
    ) -> Self {
        let store = Arc::new(ClientStore::new());
        let challenge = HeaderValue::from_str(&format!("Basic realm=\"{}\"", config.realm))
            .unwrap_or_else(|_| HeaderValue::from_static("Basic realm=\"Admin Area\""));

        Self {
            identifier,
            limiter: SlidingWindowLimiter::from_config(store.clone(), config),
            lockout: LockoutTracker::from_config(store.clone(), config),
            store,
            verifier: CredentialVerifier::new(credentials),
            audit: Arc::new(TracingAuditSink),
            challenge,
        }
    }

    /// Build a guard from a validated configuration.
    pub fn from_config(config: &GateConfig) -> Self {
        let trusted = TrustedProxies::parse(&config.proxy.trusted_proxies).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Unusable trusted proxy list, keying clients by peer address");
            TrustedProxies::List(Vec::new())
        });

        Self::new(
            &config.admin,
            AdminCredentials::from_config(&config.admin),
            ClientIdentifier::new(trusted),
        )
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = sink;
        self
    }

    pub fn identifier(&self) -> &ClientIdentifier {
        &self.identifier
    }

    pub fn store(&self) -> &Arc<ClientStore> {
        &self.store
    }

    pub fn lockout(&self) -> &LockoutTracker {
        &self.lockout
    }

    pub fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }

    pub fn audit(&self) -> &dyn AuditSink {
        self.audit.as_ref()
    }

    /// Assemble a [`RequestContext`] from raw request data.
    pub fn context(
        &self,
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
        path: &str,
    ) -> RequestContext {
        RequestContext {
            identity: self.identifier.identify(headers, peer),
            credentials: BasicCredentials::from_headers(headers),
            path: path.to_string(),
            request_id: request_id(headers),
        }
    }

    /// Evaluate a request and emit its audit record.
    pub async fn check(&self, ctx: &RequestContext) -> Decision {
        let decision = self.evaluate(ctx).await;

        let record = AuditRecord::new(decision.audit_event(), &ctx.identity, &ctx.path)
            .with_username(ctx.claimed_username())
            .with_request_id(ctx.request_id.clone());
        self.audit.record(&record);
        metrics::record_decision(decision.audit_event().as_str());

        decision
    }

    async fn evaluate(&self, ctx: &RequestContext) -> Decision {
        if !self.limiter.allow(&ctx.identity) {
            return Decision::Deny(Denial::RateExceeded);
        }

        if self.lockout.is_locked(&ctx.identity) {
            return Decision::Deny(Denial::Locked);
        }

        let Some(credentials) = &ctx.credentials else {
            return Decision::Deny(Denial::NoCredentials);
        };

        // No store lock is held while bcrypt runs.
        let verified = self
            .verifier
            .verify(Some(&credentials.username), Some(&credentials.password))
            .await;

        if verified {
            self.lockout.reset(&ctx.identity);
            return Decision::Allow {
                username: credentials.username.clone(),
            };
        }

        if self.lockout.record_failure(&ctx.identity).is_some() {
            let record = AuditRecord::new(AuditEvent::Lockout, &ctx.identity, &ctx.path)
                .with_username(ctx.claimed_username())
                .with_request_id(ctx.request_id.clone());
            self.audit.record(&record);
            metrics::record_lockout();
            tracing::warn!(
                identity = %ctx.identity,
                lockout_secs = self.lockout.period().as_secs(),
                "Lockout set"
            );
        }

        Decision::Deny(Denial::InvalidCredentials)
    }

    /// Run `operation` only if the request is granted.
    pub async fn protect<F, Fut, T>(&self, ctx: &RequestContext, operation: F) -> Result<T, Denial>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        match self.check(ctx).await {
            Decision::Allow { .. } => Ok(operation().await),
            Decision::Deny(denial) => Err(denial),
        }
    }

    /// HTTP response for a denial.
    pub fn reject(&self, denial: Denial) -> Response {
        let mut response = (denial.status(), Body::from(denial.reason())).into_response();
        if denial.challenges() {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, self.challenge.clone());
        }
        response
    }
}
