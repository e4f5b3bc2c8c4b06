//! Structured audit trail for admin-area decisions.

use std::fmt;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Tracing target carried by every audit event.
pub const AUDIT_TARGET: &str = "audit";

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditEvent {
    RateLimit,
    LockedAttempt,
    AuthChallenge,
    LoginFail,
    LoginSuccess,
    Lockout,
    HoneypotHit,
}

impl AuditEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEvent::RateLimit => "RATE_LIMIT",
            AuditEvent::LockedAttempt => "LOCKED_ATTEMPT",
            AuditEvent::AuthChallenge => "AUTH_CHALLENGE",
            AuditEvent::LoginFail => "ADMIN_LOGIN_FAIL",
            AuditEvent::LoginSuccess => "ADMIN_LOGIN_SUCCESS",
            AuditEvent::Lockout => "LOCKOUT",
            AuditEvent::HoneypotHit => "HONEYPOT_HIT",
        }
    }

    /// Events worth a warning rather than an info line.
    pub fn is_suspicious(&self) -> bool {
        !matches!(self, AuditEvent::LoginSuccess | AuditEvent::AuthChallenge)
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit line.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub event: AuditEvent,
    pub identity: String,
    pub username: Option<String>,
    pub path: String,
    pub timestamp: SystemTime,
    pub request_id: Option<String>,
    pub user_agent: Option<String>,
}

impl AuditRecord {
    pub fn new(event: AuditEvent, identity: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            event,
            identity: identity.into(),
            username: None,
            path: path.into(),
            timestamp: SystemTime::now(),
            request_id: None,
            user_agent: None,
        }
    }

    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Milliseconds since the Unix epoch.
    pub fn unix_millis(&self) -> u64 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// Destination for audit records.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AuditRecord);
}

/// Writes audit records as `tracing` events under [`AUDIT_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, r: &AuditRecord) {
        let user = r.username.as_deref().unwrap_or("-");
        let request_id = r.request_id.as_deref().unwrap_or("-");
        let timestamp = r.unix_millis();

        if r.event.is_suspicious() {
            tracing::warn!(
                target: "audit",
                event = r.event.as_str(),
                identity = %r.identity,
                user = %user,
                path = %r.path,
                timestamp,
                request_id = %request_id,
                user_agent = r.user_agent.as_deref(),
                "{}", r.event
            );
        } else {
            tracing::info!(
                target: "audit",
                event = r.event.as_str(),
                identity = %r.identity,
                user = %user,
                path = %r.path,
                timestamp,
                request_id = %request_id,
                "{}", r.event
            );
        }
    }
}

/// Keeps records in memory, for tests and for embedders that ship the
/// trail somewhere else.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.records().iter().map(|r| r.event).collect()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: &AuditRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}
