//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Request for the admin area:
//!     → identity.rs (peer address, or X-Forwarded-For from a trusted proxy)
//!     → rate_limit.rs (sliding window per identity)
//!     → lockout.rs (recent failures per identity)
//!     → credentials.rs (constant-time username, bcrypt password)
//!     → guard.rs (decision + audit.rs record)
//!
//! store.rs holds the per-identity state the limiter and lockout share.
//! ```
//!
//! # Design Decisions
//! - Fail closed: hash errors and misconfiguration deny
//! - State is in-memory and lives for the life of the process
//! - bcrypt runs on the blocking pool, never under a store lock

pub mod audit;
pub mod credentials;
pub mod guard;
pub mod headers;
pub mod identity;
pub mod lockout;
pub mod rate_limit;
pub mod store;

pub use audit::{AuditEvent, AuditRecord, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use credentials::{AdminCredentials, BasicCredentials, CredentialVerifier};
pub use guard::{AccessGuard, Decision, Denial, RequestContext};
pub use identity::{ClientIdentifier, TrustedProxies};
pub use lockout::LockoutTracker;
pub use rate_limit::SlidingWindowLimiter;
pub use store::{ClientRecord, ClientStore};
