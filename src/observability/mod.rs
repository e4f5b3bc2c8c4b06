//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (console events, audit file)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout / admin_access.log
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Audit events share one tracing target so they can be routed separately
//! - Request ID from the HTTP layer is carried into audit records
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
