//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, peer address)
//!     → site.rs (public pages, assets, honeypot)
//!       or admin routes behind the access guard
//!     → response.rs (file bodies, error pages)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod site;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
