//! Network layer subsystem.
//!
//! Plain TCP listeners are bound in `main`; this module only prepares the
//! optional TLS configuration handed to the HTTPS server.

pub mod tls;

pub use tls::load_tls_config;
