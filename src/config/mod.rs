//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) and/or .env / process environment
//!     → loader.rs (parse, apply env overrides)
//!     → validation.rs (semantic checks, missing hash is fatal)
//!     → GateConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps admin credentials atomically
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Reload replaces credentials only; abuse-control state survives

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{
    AdminConfig, GateConfig, ListenerConfig, ObservabilityConfig, ProxyTrustConfig,
    SecurityConfig, SiteConfig, TimeoutConfig, TlsConfig,
};
pub use validation::{validate_config, ValidationError};
