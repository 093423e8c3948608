//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file (TUNNEL_CONFIG) + environment variables
//!     → loader.rs (parse & apply overrides)
//!     → validation.rs (semantic checks)
//!     → TunnelConfig (validated, immutable)
//!     → handed to TunnelServer::new, shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields except the upstream URL have defaults
//! - Validation separates syntactic (serde) from semantic checks
//! - Never read through a global; the server owns its copy

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_from_env, ConfigError};
pub use schema::{
    ListenerConfig, LogFormat, ObservabilityConfig, SecurityConfig, TimeoutConfig, TunnelConfig,
    UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
