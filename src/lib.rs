//! Sentry tunnel library.
//!
//! A validating forwarding proxy for Sentry envelopes: clients post to
//! `/tunnel`, the project id is read from the envelope header, checked
//! against an allowlist, and the untouched envelope is forwarded to the
//! configured upstream.

pub mod build_info;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod upstream;

pub use config::TunnelConfig;
pub use error::TunnelError;
pub use http::TunnelServer;
pub use lifecycle::Shutdown;
