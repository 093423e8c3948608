//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! validated project id + raw body + client IP
//!     → request.rs (rewrite URL, fixed outbound headers)
//!     → client.rs (single POST, bounded by timeout)
//!     → upstream response handed back for relay
//! ```
//!
//! # Design Decisions
//! - Exactly one attempt per inbound request; no retries
//! - Inbound headers are never copied; only a fixed set is sent
//! - The outbound future lives inside the handler future, so a client
//!   disconnect drops it

pub mod client;
pub mod request;

pub use client::UpstreamClient;
pub use request::{ForwardRequest, SENTRY_ENVELOPE_CONTENT_TYPE};
