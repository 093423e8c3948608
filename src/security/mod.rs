//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming envelope:
//!     → headers.rs (resolve client IP, honour X-Forwarded-For only behind a trusted proxy)
//!     → access_control.rs (project allowlist)
//!     → Pass to upstream forwarding
//! ```
//!
//! # Design Decisions
//! - Allowlist is compiled once at startup and never mutated
//! - Client IP is advisory; it is forwarded, never enforced
//! - No trust in client input unless explicitly configured

pub mod access_control;
pub mod headers;

pub use access_control::ProjectAllowlist;
pub use headers::resolve_client_ip;
