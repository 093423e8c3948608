//! Envelope inspection subsystem.
//!
//! # Data Flow
//! ```text
//! raw request body
//!     → parser.rs (split header line, decode JSON, read DSN)
//!     → project id (routing key)
//! ```
//!
//! # Design Decisions
//! - Only the first line is decoded; the rest of the envelope is opaque
//! - The body is never modified, only borrowed
//! - Pure functions, no I/O

pub mod parser;

pub use parser::{parse_project_id, EnvelopeError, EnvelopeHeader};
