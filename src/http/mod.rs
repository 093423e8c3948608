//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → handlers.rs (tunnel pipeline / liveness probe)
//!     → request.rs (bounded body read)
//!     → [envelope, security, upstream subsystems]
//!     → response.rs (relay upstream status and body)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, ServerError, TunnelServer};
