//! Upstream response relay.
//!
//! # Responsibilities
//! - Copy the upstream status code verbatim
//! - Stream the upstream body without buffering
//!
//! # Design Decisions
//! - Only Content-Type is carried over from upstream headers
//! - A failure mid-stream aborts the client connection; the status line
//!   has already been sent, so it cannot be changed

use axum::body::Body;
use axum::http::header;
use axum::response::Response;

/// Turn an upstream response into the response sent to the client.
pub fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    response
}
