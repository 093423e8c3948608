//! Inbound request helpers.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for tracing
//! - Read the request body up to the configured size, under a deadline
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Declared Content-Length is checked before any body byte is read
//! - Oversized bodies are rejected, never silently truncated

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Request};
use futures_util::StreamExt;
use std::time::Duration;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::error::TunnelError;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a v4 UUID for every request lacking an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// The request ID set by the request-id layer, or "unknown".
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Reject early if the client declares a body larger than `limit`.
pub fn check_content_length(headers: &HeaderMap, limit: usize) -> Result<(), TunnelError> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    match declared {
        Some(len) if len > limit as u64 => Err(TunnelError::PayloadTooLarge { limit }),
        _ => Ok(()),
    }
}

/// Read the whole body, failing if it exceeds `limit` bytes or takes longer
/// than `timeout`.
pub async fn read_body(body: Body, limit: usize, timeout: Duration) -> Result<Bytes, TunnelError> {
    match tokio::time::timeout(timeout, collect_limited(body, limit)).await {
        Ok(result) => result,
        Err(_) => Err(TunnelError::BodyRead(format!(
            "timed out after {}s",
            timeout.as_secs()
        ))),
    }
}

async fn collect_limited(body: Body, limit: usize) -> Result<Bytes, TunnelError> {
    let mut stream = body.into_data_stream();
    let mut buf: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| TunnelError::BodyRead(e.to_string()))?;
        if buf.len() + chunk.len() > limit {
            return Err(TunnelError::PayloadTooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(buf))
}
