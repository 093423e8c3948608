//! Per-request failure taxonomy.
//!
//! Every stage of the tunnel pipeline fails with a [`TunnelError`]; the
//! handler logs it and turns it into a short plaintext response. Internal
//! detail stays in the logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::envelope::EnvelopeError;

#[derive(Debug, Error)]
pub enum TunnelError {
    /// The request body could not be read (I/O error, client abort, timeout).
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// The request body exceeds the configured limit.
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// The envelope header could not be routed.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    /// The project is not on the allowlist.
    #[error("project {0} is not allowed")]
    ProjectNotAllowed(String),

    /// The project id contains characters unsafe for a URL path.
    #[error("project id {0:?} contains unsupported characters")]
    InvalidProjectId(String),

    /// The outbound request could not be built. Indicates a defect.
    #[error("failed to build upstream request: {0}")]
    UpstreamRequest(String),

    /// Transport failure talking to the upstream.
    #[error("upstream request failed: {0}")]
    UpstreamUnavailable(#[source] reqwest::Error),
}

impl TunnelError {
    pub fn status(&self) -> StatusCode {
        match self {
            TunnelError::BodyRead(_)
            | TunnelError::Envelope(_)
            | TunnelError::InvalidProjectId(_) => StatusCode::BAD_REQUEST,
            TunnelError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            TunnelError::ProjectNotAllowed(_) => StatusCode::FORBIDDEN,
            TunnelError::UpstreamRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TunnelError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Body text sent to the client.
    pub fn client_message(&self) -> String {
        match self {
            TunnelError::BodyRead(_) => "bad request".to_string(),
            TunnelError::PayloadTooLarge { .. } => "payload too large".to_string(),
            TunnelError::Envelope(e) => e.to_string(),
            TunnelError::ProjectNotAllowed(_) => "project not allowed".to_string(),
            TunnelError::InvalidProjectId(_) => "invalid project id".to_string(),
            TunnelError::UpstreamRequest(_) => "internal error".to_string(),
            TunnelError::UpstreamUnavailable(_) => "upstream error".to_string(),
        }
    }

    /// Stable label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            TunnelError::BodyRead(_) => "body_read_error",
            TunnelError::PayloadTooLarge { .. } => "payload_too_large",
            TunnelError::Envelope(_) => "invalid_envelope",
            TunnelError::ProjectNotAllowed(_) => "project_not_allowed",
            TunnelError::InvalidProjectId(_) => "invalid_project_id",
            TunnelError::UpstreamRequest(_) => "internal_error",
            TunnelError::UpstreamUnavailable(_) => "upstream_error",
        }
    }
}

impl IntoResponse for TunnelError {
    fn into_response(self) -> Response {
        (self.status(), self.client_message()).into_response()
    }
}
