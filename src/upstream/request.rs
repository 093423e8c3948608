//! Outbound request construction.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue};
use url::Url;

use crate::error::TunnelError;
use crate::security::headers::{X_FORWARDED_FOR, X_REAL_IP};

pub const SENTRY_ENVELOPE_CONTENT_TYPE: &str = "application/x-sentry-envelope";

/// A request ready to be sent to the upstream. Lives for one inbound request.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ForwardRequest {
    /// Build the outbound request for `project_id`.
    ///
    /// `upstream` is the base URL without trailing slash. The body is
    /// forwarded untouched.
    pub fn build(
        upstream: &str,
        project_id: &str,
        user_agent: &HeaderValue,
        client_ip: &str,
        body: Bytes,
    ) -> Result<Self, TunnelError> {
        if !is_safe_project_id(project_id) {
            return Err(TunnelError::InvalidProjectId(project_id.to_string()));
        }

        let url = envelope_url(upstream, project_id)?;

        let client_ip = HeaderValue::from_str(client_ip)
            .map_err(|e| TunnelError::UpstreamRequest(format!("client ip header: {e}")))?;

        let mut headers = HeaderMap::with_capacity(4);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(SENTRY_ENVELOPE_CONTENT_TYPE),
        );
        headers.insert(header::USER_AGENT, user_agent.clone());
        headers.insert(X_FORWARDED_FOR, client_ip.clone());
        headers.insert(X_REAL_IP, client_ip);

        Ok(Self { url, headers, body })
    }
}

/// `<upstream>/api/<project_id>/envelope/`
pub fn envelope_url(upstream: &str, project_id: &str) -> Result<Url, TunnelError> {
    let raw = format!("{upstream}/api/{project_id}/envelope/");
    Url::parse(&raw).map_err(|e| TunnelError::UpstreamRequest(format!("{raw}: {e}")))
}

/// Project ids are spliced into the upstream path, so only a conservative
/// character set is accepted.
pub fn is_safe_project_id(project_id: &str) -> bool {
    !project_id.is_empty()
        && project_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
