//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Own the pooled `reqwest::Client`
//! - Enforce the outbound timeout
//! - Map transport failures to `TunnelError::UpstreamUnavailable`

use std::time::Duration;

use crate::error::TunnelError;
use crate::upstream::request::ForwardRequest;

/// Sends forwarded envelopes to the upstream. Cheap to clone.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
}

impl UpstreamClient {
    /// Create a client whose requests are bounded by `timeout`.
    ///
    /// Redirects are not followed so the upstream status is relayed as-is.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }

    /// Issue the single forwarding attempt.
    pub async fn send(&self, request: ForwardRequest) -> Result<reqwest::Response, TunnelError> {
        let ForwardRequest { url, headers, body } = request;

        tracing::debug!(url = %url, bytes = body.len(), "Forwarding envelope");

        self.client
            .post(url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(TunnelError::UpstreamUnavailable)
    }
}
