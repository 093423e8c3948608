//! Route handlers: the envelope tunnel and the liveness probe.
//!
//! # Tunnel pipeline
//! ```text
//! bounded read → parse envelope header → allowlist → rewrite → forward → relay
//! ```
//! Each stage short-circuits with a [`TunnelError`].

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::time::Instant;

use crate::build_info;
use crate::envelope::parse_project_id;
use crate::error::TunnelError;
use crate::http::request::{check_content_length, read_body, request_id};
use crate::http::response::relay;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::resolve_client_ip;
use crate::upstream::ForwardRequest;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub commit: &'static str,
    pub date: &'static str,
}

/// Liveness probe. Always succeeds.
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: build_info::VERSION,
        commit: build_info::COMMIT,
        date: build_info::DATE,
    })
}

/// Validate an envelope and forward it to the upstream.
pub async fn tunnel(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();

    match forward(&state, peer, request).await {
        Ok(response) => {
            let status = response.status();
            tracing::debug!(request_id = %request_id, status = %status, "Envelope relayed");
            metrics::record_request("forwarded", status.as_u16(), start_time);
            response
        }
        Err(err) => {
            let status = err.status();
            if status.is_server_error() {
                tracing::error!(request_id = %request_id, status = %status, error = %err, "Tunnel request failed");
            } else {
                tracing::warn!(request_id = %request_id, status = %status, error = %err, "Envelope rejected");
            }
            metrics::record_request(err.outcome(), status.as_u16(), start_time);
            err.into_response()
        }
    }
}

async fn forward(
    state: &AppState,
    peer: SocketAddr,
    request: Request<Body>,
) -> Result<Response, TunnelError> {
    let security = &state.config.security;
    let client_ip = resolve_client_ip(request.headers(), &peer.to_string(), security.trust_proxy);

    // 1. Bounded read
    check_content_length(request.headers(), security.max_body_size)?;
    let body = read_body(
        request.into_body(),
        security.max_body_size,
        state.config.timeouts.read(),
    )
    .await?;

    // 2. Parse
    let project_id = parse_project_id(&body)?;

    // 3. Authorize
    if !state.allowlist.is_allowed(&project_id) {
        return Err(TunnelError::ProjectNotAllowed(project_id));
    }

    // 4. Rewrite
    let outbound = ForwardRequest::build(
        &state.config.upstream.url,
        &project_id,
        &state.user_agent,
        &client_ip,
        body,
    )?;

    tracing::debug!(project_id = %project_id, client_ip = %client_ip, "Envelope accepted");

    // 5. Dispatch, 6. Relay
    let upstream = state.upstream.send(outbound).await?;
    Ok(relay(upstream))
}
