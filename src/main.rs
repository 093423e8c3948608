//! Sentry tunnel
//!
//! Relays Sentry envelopes from browsers to a Sentry server while hiding the
//! server's address and restricting which projects may receive events.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser SDK                          sentry-tunnel                              Sentry
//!   ───────────  POST /tunnel  ──▶  read ─▶ parse ─▶ allowlist ─▶ rewrite ─▶  POST /api/<id>/envelope/
//!              ◀── status+body ───────────────── relay ◀───────────────────────  response
//! ```

use tokio::net::TcpListener;

use sentry_tunnel::build_info;
use sentry_tunnel::config::{self, loader::parse_log_format, loader::LOG_FORMAT};
use sentry_tunnel::observability::{logging, metrics};
use sentry_tunnel::{Shutdown, TunnelServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging comes up before configuration so config errors are visible.
    let log_format = std::env::var(LOG_FORMAT)
        .ok()
        .and_then(|v| parse_log_format(&v).ok())
        .unwrap_or_default();
    logging::init(log_format);

    tracing::info!(
        version = build_info::VERSION,
        commit = build_info::COMMIT,
        date = build_info::DATE,
        "sentry-tunnel starting"
    );

    let config = match config::load_from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    tracing::info!(
        listen_addr = %config.listener.bind_address,
        sentry_upstream_url = %config.upstream.url,
        allowed_projects = config.security.allowed_projects.len(),
        max_body_size = config.security.max_body_size,
        trust_proxy = config.security.trust_proxy,
        user_agent = %config.upstream.user_agent,
        upstream_timeout_secs = config.upstream.timeout_secs,
        read_timeout_secs = config.timeouts.read_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if let Some(addr) = config.observability.metrics_address {
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(metrics_address = %addr, error = %e, "Failed to start metrics exporter");
        }
    }

    let bind_address = config.listener.socket_address();
    let server = match TunnelServer::new(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize server");
            std::process::exit(1);
        }
    };

    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %bind_address, error = %e, "Failed to bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let _signal_task = shutdown.trigger_on_signal();

    if let Err(e) = server.run(listener, shutdown.subscribe()).await {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
