//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the tunnel and health handlers
//! - Wire up middleware (request ID, tracing, request timeout)
//! - Build the shared, read-only application state
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::validation::describe;
use crate::config::{validate_config, TunnelConfig, ValidationError};
use crate::http::handlers::{health, tunnel};
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::security::ProjectAllowlist;
use crate::upstream::UpstreamClient;

/// Errors raised while constructing or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {}", describe(.0))]
    Config(Vec<ValidationError>),
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers. Read-only after construction.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<TunnelConfig>,
    pub allowlist: Arc<ProjectAllowlist>,
    pub upstream: UpstreamClient,
    pub user_agent: HeaderValue,
}

/// HTTP server for the tunnel.
pub struct TunnelServer {
    router: Router,
}

impl TunnelServer {
    /// Create a new server from a configuration.
    pub fn new(config: TunnelConfig) -> Result<Self, ServerError> {
        validate_config(&config).map_err(ServerError::Config)?;

        let user_agent = HeaderValue::from_str(&config.upstream.user_agent).map_err(|_| {
            ServerError::Config(vec![ValidationError::InvalidUserAgent(
                config.upstream.user_agent.clone(),
            )])
        })?;

        let config = Arc::new(config);
        let state = AppState {
            allowlist: Arc::new(ProjectAllowlist::new(&config.security.allowed_projects)),
            upstream: UpstreamClient::new(config.upstream.timeout())?,
            user_agent,
            config: config.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &TunnelConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/tunnel", post(tunnel))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |request: &Request<Body>| {
                            tracing::info_span!(
                                "request",
                                method = %request.method(),
                                path = %request.uri().path(),
                                request_id = %request_id(request.headers()),
                            )
                        },
                    ))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(config.timeouts.request())),
            )
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
