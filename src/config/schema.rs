//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the tunnel.
//! All types derive Serde traits so a TOML file can seed them; environment
//! variables are applied on top by the loader.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Root configuration for the tunnel.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct TunnelConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Where validated envelopes are forwarded.
    pub upstream: UpstreamConfig,

    /// Allowlist, body limits and proxy trust.
    pub security: SecurityConfig,

    /// Inbound timeouts.
    pub timeouts: TimeoutConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8100"). A bare ":8100" binds all interfaces.
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: ":8100".to_string(),
        }
    }
}

impl ListenerConfig {
    /// Bind address in a form `TcpListener::bind` accepts.
    pub fn socket_address(&self) -> String {
        if self.bind_address.starts_with(':') {
            format!("0.0.0.0{}", self.bind_address)
        } else {
            self.bind_address.clone()
        }
    }
}

/// Upstream (Sentry) configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the Sentry server, without trailing slash
    /// (e.g., "https://sentry.example.com").
    pub url: String,

    /// User-Agent sent on forwarded requests.
    pub user_agent: String,

    /// Total time allowed for one forwarded request, in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            user_agent: "sentry-tunnel/1.0".to_string(),
            timeout_secs: 10,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Security configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SecurityConfig {
    /// Projects envelopes may be forwarded to. Empty allows all.
    pub allowed_projects: Vec<String>,

    /// Maximum body size in bytes.
    pub max_body_size: usize,

    /// Trust X-Forwarded-For for the client IP.
    pub trust_proxy: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_projects: Vec::new(),
            max_body_size: 5 * 1024 * 1024, // 5MB
            trust_proxy: false,
        }
    }
}

/// Timeout configuration for the inbound side.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed to read the request body, in seconds.
    pub read_secs: u64,

    /// Time allowed for a request to produce response headers, in seconds.
    /// Must exceed `read_secs` plus the upstream timeout, so the inner
    /// deadlines always fire first.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_secs: 10,
            request_secs: 30,
        }
    }
}

impl TimeoutConfig {
    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log output format.
    pub log_format: LogFormat,

    /// Prometheus endpoint bind address. Metrics are off when unset.
    pub metrics_address: Option<SocketAddr>,
}
