//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Upstream must be an absolute http(s) URL
//! - Validate value ranges (timeouts > 0, body limit > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TunnelConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::TunnelConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream url is required (set SENTRY_UPSTREAM)")]
    MissingUpstream,
    #[error("upstream url {url:?} is invalid: {reason}")]
    InvalidUpstream { url: String, reason: String },
    #[error("bind address {0:?} is not a valid host:port")]
    InvalidBindAddress(String),
    #[error("user agent {0:?} is not a valid header value")]
    InvalidUserAgent(String),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error(
        "timeouts.request_secs ({request_secs}) must exceed timeouts.read_secs + \
         upstream.timeout_secs ({inner_secs})"
    )]
    RequestTimeoutTooShort { request_secs: u64, inner_secs: u64 },
}

/// Render a list of validation errors on one line.
pub fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &TunnelConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_upstream_url(&config.upstream.url) {
        errors.push(e);
    }

    let bind = config.listener.socket_address();
    let has_port = bind
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
    if !has_port {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if HeaderValue::from_str(&config.upstream.user_agent).is_err() {
        errors.push(ValidationError::InvalidUserAgent(
            config.upstream.user_agent.clone(),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("max_body_size"));
    }
    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::Zero("upstream.timeout_secs"));
    }
    if config.timeouts.read_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.read_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }

    // A slow body or a slow upstream must surface as 400/502 from the
    // handler, not as the request layer's 408.
    let inner_secs = config
        .timeouts
        .read_secs
        .saturating_add(config.upstream.timeout_secs);
    if config.timeouts.request_secs <= inner_secs {
        errors.push(ValidationError::RequestTimeoutTooShort {
            request_secs: config.timeouts.request_secs,
            inner_secs,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_upstream_url(raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::MissingUpstream);
    }
    let invalid = |reason: &str| ValidationError::InvalidUpstream {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed"));
    }
    Ok(())
}
