//! Configuration loading from a TOML file and the environment.
//!
//! Precedence, lowest first: built-in defaults, the TOML file named by
//! `TUNNEL_CONFIG` (if any), then individual environment variables.
//! Empty variables count as unset.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::config::schema::{LogFormat, TunnelConfig};
use crate::config::validation::{describe, validate_config, ValidationError};

pub const CONFIG_FILE: &str = "TUNNEL_CONFIG";
pub const LISTEN_ADDR: &str = "LISTEN_ADDR";
pub const SENTRY_UPSTREAM: &str = "SENTRY_UPSTREAM";
pub const ALLOWED_PROJECTS: &str = "ALLOWED_PROJECTS";
pub const MAX_BODY_SIZE: &str = "MAX_BODY_SIZE";
pub const TRUST_PROXY: &str = "TRUST_PROXY";
pub const USER_AGENT: &str = "USER_AGENT";
pub const UPSTREAM_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";
pub const READ_TIMEOUT_SECS: &str = "READ_TIMEOUT_SECS";
pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
pub const LOG_FORMAT: &str = "LOG_FORMAT";
pub const METRICS_ADDR: &str = "METRICS_ADDR";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("Validation failed: {}", describe(.0))]
    Validation(Vec<ValidationError>),
}

/// Load and validate configuration from the process environment.
pub fn load_from_env() -> Result<TunnelConfig, ConfigError> {
    load_with(|key| std::env::var(key).ok())
}

/// Load configuration using `lookup` to resolve variables.
pub fn load_with<F>(lookup: F) -> Result<TunnelConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let mut config = match get(CONFIG_FILE) {
        Some(path) => read_file(Path::new(&path))?,
        None => TunnelConfig::default(),
    };

    if let Some(v) = get(LISTEN_ADDR) {
        config.listener.bind_address = v;
    }
    if let Some(v) = get(SENTRY_UPSTREAM) {
        config.upstream.url = v;
    }
    if let Some(v) = get(ALLOWED_PROJECTS) {
        config.security.allowed_projects = v.split(',').map(str::to_string).collect();
    }
    if let Some(v) = get(MAX_BODY_SIZE) {
        config.security.max_body_size = parse_value(MAX_BODY_SIZE, &v)?;
    }
    if let Some(v) = get(TRUST_PROXY) {
        config.security.trust_proxy = parse_bool(TRUST_PROXY, &v)?;
    }
    if let Some(v) = get(USER_AGENT) {
        config.upstream.user_agent = v;
    }
    if let Some(v) = get(UPSTREAM_TIMEOUT_SECS) {
        config.upstream.timeout_secs = parse_value(UPSTREAM_TIMEOUT_SECS, &v)?;
    }
    if let Some(v) = get(READ_TIMEOUT_SECS) {
        config.timeouts.read_secs = parse_value(READ_TIMEOUT_SECS, &v)?;
    }
    if let Some(v) = get(REQUEST_TIMEOUT_SECS) {
        config.timeouts.request_secs = parse_value(REQUEST_TIMEOUT_SECS, &v)?;
    }
    if let Some(v) = get(LOG_FORMAT) {
        config.observability.log_format = parse_log_format(&v)?;
    }
    if let Some(v) = get(METRICS_ADDR) {
        config.observability.metrics_address = Some(parse_value(METRICS_ADDR, &v)?);
    }

    normalize(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<TunnelConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Strip the upstream's trailing slashes and tidy the project list, whichever
/// source they came from.
fn normalize(config: &mut TunnelConfig) {
    let trimmed = config.upstream.url.trim().trim_end_matches('/');
    config.upstream.url = trimmed.to_string();

    let projects = std::mem::take(&mut config.security.allowed_projects);
    config.security.allowed_projects = projects
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

pub fn parse_log_format(raw: &str) -> Result<LogFormat, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "text" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        _ => Err(ConfigError::InvalidValue {
            key: LOG_FORMAT,
            value: raw.to_string(),
            reason: "expected pretty or json".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<TunnelConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        load_with(|key| vars.get(key).cloned())
    }

    #[test]
    fn minimal_environment() {
        let config = load(&[(SENTRY_UPSTREAM, "https://sentry.example.com")]).unwrap();
        assert_eq!(config.upstream.url, "https://sentry.example.com");
        assert_eq!(config.listener.bind_address, ":8100");
        assert!(config.security.allowed_projects.is_empty());
        assert!(!config.security.trust_proxy);
    }

    #[test]
    fn missing_upstream_is_fatal() {
        let err = load(&[(LISTEN_ADDR, ":9000")]).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::MissingUpstream])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_upstream_counts_as_missing() {
        let err = load(&[(SENTRY_UPSTREAM, "")]).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        let config = load(&[(SENTRY_UPSTREAM, "https://sentry.example.com//")]).unwrap();
        assert_eq!(config.upstream.url, "https://sentry.example.com");
    }

    #[test]
    fn every_variable_is_applied() {
        let config = load(&[
            (SENTRY_UPSTREAM, "http://127.0.0.1:9000"),
            (LISTEN_ADDR, "127.0.0.1:8200"),
            (ALLOWED_PROJECTS, "1, 2,,3"),
            (MAX_BODY_SIZE, "1024"),
            (TRUST_PROXY, "true"),
            (USER_AGENT, "my-tunnel/2.0"),
            (UPSTREAM_TIMEOUT_SECS, "3"),
            (READ_TIMEOUT_SECS, "4"),
            (REQUEST_TIMEOUT_SECS, "8"),
            (LOG_FORMAT, "json"),
            (METRICS_ADDR, "127.0.0.1:9090"),
        ])
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:8200");
        assert_eq!(config.security.allowed_projects, vec!["1", "2", "3"]);
        assert_eq!(config.security.max_body_size, 1024);
        assert!(config.security.trust_proxy);
        assert_eq!(config.upstream.user_agent, "my-tunnel/2.0");
        assert_eq!(config.upstream.timeout_secs, 3);
        assert_eq!(config.timeouts.read_secs, 4);
        assert_eq!(config.timeouts.request_secs, 8);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(
            config.observability.metrics_address,
            Some("127.0.0.1:9090".parse().unwrap())
        );
    }

    #[test]
    fn trust_proxy_only_enabled_explicitly() {
        let config = load(&[
            (SENTRY_UPSTREAM, "https://s.example.com"),
            (TRUST_PROXY, "false"),
        ])
        .unwrap();
        assert!(!config.security.trust_proxy);

        let err = load(&[
            (SENTRY_UPSTREAM, "https://s.example.com"),
            (TRUST_PROXY, "maybe"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: TRUST_PROXY, .. }));
    }

    #[test]
    fn bad_metrics_address_is_reported_with_its_key() {
        let err = load(&[
            (SENTRY_UPSTREAM, "https://s.example.com"),
            (METRICS_ADDR, "nope"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: METRICS_ADDR, .. }));
    }

    #[test]
    fn blank_project_list_is_unrestricted() {
        let config = load(&[
            (SENTRY_UPSTREAM, "https://s.example.com"),
            (ALLOWED_PROJECTS, " , ,"),
        ])
        .unwrap();
        assert!(config.security.allowed_projects.is_empty());
    }

    #[test]
    fn bad_number_is_reported_with_its_key() {
        let err = load(&[
            (SENTRY_UPSTREAM, "https://s.example.com"),
            (MAX_BODY_SIZE, "five megabytes"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains(MAX_BODY_SIZE));
    }

    #[test]
    fn environment_overrides_file() {
        let path = std::env::temp_dir().join(format!(
            "sentry-tunnel-config-{}.toml",
            std::process::id()
        ));
        fs::write(
            &path,
            r#"
            [upstream]
            url = "https://from-file.example.com/"
            user_agent = "file-agent"

            [security]
            allowed_projects = [" 10 ", ""]
            "#,
        )
        .unwrap();

        let path_str = path.to_string_lossy().to_string();
        let config = load(&[
            (CONFIG_FILE, path_str.as_str()),
            (USER_AGENT, "env-agent"),
        ])
        .unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.upstream.url, "https://from-file.example.com");
        assert_eq!(config.upstream.user_agent, "env-agent");
        assert_eq!(config.security.allowed_projects, vec!["10"]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load(&[(CONFIG_FILE, "/definitely/not/here.toml")]).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
