//! Build identification, reported by the liveness probe.
//!
//! `SENTRY_TUNNEL_COMMIT` and `SENTRY_TUNNEL_BUILD_DATE` are read at compile
//! time and are normally set by the packaging pipeline.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const COMMIT: &str = match option_env!("SENTRY_TUNNEL_COMMIT") {
    Some(commit) => commit,
    None => "unknown",
};

pub const DATE: &str = match option_env!("SENTRY_TUNNEL_BUILD_DATE") {
    Some(date) => date,
    None => "unknown",
};
