//! Client identification headers.
//!
//! # Responsibilities
//! - Resolve the originating client IP for an inbound request
//! - Only honour X-Forwarded-For when the deployment trusts its proxy
//!
//! The resolved address is advisory metadata for the upstream, not an
//! access control, so resolution always yields something.

use axum::http::HeaderMap;
use std::net::SocketAddr;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

/// Resolve the client IP for an inbound request.
///
/// `peer` is the transport-level peer address as a string, usually
/// `ip:port` or `[ipv6]:port`.
pub fn resolve_client_ip(headers: &HeaderMap, peer: &str, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(ip) = first_forwarded_for(headers) {
            return ip;
        }
    }
    strip_port(peer)
}

/// First entry of X-Forwarded-For, trimmed. The leftmost entry is the
/// original client.
fn first_forwarded_for(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(X_FORWARDED_FOR)?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    (!first.is_empty()).then(|| first.to_string())
}

fn strip_port(peer: &str) -> String {
    match peer.parse::<SocketAddr>() {
        Ok(addr) => addr.ip().to_string(),
        Err(_) => peer.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn xff(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn trusted_proxy_uses_first_forwarded_entry() {
        let ip = resolve_client_ip(&xff("1.2.3.4, 5.6.7.8"), "10.0.0.1:5000", true);
        assert_eq!(ip, "1.2.3.4");
    }

    #[test]
    fn trusted_proxy_trims_whitespace() {
        let ip = resolve_client_ip(&xff("  9.9.9.9  ,1.1.1.1"), "10.0.0.1:5000", true);
        assert_eq!(ip, "9.9.9.9");
    }

    #[test]
    fn untrusted_proxy_ignores_forwarded_header() {
        let ip = resolve_client_ip(&xff("1.2.3.4, 5.6.7.8"), "10.0.0.1:5000", false);
        assert_eq!(ip, "10.0.0.1");
    }

    #[test]
    fn empty_forwarded_entry_falls_back_to_peer() {
        let ip = resolve_client_ip(&xff(" , 5.6.7.8"), "10.0.0.1:5000", true);
        assert_eq!(ip, "10.0.0.1");

        let ip = resolve_client_ip(&HeaderMap::new(), "10.0.0.1:5000", true);
        assert_eq!(ip, "10.0.0.1");
    }

    #[test]
    fn ipv6_peer_port_is_stripped() {
        let ip = resolve_client_ip(&HeaderMap::new(), "[::1]:8080", false);
        assert_eq!(ip, "::1");
    }

    #[test]
    fn peer_without_port_is_used_as_is() {
        let ip = resolve_client_ip(&HeaderMap::new(), "unix-socket", false);
        assert_eq!(ip, "unix-socket");
    }
}
