//! Client IP extraction from request headers.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Resolves the client IP for click tracking.
///
/// When `behind_proxy` is set, the first entry of `X-Forwarded-For` wins,
/// then `X-Real-IP`; otherwise (and as a fallback) the peer socket address
/// is used. Only enable proxy headers behind a trusted reverse proxy.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy {
        if let Some(forwarded) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return forwarded.to_string();
        }

        if let Some(real_ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return real_ip.to_string();
        }
    }

    peer.ip().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "10.0.0.1:54321".parse().unwrap()
    }

    #[test]
    fn test_peer_address_without_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4"));

        // Proxy headers are ignored unless explicitly trusted.
        assert_eq!(client_ip(&headers, peer(), false), "10.0.0.1");
    }

    #[test]
    fn test_forwarded_for_first_entry_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 5.6.7.8"),
        );

        assert_eq!(client_ip(&headers, peer(), true), "1.2.3.4");
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("9.9.9.9"));

        assert_eq!(client_ip(&headers, peer(), true), "9.9.9.9");
    }

    #[test]
    fn test_peer_fallback_when_headers_absent() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, peer(), true), "10.0.0.1");
    }
}
