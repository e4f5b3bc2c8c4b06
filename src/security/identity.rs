//! Client identification for abuse-control bookkeeping.
//!
//! `X-Forwarded-For` is only believed when the transport peer is a
//! configured reverse proxy. Everyone else is keyed by peer address.

use std::net::{AddrParseError, IpAddr, SocketAddr};

use axum::http::HeaderMap;

/// Identity used when neither a forwarded address nor a peer is known.
pub const UNKNOWN_CLIENT: &str = "unknown";

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Peers allowed to report the original client address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustedProxies {
    /// Honor the header from anyone. Only safe when the server is unreachable
    /// except through a proxy.
    Any,
    List(Vec<IpAddr>),
}

impl TrustedProxies {
    /// Parse config entries; `"*"` anywhere means [`TrustedProxies::Any`].
    pub fn parse(entries: &[String]) -> Result<Self, AddrParseError> {
        if entries.iter().any(|e| e.trim() == "*") {
            return Ok(TrustedProxies::Any);
        }
        let ips = entries
            .iter()
            .map(|e| e.trim().parse::<IpAddr>().map(|ip| ip.to_canonical()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TrustedProxies::List(ips))
    }

    fn trusts(&self, peer: Option<IpAddr>) -> bool {
        match (self, peer) {
            (TrustedProxies::Any, _) => true,
            (TrustedProxies::List(ips), Some(peer)) => ips.contains(&peer),
            (TrustedProxies::List(_), None) => false,
        }
    }
}

/// Derives the identity string that keys rate-limit and lockout state.
#[derive(Debug, Clone)]
pub struct ClientIdentifier {
    trusted: TrustedProxies,
}

impl ClientIdentifier {
    pub fn new(trusted: TrustedProxies) -> Self {
        Self { trusted }
    }

    /// Never consult forwarded headers.
    pub fn peer_only() -> Self {
        Self::new(TrustedProxies::List(Vec::new()))
    }

    /// Identify a request.
    ///
    /// A trusted peer's `X-Forwarded-For` wins (first entry, trimmed); then
    /// the peer IP; then [`UNKNOWN_CLIENT`].
    pub fn identify(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        let peer_ip = peer.map(|addr| addr.ip().to_canonical());

        if self.trusted.trusts(peer_ip) {
            if let Some(forwarded) = forwarded_client(headers) {
                return forwarded;
            }
        }

        peer_ip
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
    }
}

impl Default for ClientIdentifier {
    fn default() -> Self {
        Self::new(TrustedProxies::List(vec![
            IpAddr::from([127, 0, 0, 1]),
            IpAddr::from([0u16, 0, 0, 0, 0, 0, 0, 1]),
        ]))
    }
}

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(X_FORWARDED_FOR)?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_xff(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn peer(addr: &str) -> Option<SocketAddr> {
        Some(addr.parse().unwrap())
    }

    #[test]
    fn test_trusted_proxy_forwarded_first_entry() {
        let identifier = ClientIdentifier::default();
        let headers = headers_with_xff(" 203.0.113.7 , 10.0.0.2");
        assert_eq!(
            identifier.identify(&headers, peer("127.0.0.1:5555")),
            "203.0.113.7"
        );
    }

    #[test]
    fn test_untrusted_peer_header_ignored() {
        let identifier = ClientIdentifier::default();
        let headers = headers_with_xff("203.0.113.7");
        assert_eq!(
            identifier.identify(&headers, peer("198.51.100.4:443")),
            "198.51.100.4"
        );
    }

    #[test]
    fn test_any_trusts_header_without_peer() {
        let identifier = ClientIdentifier::new(TrustedProxies::Any);
        let headers = headers_with_xff("203.0.113.7");
        assert_eq!(identifier.identify(&headers, None), "203.0.113.7");
    }

    #[test]
    fn test_fallbacks() {
        let identifier = ClientIdentifier::new(TrustedProxies::Any);
        assert_eq!(
            identifier.identify(&HeaderMap::new(), peer("[::1]:80")),
            "::1"
        );
        assert_eq!(identifier.identify(&HeaderMap::new(), None), UNKNOWN_CLIENT);

        // Empty first entry degrades to the peer.
        let headers = headers_with_xff(" , 10.0.0.2");
        assert_eq!(
            identifier.identify(&headers, peer("192.0.2.1:80")),
            "192.0.2.1"
        );
    }

    #[test]
    fn test_mapped_ipv6_peer_matches_ipv4_proxy() {
        let identifier = ClientIdentifier::default();
        let headers = headers_with_xff("203.0.113.9");
        assert_eq!(
            identifier.identify(&headers, peer("[::ffff:127.0.0.1]:8080")),
            "203.0.113.9"
        );
    }

    #[test]
    fn test_parse_trusted_proxies() {
        assert_eq!(
            TrustedProxies::parse(&["*".into()]).unwrap(),
            TrustedProxies::Any
        );
        assert_eq!(
            TrustedProxies::parse(&["10.0.0.1".into()]).unwrap(),
            TrustedProxies::List(vec!["10.0.0.1".parse().unwrap()])
        );
        assert!(TrustedProxies::parse(&["proxy".into()]).is_err());
        assert!(ClientIdentifier::peer_only()
            .identify(&headers_with_xff("1.2.3.4"), peer("127.0.0.1:1"))
            .eq("127.0.0.1"));
    }
}
