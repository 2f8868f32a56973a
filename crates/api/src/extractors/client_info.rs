//! Client address and user-agent extractor.
//!
//! Redemption audit events record where a request came from. Behind a proxy
//! the socket address is the proxy's, so `X-Forwarded-For` takes precedence
//! when it carries a parseable address.

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, Extensions, HeaderMap},
};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

/// Header set by reverse proxies with the original client address chain.
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Request origin details captured for audit purposes.
///
/// Both fields are optional: a request with no resolvable address or no
/// user-agent is still served, the audit row just carries NULLs.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip: Option<IpAddr>,
    pub user_agent: Option<String>,
}

/// Resolve the client IP from headers and connection info.
///
/// The first entry of `X-Forwarded-For` is the original client; later
/// entries are intermediate proxies. Falls back to the peer socket address
/// when the header is absent or unparseable.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<IpAddr> {
    let forwarded = headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| {
        extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = client_ip(&parts.headers, &parts.extensions);

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Ok(ClientInfo { ip, user_agent })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::net::Ipv4Addr;

    fn headers_with_forwarded(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            FORWARDED_FOR_HEADER,
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn test_client_ip_from_forwarded_header() {
        let headers = headers_with_forwarded("203.0.113.7");
        let ip = client_ip(&headers, &Extensions::new());
        assert_eq!(ip, Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7))));
    }

    #[test]
    fn test_client_ip_takes_first_forwarded_entry() {
        let headers = headers_with_forwarded("203.0.113.7, 10.0.0.1, 10.0.0.2");
        let ip = client_ip(&headers, &Extensions::new());
        assert_eq!(ip, Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7))));
    }

    #[test]
    fn test_client_ip_trims_whitespace() {
        let headers = headers_with_forwarded("  203.0.113.7 , 10.0.0.1");
        let ip = client_ip(&headers, &Extensions::new());
        assert_eq!(ip, Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7))));
    }

    #[test]
    fn test_client_ip_falls_back_to_connect_info() {
        let headers = HeaderMap::new();
        let mut extensions = Extensions::new();
        let addr: SocketAddr = "192.0.2.9:50012".parse().unwrap();
        extensions.insert(ConnectInfo(addr));

        let ip = client_ip(&headers, &extensions);
        assert_eq!(ip, Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 9))));
    }

    #[test]
    fn test_client_ip_unparseable_header_falls_back() {
        let headers = headers_with_forwarded("not-an-ip");
        let mut extensions = Extensions::new();
        let addr: SocketAddr = "192.0.2.9:50012".parse().unwrap();
        extensions.insert(ConnectInfo(addr));

        let ip = client_ip(&headers, &extensions);
        assert_eq!(ip, Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 9))));
    }

    #[test]
    fn test_client_ip_none_when_unresolvable() {
        let ip = client_ip(&HeaderMap::new(), &Extensions::new());
        assert!(ip.is_none());
    }

    #[test]
    fn test_client_ip_ipv6_forwarded() {
        let headers = headers_with_forwarded("2001:db8::1");
        let ip = client_ip(&headers, &Extensions::new());
        assert_eq!(ip, Some("2001:db8::1".parse::<IpAddr>().unwrap()));
    }

    #[test]
    fn test_client_info_struct_clone() {
        let info = ClientInfo {
            ip: Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7))),
            user_agent: Some("curl/8.0".to_string()),
        };
        let cloned = info.clone();
        assert_eq!(cloned.ip, info.ip);
        assert_eq!(cloned.user_agent, info.user_agent);
    }
}
