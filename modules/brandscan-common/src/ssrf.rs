//! SSRF and URL policy enforcement (§6). `check` is the single gate every
//! URL — seed or discovered — must pass before any network request is
//! made against it.

use std::net::{IpAddr, ToSocketAddrs};

use thiserror::Error;
use url::Url;

const MAX_URL_LEN: usize = 2048;

const BLOCKED_HOST_SUFFIXES: &[&str] = &[".local", ".internal", ".test"];
const BLOCKED_HOSTS: &[&str] = &[
    "localhost",
    "169.254.169.254",
    "metadata.google.internal",
    "kubernetes.default.svc.cluster.local",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SsrfError {
    #[error("URL is empty or invalid")]
    InvalidUrl,
    #[error("unsupported URL scheme (only http/https allowed)")]
    UnsupportedScheme,
    #[error("URL exceeds maximum length of {MAX_URL_LEN} characters")]
    TooLong,
    #[error("blocked host (localhost/private/metadata)")]
    BlockedHost,
    #[error("host does not resolve to a usable address")]
    UnresolvableHost,
}

/// Validate a URL against the SSRF policy. Returns `Ok(())` only when the
/// URL is safe to fetch: `http`/`https` scheme, under the length cap, not a
/// blocked hostname, and resolving to a non-private/non-loopback/
/// non-link-local address.
pub fn check(raw_url: &str) -> Result<(), SsrfError> {
    if raw_url.is_empty() || raw_url.len() > MAX_URL_LEN {
        return if raw_url.is_empty() {
            Err(SsrfError::InvalidUrl)
        } else {
            Err(SsrfError::TooLong)
        };
    }

    let parsed = Url::parse(raw_url).map_err(|_| SsrfError::InvalidUrl)?;

    match parsed.scheme() {
        "http" | "https" => {}
        _ => return Err(SsrfError::UnsupportedScheme),
    }

    let host = parsed.host_str().ok_or(SsrfError::InvalidUrl)?.to_lowercase();

    if BLOCKED_HOSTS.contains(&host.as_str())
        || BLOCKED_HOST_SUFFIXES.iter().any(|suffix| host.ends_with(suffix))
    {
        return Err(SsrfError::BlockedHost);
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_blocked_ip(ip) {
            return Err(SsrfError::BlockedHost);
        }
        return Ok(());
    }

    let port = parsed.port_or_known_default().unwrap_or(80);
    let resolved: Vec<IpAddr> = (host.as_str(), port)
        .to_socket_addrs()
        .map_err(|_| SsrfError::UnresolvableHost)?
        .map(|addr| addr.ip())
        .collect();

    if resolved.is_empty() {
        return Err(SsrfError::UnresolvableHost);
    }

    if resolved.iter().any(|ip| is_blocked_ip(*ip)) {
        return Err(SsrfError::BlockedHost);
    }

    Ok(())
}

fn is_blocked_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_documentation()
                || v4.is_unspecified()
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified() || is_unique_local_v6(v6),
    }
}

fn is_unique_local_v6(v6: std::net::Ipv6Addr) -> bool {
    (v6.segments()[0] & 0xfe00) == 0xfc00
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_url() {
        assert_eq!(check(""), Err(SsrfError::InvalidUrl));
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert_eq!(check("ftp://example.com/"), Err(SsrfError::UnsupportedScheme));
    }

    #[test]
    fn rejects_loopback_literal() {
        assert_eq!(check("http://127.0.0.1/"), Err(SsrfError::BlockedHost));
    }

    #[test]
    fn rejects_localhost_hostname() {
        assert_eq!(check("http://localhost:8080/"), Err(SsrfError::BlockedHost));
    }

    #[test]
    fn rejects_metadata_host() {
        assert_eq!(check("http://169.254.169.254/latest/meta-data/"), Err(SsrfError::BlockedHost));
    }

    #[test]
    fn rejects_dot_internal_suffix() {
        assert_eq!(check("http://svc.internal/"), Err(SsrfError::BlockedHost));
    }

    #[test]
    fn rejects_private_ipv4_literal() {
        assert_eq!(check("http://10.0.0.5/"), Err(SsrfError::BlockedHost));
        assert_eq!(check("http://192.168.1.1/"), Err(SsrfError::BlockedHost));
    }

    #[test]
    fn rejects_oversized_url() {
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LEN));
        assert_eq!(check(&long), Err(SsrfError::TooLong));
    }

    #[test]
    fn accepts_public_https_url() {
        assert_eq!(check("https://example.com/about"), Ok(()));
    }
}
