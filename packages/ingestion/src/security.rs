//! URL validation for SSRF protection.
//!
//! Every outbound fetch the pipeline performs (page fetch, oEmbed, scrape
//! fallback, file download) passes through [`UrlGuard`] first.

use std::collections::HashSet;
use std::net::IpAddr;

use crate::error::{SecurityError, SecurityResult};

/// Validates target URLs before any fetch to prevent:
/// - Access to internal services (localhost, 127.0.0.1)
/// - Access to private IP ranges (10.x, 172.16.x, 192.168.x)
/// - Access to cloud metadata services (169.254.x)
/// - Non-HTTP(S) schemes (file://, ftp://)
#[derive(Debug, Clone)]
pub struct UrlGuard {
    allowed_schemes: HashSet<String>,
    blocked_hosts: HashSet<String>,
    blocked_cidrs: Vec<ipnet::IpNet>,
    /// Hosts that bypass validation entirely (test escape hatch)
    allowed_hosts: HashSet<String>,
}

impl Default for UrlGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlGuard {
    /// Create a guard with the default security rules.
    pub fn new() -> Self {
        Self {
            allowed_schemes: ["http", "https"].into_iter().map(String::from).collect(),
            blocked_hosts: [
                "localhost",
                "127.0.0.1",
                "::1",
                "[::1]",
                "0.0.0.0",
                "metadata.google.internal",
                "metadata.gke.internal",
                "instance-data",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            blocked_cidrs: vec![
                "10.0.0.0/8".parse().unwrap(),
                "172.16.0.0/12".parse().unwrap(),
                "192.168.0.0/16".parse().unwrap(),
                "169.254.0.0/16".parse().unwrap(), // Link-local / cloud metadata
                "127.0.0.0/8".parse().unwrap(),    // Loopback
                "::1/128".parse().unwrap(),        // IPv6 loopback
                "fc00::/7".parse().unwrap(),       // IPv6 unique-local
                "fe80::/10".parse().unwrap(),      // IPv6 link-local
            ],
            allowed_hosts: HashSet::new(),
        }
    }

    /// Allow a host to bypass validation.
    pub fn allow_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_hosts.insert(host.into());
        self
    }

    /// Block an additional host.
    pub fn block_host(mut self, host: impl Into<String>) -> Self {
        self.blocked_hosts.insert(host.into());
        self
    }

    /// Validate a URL for safety.
    pub fn validate(&self, url: &str) -> SecurityResult<()> {
        let parsed = url::Url::parse(url)?;

        if !self.allowed_schemes.contains(parsed.scheme()) {
            return Err(SecurityError::DisallowedScheme(parsed.scheme().to_string()));
        }

        let host = parsed.host_str().ok_or(SecurityError::NoHost)?;

        if self.allowed_hosts.contains(host) {
            return Ok(());
        }

        if self.blocked_hosts.contains(host) {
            return Err(SecurityError::BlockedHost(host.to_string()));
        }

        // Literal IPs are checked against the CIDR table directly.
        if let Ok(ip) = host.trim_matches(['[', ']']).parse::<IpAddr>() {
            for cidr in &self.blocked_cidrs {
                if cidr.contains(&ip) {
                    return Err(SecurityError::BlockedCidr(ip.to_string()));
                }
            }
        }

        Ok(())
    }

    /// Validate a URL and resolve DNS to check the actual addresses.
    ///
    /// Catches DNS-rebinding setups where a public hostname resolves to an
    /// internal IP.
    pub async fn validate_resolved(&self, url: &str) -> SecurityResult<()> {
        self.validate(url)?;

        let parsed = url::Url::parse(url)?;
        let host = parsed.host_str().ok_or(SecurityError::NoHost)?;

        if self.allowed_hosts.contains(host) {
            return Ok(());
        }

        // Literal IPs were already checked in validate().
        if host.trim_matches(['[', ']']).parse::<IpAddr>().is_ok() {
            return Ok(());
        }

        let port = parsed.port().unwrap_or(match parsed.scheme() {
            "https" => 443,
            _ => 80,
        });

        let addrs = tokio::net::lookup_host(format!("{}:{}", host, port))
            .await
            .map_err(|e| SecurityError::DnsResolution(e.to_string()))?;

        for addr in addrs {
            let ip = addr.ip();
            for cidr in &self.blocked_cidrs {
                if cidr.contains(&ip) {
                    return Err(SecurityError::BlockedCidr(format!(
                        "{} resolved to blocked IP {}",
                        host, ip
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_localhost() {
        let guard = UrlGuard::new();
        assert!(guard.validate("http://localhost/").is_err());
        assert!(guard.validate("http://127.0.0.1/").is_err());
        assert!(guard.validate("http://[::1]/").is_err());
    }

    #[test]
    fn test_blocks_private_ranges() {
        let guard = UrlGuard::new();
        assert!(guard.validate("http://10.1.2.3/").is_err());
        assert!(guard.validate("http://172.16.0.1/").is_err());
        assert!(guard.validate("http://172.31.255.1/").is_err());
        assert!(guard.validate("http://192.168.0.5/").is_err());
    }

    #[test]
    fn test_blocks_metadata_endpoints() {
        let guard = UrlGuard::new();
        assert!(guard.validate("http://169.254.169.254/latest/meta-data/").is_err());
        assert!(guard.validate("http://metadata.google.internal/").is_err());
    }

    #[test]
    fn test_blocks_non_http_schemes() {
        let guard = UrlGuard::new();
        assert!(guard.validate("file:///etc/passwd").is_err());
        assert!(guard.validate("ftp://example.com/").is_err());
        assert!(guard.validate("gopher://example.com/").is_err());
    }

    #[test]
    fn test_allows_public_hosts() {
        let guard = UrlGuard::new();
        assert!(guard.validate("https://example.com/article").is_ok());
        assert!(guard.validate("http://news.ycombinator.com/").is_ok());
        assert!(guard.validate("https://8.8.8.8/").is_ok());
    }

    #[test]
    fn test_allow_host_bypass() {
        let guard = UrlGuard::new().allow_host("localhost");
        assert!(guard.validate("http://localhost:3000/fixture").is_ok());
    }

    #[test]
    fn test_block_additional_host() {
        let guard = UrlGuard::new().block_host("internal.corp");
        assert!(guard.validate("https://internal.corp/secrets").is_err());
    }

    #[test]
    fn test_ipv6_private_ranges() {
        let guard = UrlGuard::new();
        assert!(guard.validate("http://[fc00::1]/").is_err());
        assert!(guard.validate("http://[fe80::1]/").is_err());
    }
}
