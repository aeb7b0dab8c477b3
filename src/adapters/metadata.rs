//! Connection target metadata.

use std::fmt;

use url::{Host, Url};

use crate::adapters::AdapterError;

/// Transport of the requested connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Tcp,
}

/// Where a dial should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub network: Network,
    /// Hostname or IP literal, without IPv6 brackets.
    pub host: String,
    pub port: u16,
}

impl Metadata {
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self {
            network: Network::Tcp,
            host: host.into(),
            port,
        }
    }

    /// Derive a dial target from a URL.
    ///
    /// The port falls back to the scheme default for `http` and `https`;
    /// any other scheme must carry an explicit port.
    pub fn from_url(url: &Url) -> Result<Self, AdapterError> {
        let host = match url.host() {
            Some(Host::Domain(d)) if !d.is_empty() => d.to_string(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            _ => return Err(AdapterError::InvalidTarget(format!("no host in '{}'", url))),
        };

        let port = match (url.port(), url.scheme()) {
            (Some(port), _) => port,
            (None, "http") => 80,
            (None, "https") => 443,
            (None, scheme) => {
                return Err(AdapterError::InvalidTarget(format!(
                    "no port for scheme '{}'",
                    scheme
                )))
            }
        };

        Ok(Self::tcp(host, port))
    }

    /// Parse `host:port`, accepting bracketed IPv6 literals.
    pub fn parse_addr(s: &str) -> Result<Self, AdapterError> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| AdapterError::InvalidTarget(format!("missing port in '{}'", s)))?;
        let port: u16 = port
            .parse()
            .map_err(|_| AdapterError::InvalidTarget(format!("bad port in '{}'", s)))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(AdapterError::InvalidTarget(format!("missing host in '{}'", s)));
        }
        Ok(Self::tcp(host, port))
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
