//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Upstream proxy definitions, referenced by name from groups.
    pub proxies: Vec<UpstreamConfig>,

    /// The fallback group.
    pub fallback: FallbackOption,

    /// Reachability probe settings.
    pub probe: ProbeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Upstream variant.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamKind {
    /// HTTP proxy reached with CONNECT.
    Http,
    /// No proxy; connect to the target itself.
    Direct,
}

/// A single upstream proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Unique identifier, also used as display name.
    pub name: String,

    #[serde(rename = "type")]
    pub kind: UpstreamKind,

    /// Proxy address (e.g., "10.0.0.1:3128"). Required for `http`.
    #[serde(default)]
    pub address: Option<String>,

    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_connect_timeout_secs() -> u64 {
    5
}

/// Declarative options of a fallback group.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct FallbackOption {
    /// Group identifier.
    pub name: String,

    /// Upstream names in priority order.
    pub proxies: Vec<String>,

    /// Probe target URL.
    pub url: String,

    /// Probe interval in seconds.
    pub delay: u64,
}

impl FallbackOption {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.delay)
    }
}

impl Default for FallbackOption {
    fn default() -> Self {
        Self {
            name: "fallback".to_string(),
            proxies: Vec::new(),
            url: "http://www.gstatic.com/generate_204".to_string(),
            delay: 300,
        }
    }
}

/// Probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Upper bound for one reachability check, in seconds.
    pub timeout_secs: u64,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self { timeout_secs: 5 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
