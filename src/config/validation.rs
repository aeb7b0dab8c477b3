//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (the group references defined proxies)
//! - Validate value ranges (delay and timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::adapters::direct::DIRECT_NAME;
use crate::adapters::Metadata;
use crate::config::schema::{ProxyConfig, UpstreamKind};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("proxy #{0} has an empty name")]
    EmptyProxyName(usize),

    #[error("duplicate proxy name '{0}'")]
    DuplicateProxy(String),

    #[error("proxy '{0}' requires an address")]
    MissingAddress(String),

    #[error("proxy '{name}' has invalid address '{address}'")]
    InvalidAddress { name: String, address: String },

    #[error("group '{group}' references unknown proxy '{proxy}'")]
    UnknownProxy { group: String, proxy: String },

    #[error("group '{0}' lists no proxies")]
    EmptyGroup(String),

    #[error("group '{group}' has invalid url '{url}': {reason}")]
    InvalidUrl { group: String, url: String, reason: String },

    #[error("group '{0}' delay must be greater than zero")]
    ZeroDelay(String),

    #[error("probe timeout must be greater than zero")]
    ZeroProbeTimeout,

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut names: HashSet<&str> = HashSet::new();
    names.insert(DIRECT_NAME);
    for (i, proxy) in config.proxies.iter().enumerate() {
        if proxy.name.trim().is_empty() {
            errors.push(ValidationError::EmptyProxyName(i));
            continue;
        }
        if !names.insert(proxy.name.as_str()) {
            errors.push(ValidationError::DuplicateProxy(proxy.name.clone()));
        }
        match (proxy.kind, &proxy.address) {
            (UpstreamKind::Http, None) => {
                errors.push(ValidationError::MissingAddress(proxy.name.clone()));
            }
            (UpstreamKind::Http, Some(address)) if Metadata::parse_addr(address).is_err() => {
                errors.push(ValidationError::InvalidAddress {
                    name: proxy.name.clone(),
                    address: address.clone(),
                });
            }
            _ => {}
        }
    }

    let group = &config.fallback;
    if group.proxies.is_empty() {
        errors.push(ValidationError::EmptyGroup(group.name.clone()));
    }
    for proxy in &group.proxies {
        if !names.contains(proxy.as_str()) {
            errors.push(ValidationError::UnknownProxy {
                group: group.name.clone(),
                proxy: proxy.clone(),
            });
        }
    }
    let url_error = match Url::parse(&group.url) {
        Ok(url) => Metadata::from_url(&url).err().map(|e| e.to_string()),
        Err(e) => Some(e.to_string()),
    };
    if let Some(reason) = url_error {
        errors.push(ValidationError::InvalidUrl {
            group: group.name.clone(),
            url: group.url.clone(),
            reason,
        });
    }
    if group.delay == 0 {
        errors.push(ValidationError::ZeroDelay(group.name.clone()));
    }

    if config.probe.timeout_secs == 0 {
        errors.push(ValidationError::ZeroProbeTimeout);
    }

    let obs = &config.observability;
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(obs.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
