//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve configured upstreams into endpoints
//! - Build the fallback group, which starts its probe scheduler
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Expects a configuration that already passed validation

use std::sync::Arc;

use thiserror::Error;

use crate::config::resolve::{build_endpoints, resolve_group_endpoints};
use crate::config::validation::ValidationError;
use crate::config::ProxyConfig;
use crate::group::{FallbackGroup, GroupError};
use crate::health::{ProbeError, UrlTestProbe};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ValidationError),

    #[error("probe setup failed: {0}")]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Group(#[from] GroupError),
}

/// Build the configured fallback group with the URL test probe.
pub fn build_fallback_group(config: &ProxyConfig) -> Result<FallbackGroup, StartupError> {
    let registry = build_endpoints(config)?;
    let endpoints = resolve_group_endpoints(&registry, &config.fallback)?;
    let probe = Arc::new(UrlTestProbe::new(config.probe.timeout())?);
    Ok(FallbackGroup::new(&config.fallback, endpoints, probe)?)
}
