//! Turn upstream definitions into live endpoint capabilities.

use std::collections::HashMap;
use std::sync::Arc;

use crate::adapters::direct::DIRECT_NAME;
use crate::adapters::{Direct, Endpoint, HttpConnect, Metadata};
use crate::config::schema::{FallbackOption, ProxyConfig, UpstreamKind};
use crate::config::validation::ValidationError;

/// Endpoints by name.
pub type EndpointRegistry = HashMap<String, Arc<dyn Endpoint>>;

/// Build every configured endpoint, plus the built-in `DIRECT`.
pub fn build_endpoints(config: &ProxyConfig) -> Result<EndpointRegistry, ValidationError> {
    let mut registry: EndpointRegistry = HashMap::new();
    registry.insert(DIRECT_NAME.to_string(), Arc::new(Direct::default()));

    for proxy in &config.proxies {
        let endpoint: Arc<dyn Endpoint> = match proxy.kind {
            UpstreamKind::Direct => Arc::new(Direct::new(&proxy.name, proxy.connect_timeout())),
            UpstreamKind::Http => {
                let address = proxy
                    .address
                    .as_deref()
                    .ok_or_else(|| ValidationError::MissingAddress(proxy.name.clone()))?;
                let server = Metadata::parse_addr(address).map_err(|_| ValidationError::InvalidAddress {
                    name: proxy.name.clone(),
                    address: address.to_string(),
                })?;
                Arc::new(HttpConnect::new(&proxy.name, server, proxy.connect_timeout()))
            }
        };
        tracing::debug!(name = %proxy.name, kind = %endpoint.adapter_type(), "Endpoint built");
        registry.insert(proxy.name.clone(), endpoint);
    }

    Ok(registry)
}

/// Look up a group's endpoints, preserving the configured order.
pub fn resolve_group_endpoints(
    registry: &EndpointRegistry,
    option: &FallbackOption,
) -> Result<Vec<Arc<dyn Endpoint>>, ValidationError> {
    option
        .proxies
        .iter()
        .map(|name| {
            registry
                .get(name)
                .cloned()
                .ok_or_else(|| ValidationError::UnknownProxy {
                    group: option.name.clone(),
                    proxy: name.clone(),
                })
        })
        .collect()
}
