//! Direct adapter: connect to the target without any upstream proxy.

use std::time::Duration;

use async_trait::async_trait;

use crate::adapters::{AdapterError, AdapterType, Endpoint, Metadata, ProxyStream};
use crate::resilience::timeouts::connect_with_timeout;

/// Name of the built-in direct endpoint.
pub const DIRECT_NAME: &str = "DIRECT";

#[derive(Debug, Clone)]
pub struct Direct {
    name: String,
    connect_timeout: Duration,
}

impl Direct {
    pub fn new(name: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            connect_timeout,
        }
    }
}

impl Default for Direct {
    fn default() -> Self {
        Self::new(DIRECT_NAME, Duration::from_secs(5))
    }
}

#[async_trait]
impl Endpoint for Direct {
    fn name(&self) -> &str {
        &self.name
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Direct
    }

    async fn dial(&self, metadata: &Metadata) -> Result<Box<dyn ProxyStream>, AdapterError> {
        let stream = connect_with_timeout(&metadata.host, metadata.port, self.connect_timeout).await?;
        tracing::trace!(adapter = %self.name, target = %metadata, "Direct connection established");
        Ok(Box::new(stream))
    }
}
