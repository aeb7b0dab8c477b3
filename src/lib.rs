//! Fallback proxy group library.
//!
//! A fallback group tracks an ordered list of upstream proxies, probes all of
//! them concurrently in the background, and routes each connection through
//! the first one currently believed reachable.

pub mod adapters;
pub mod config;
pub mod group;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use adapters::{AdapterType, Endpoint, Metadata};
pub use config::schema::ProxyConfig;
pub use group::{FallbackGroup, GroupError};
pub use health::{Probe, UrlTestProbe};
pub use lifecycle::Shutdown;
