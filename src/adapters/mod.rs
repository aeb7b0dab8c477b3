//! Upstream adapter subsystem.
//!
//! # Data Flow
//! ```text
//! Metadata (target host:port)
//!     → Endpoint::dial (one upstream variant)
//!         - direct.rs (connect to the target itself)
//!         - http_connect.rs (tunnel through an HTTP proxy)
//!     → Box<dyn ProxyStream> or AdapterError
//! ```
//!
//! # Design Decisions
//! - Every variant is reached through the same `Endpoint` trait object
//! - Adapters own their connect timeout; callers never add another
//! - Adapters are shared as `Arc<dyn Endpoint>` between config and groups

pub mod direct;
pub mod http_connect;
pub mod metadata;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

pub use direct::Direct;
pub use http_connect::HttpConnect;
pub use metadata::{Metadata, Network};

/// A live, bidirectional connection produced by an endpoint.
pub trait ProxyStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> ProxyStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Kind tag reported by adapters and groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AdapterType {
    Direct,
    Http,
    Fallback,
}

impl fmt::Display for AdapterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdapterType::Direct => "Direct",
            AdapterType::Http => "Http",
            AdapterType::Fallback => "Fallback",
        };
        f.write_str(s)
    }
}

/// An upstream that can produce connections to arbitrary targets.
#[async_trait]
pub trait Endpoint: Send + Sync + fmt::Debug {
    /// Display name, unique within a configuration.
    fn name(&self) -> &str;

    fn adapter_type(&self) -> AdapterType;

    /// Open a connection to `metadata` through this upstream.
    async fn dial(&self, metadata: &Metadata) -> Result<Box<dyn ProxyStream>, AdapterError>;
}

/// Errors produced while dialing through an upstream.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connect timed out after {0:?}")]
    Timeout(Duration),

    /// The upstream answered, but refused the tunnel request.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The upstream's HTTP exchange could not be completed or parsed.
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("invalid target: {0}")]
    InvalidTarget(String),
}
