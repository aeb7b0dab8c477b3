//! Reachability probe.
//!
//! # Responsibilities
//! - Define the probe capability consumed by probe passes
//! - Provide the default URL test: dial through the endpoint, issue a GET
//!
//! # Design Decisions
//! - The probe owns its deadline; a pass never waits on a hung probe
//! - HTTPS targets get a full TLS handshake before the request
//! - Any parsed HTTP response counts as reachable, whatever its status

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Empty;
use hyper::client::conn::http1;
use hyper::header::{CONNECTION, HOST, USER_AGENT};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use url::{Position, Url};

use crate::adapters::{AdapterError, Endpoint, Metadata};

const PROBE_USER_AGENT: &str = concat!("proxy-fallback/", env!("CARGO_PKG_VERSION"));

/// Errors from a single reachability check.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("dial failed: {0}")]
    Dial(#[from] AdapterError),

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("TLS handshake failed: {0}")]
    TlsHandshake(std::io::Error),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] rustls::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("invalid request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("unexpected response: {0}")]
    BadResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Checks whether a URL is reachable through an endpoint.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Return the observed latency, or why the check failed.
    async fn probe(&self, endpoint: &dyn Endpoint, url: &Url) -> Result<Duration, ProbeError>;
}

/// HTTP GET based URL test.
#[derive(Debug, Clone)]
pub struct UrlTestProbe {
    timeout: Duration,
    tls: Arc<ClientConfig>,
}

impl UrlTestProbe {
    /// URL test trusting the platform's root certificates.
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        Ok(Self::with_tls_config(timeout, default_tls_config()?))
    }

    pub fn with_tls_config(timeout: Duration, tls: Arc<ClientConfig>) -> Self {
        Self { timeout, tls }
    }

    async fn exchange(&self, endpoint: &dyn Endpoint, url: &Url) -> Result<(), ProbeError> {
        let metadata = Metadata::from_url(url)?;
        let conn = endpoint.dial(&metadata).await?;

        let status = if url.scheme() == "https" {
            let server_name = ServerName::try_from(metadata.host.clone())
                .map_err(|e| ProbeError::Dial(AdapterError::InvalidTarget(e.to_string())))?;
            let tls = TlsConnector::from(Arc::clone(&self.tls))
                .connect(server_name, conn)
                .await
                .map_err(ProbeError::TlsHandshake)?;
            round_trip(tls, url).await?
        } else {
            round_trip(conn, url).await?
        };

        tracing::trace!(url = %url, status = %status, "Probe response");
        Ok(())
    }
}

/// Send one GET for `url` over `stream` and return the response status.
async fn round_trip<S>(stream: S, url: &Url) -> Result<StatusCode, ProbeError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, connection) = http1::handshake(TokioIo::new(stream)).await?;
    tokio::pin!(connection);

    let host = match url.port() {
        Some(port) => format!("{}:{}", url.host_str().unwrap_or_default(), port),
        None => url.host_str().unwrap_or_default().to_string(),
    };
    let request = Request::builder()
        .method(Method::GET)
        .uri(&url[Position::BeforePath..Position::AfterQuery])
        .header(HOST, host)
        .header(USER_AGENT, PROBE_USER_AGENT)
        .header(CONNECTION, "close")
        .body(Empty::<Bytes>::new())?;

    let send = sender.send_request(request);
    tokio::pin!(send);

    // The connection must be driven for the request to make progress.
    let response = tokio::select! {
        biased;
        response = &mut send => response?,
        closed = &mut connection => {
            closed?;
            send.await?
        }
    };
    Ok(response.status())
}

fn default_tls_config() -> Result<Arc<ClientConfig>, ProbeError> {
    let mut roots = RootCertStore::empty();
    match rustls_native_certs::load_native_certs() {
        Ok(certs) => {
            let (added, ignored) = roots.add_parsable_certificates(certs);
            tracing::debug!(added, ignored, "Loaded native root certificates");
        }
        Err(e) => tracing::warn!(error = %e, "Could not load native root certificates"),
    }

    let config = ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(Arc::new(config))
}

#[async_trait]
impl Probe for UrlTestProbe {
    async fn probe(&self, endpoint: &dyn Endpoint, url: &Url) -> Result<Duration, ProbeError> {
        let started = Instant::now();
        match timeout(self.timeout, self.exchange(endpoint, url)).await {
            Ok(Ok(())) => Ok(started.elapsed()),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        }
    }
}
