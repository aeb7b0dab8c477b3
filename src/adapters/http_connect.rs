//! HTTP CONNECT adapter: tunnel through an upstream HTTP proxy.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Empty;
use hyper::client::conn::http1;
use hyper::header::HOST;
use hyper::upgrade::Upgraded;
use hyper::{Method, Request};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::adapters::{AdapterError, AdapterType, Endpoint, Metadata, ProxyStream};
use crate::resilience::timeouts::connect_with_timeout;

#[derive(Debug, Clone)]
pub struct HttpConnect {
    name: String,
    /// Upstream proxy address.
    server: Metadata,
    connect_timeout: Duration,
}

impl HttpConnect {
    pub fn new(name: impl Into<String>, server: Metadata, connect_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            server,
            connect_timeout,
        }
    }

    pub fn server(&self) -> &Metadata {
        &self.server
    }

    /// Ask the proxy for a tunnel to `target` and take over the socket once
    /// it answers 2xx.
    async fn handshake(&self, stream: TcpStream, target: &Metadata) -> Result<Upgraded, AdapterError> {
        let (mut sender, connection) = http1::handshake(TokioIo::new(stream)).await?;
        let driver = ConnectionDriver(tokio::spawn(async move {
            if let Err(e) = connection.with_upgrades().await {
                tracing::trace!(error = %e, "CONNECT connection closed");
            }
        }));

        let authority = target.to_string();
        let request = Request::builder()
            .method(Method::CONNECT)
            .uri(authority.as_str())
            .header(HOST, authority.as_str())
            .header("proxy-connection", "Keep-Alive")
            .body(Empty::<Bytes>::new())
            .map_err(|e| AdapterError::InvalidTarget(e.to_string()))?;

        let response = sender.send_request(request).await?;
        if !response.status().is_success() {
            return Err(AdapterError::Handshake(format!("proxy answered {}", response.status())));
        }

        let upgraded = hyper::upgrade::on(response).await?;
        drop(driver);
        Ok(upgraded)
    }
}

/// Aborts the connection task when the handshake is abandoned.
struct ConnectionDriver(JoinHandle<()>);

impl Drop for ConnectionDriver {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[async_trait]
impl Endpoint for HttpConnect {
    fn name(&self) -> &str {
        &self.name
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Http
    }

    async fn dial(&self, metadata: &Metadata) -> Result<Box<dyn ProxyStream>, AdapterError> {
        let stream =
            connect_with_timeout(&self.server.host, self.server.port, self.connect_timeout).await?;

        let tunnel = match timeout(self.connect_timeout, self.handshake(stream, metadata)).await {
            Ok(Ok(tunnel)) => tunnel,
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(AdapterError::Timeout(self.connect_timeout)),
        };

        tracing::trace!(
            adapter = %self.name,
            server = %self.server,
            target = %metadata,
            "CONNECT tunnel established"
        );
        Ok(Box::new(TokioIo::new(tunnel)))
    }
}
