//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

use proxy_fallback::adapters::{AdapterError, AdapterType, Endpoint, Metadata, ProxyStream};
use proxy_fallback::config::FallbackOption;
use proxy_fallback::health::{Probe, ProbeError};

/// Endpoint whose dial outcome is controlled by the test.
///
/// A successful dial yields an in-memory stream that carries the endpoint's
/// name, so tests can tell which candidate produced a connection.
#[derive(Debug)]
pub struct ScriptedEndpoint {
    name: String,
    dial_ok: AtomicBool,
    dials: AtomicUsize,
}

impl ScriptedEndpoint {
    pub fn new(name: &str, dial_ok: bool) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            dial_ok: AtomicBool::new(dial_ok),
            dials: AtomicUsize::new(0),
        })
    }

    pub fn set_dial_ok(&self, ok: bool) {
        self.dial_ok.store(ok, Ordering::SeqCst);
    }

    pub fn dials(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Endpoint for ScriptedEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Http
    }

    async fn dial(&self, _metadata: &Metadata) -> Result<Box<dyn ProxyStream>, AdapterError> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        if !self.dial_ok.load(Ordering::SeqCst) {
            return Err(AdapterError::Handshake(format!("{} refused", self.name)));
        }
        let (conn, mut peer) = tokio::io::duplex(64);
        peer.write_all(self.name.as_bytes()).await?;
        Ok(Box::new(conn))
    }
}

/// Read everything from a connection produced by a `ScriptedEndpoint`.
pub async fn read_origin(mut conn: Box<dyn ProxyStream>) -> String {
    let mut buf = String::new();
    conn.read_to_string(&mut buf).await.unwrap();
    buf
}

/// How the mock probe answers for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    Up,
    Down,
    Panic,
}

/// Probe answering from a per-endpoint table; unknown names are `Up`.
#[derive(Debug, Default)]
pub struct MockProbe {
    table: Mutex<HashMap<String, Reachability>>,
    calls: AtomicUsize,
}

impl MockProbe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, name: &str, reachability: Reachability) {
        self.table.lock().unwrap().insert(name.to_string(), reachability);
    }

    pub fn set_all(&self, names: &[&str], reachability: Reachability) {
        for name in names {
            self.set(name, reachability);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for MockProbe {
    async fn probe(&self, endpoint: &dyn Endpoint, _url: &Url) -> Result<Duration, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reachability = self
            .table
            .lock()
            .unwrap()
            .get(endpoint.name())
            .copied()
            .unwrap_or(Reachability::Up);
        match reachability {
            Reachability::Up => Ok(Duration::from_millis(1)),
            Reachability::Down => Err(ProbeError::BadResponse("unreachable".into())),
            Reachability::Panic => panic!("probe exploded for {}", endpoint.name()),
        }
    }
}

pub fn option(name: &str, delay: u64) -> FallbackOption {
    FallbackOption {
        name: name.to_string(),
        proxies: Vec::new(),
        url: "http://www.gstatic.com/generate_204".to_string(),
        delay,
    }
}

pub fn as_endpoints(list: &[Arc<ScriptedEndpoint>]) -> Vec<Arc<dyn Endpoint>> {
    list.iter().map(|e| Arc::clone(e) as Arc<dyn Endpoint>).collect()
}

/// Start an HTTP server answering every request with 204.
pub async fn start_http_responder() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 204 No Content\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// Start a minimal HTTP CONNECT proxy that tunnels to any target.
pub async fn start_connect_proxy() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut client, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut byte = [0u8; 1];
                while !head.ends_with(b"\r\n\r\n") {
                    match client.read(&mut byte).await {
                        Ok(1) => head.push(byte[0]),
                        _ => return,
                    }
                }
                let head = String::from_utf8_lossy(&head).to_string();
                let target = head
                    .lines()
                    .next()
                    .and_then(|line| line.strip_prefix("CONNECT "))
                    .and_then(|rest| rest.split_whitespace().next())
                    .map(str::to_string);
                let Some(target) = target else {
                    let _ = client.write_all(b"HTTP/1.1 405 Method Not Allowed\r\n\r\n").await;
                    return;
                };
                let Ok(mut upstream) = TcpStream::connect(target).await else {
                    let _ = client.write_all(b"HTTP/1.1 502 Bad Gateway\r\n\r\n").await;
                    return;
                };
                if client
                    .write_all(b"HTTP/1.1 200 Connection established\r\n\r\n")
                    .await
                    .is_err()
                {
                    return;
                }
                let _ = tokio::io::copy_bidirectional(&mut client, &mut upstream).await;
            });
        }
    });
    addr
}

/// A loopback port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
