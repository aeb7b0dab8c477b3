//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound every outbound TCP connect with a deadline
//! - Map elapsed deadlines to a distinct error
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from IO errors

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::adapters::AdapterError;

/// Open a TCP connection to `host:port`, giving up after `deadline`.
pub async fn connect_with_timeout(
    host: &str,
    port: u16,
    deadline: Duration,
) -> Result<TcpStream, AdapterError> {
    match timeout(deadline, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            if let Err(e) = stream.set_nodelay(true) {
                tracing::debug!(host, port, error = %e, "Failed to set TCP_NODELAY");
            }
            Ok(stream)
        }
        Ok(Err(e)) => Err(AdapterError::Io(e)),
        Err(_) => Err(AdapterError::Timeout(deadline)),
    }
}
