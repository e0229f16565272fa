//! # Stream-Socket Transport
//!
//! Opens a TCP connection, writes the whole payload, and closes.
//!
//! Success means the write and the close completed without an I/O error.
//! Nothing is read back from the printer, so this does not confirm that
//! paper actually came out.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::Transport;
use crate::error::{DocketError, Result};

pub struct StreamSocketTransport {
    addr: String,
    connect_timeout: Duration,
}

impl StreamSocketTransport {
    /// `addr` is `host:port`.
    pub fn new(addr: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            connect_timeout,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

#[async_trait]
impl Transport for StreamSocketTransport {
    fn kind(&self) -> &'static str {
        "stream-socket"
    }

    async fn send(&self, payload: &[u8]) -> Result<()> {
        let mut stream = timeout(self.connect_timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| {
                DocketError::Transport(format!(
                    "Connecting to {} timed out after {:?}",
                    self.addr, self.connect_timeout
                ))
            })?
            .map_err(|e| DocketError::Transport(format!("Failed to connect to {}: {}", self.addr, e)))?;

        stream
            .write_all(payload)
            .await
            .map_err(|e| DocketError::Transport(format!("Write to {} failed: {}", self.addr, e)))?;
        stream
            .shutdown()
            .await
            .map_err(|e| DocketError::Transport(format!("Close of {} failed: {}", self.addr, e)))?;

        debug!(addr = %self.addr, bytes = payload.len(), "Socket write complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_delivers_payload() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            sock.read_to_end(&mut buf).await.unwrap();
            buf
        });

        let transport = StreamSocketTransport::new(addr.to_string(), Duration::from_secs(2));
        transport.send(&[0x1B, 0x40, 0x0A]).await.unwrap();

        assert_eq!(server.await.unwrap(), vec![0x1B, 0x40, 0x0A]);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = StreamSocketTransport::new(addr.to_string(), Duration::from_secs(2));
        let err = transport.send(b"x").await.unwrap_err();
        assert!(err.is_retryable());
    }
}
