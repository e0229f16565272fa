//! # HTTP Relay Transport
//!
//! POSTs the raw print stream to a relay server which owns the physical
//! printer connection.
//!
//! | Item | Value |
//! |------|-------|
//! | Method | `POST` |
//! | Path | `/api/printer/print` |
//! | Body | Raw bytes, `application/octet-stream` |
//! | Auth | `X-Kiosk-Token` header, when configured |
//! | Success | Any 2xx status |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use super::Transport;
use crate::error::{DocketError, Result};

/// Path the relay accepts print jobs on.
pub const PRINT_PATH: &str = "/api/printer/print";

/// Path the relay accepts connection tests on.
pub const TEST_PATH: &str = "/api/printer/test";

/// Header carrying the shared kiosk token.
pub const TOKEN_HEADER: &str = "X-Kiosk-Token";

pub struct HttpRelayTransport {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpRelayTransport {
    /// `base_url` is the relay root, e.g. `http://10.0.0.2:8080`.
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("docket/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| DocketError::Transport(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), PRINT_PATH),
            token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpRelayTransport {
    fn kind(&self) -> &'static str {
        "http-relay"
    }

    async fn send(&self, payload: &[u8]) -> Result<()> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(payload.to_vec());
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DocketError::Transport(format!("Relay request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocketError::Transport(format!(
                "Relay at {} returned {}",
                self.endpoint, status
            )));
        }

        debug!(endpoint = %self.endpoint, bytes = payload.len(), %status, "Relay accepted job");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Bytes, http::HeaderMap, http::StatusCode, routing::post};
    use std::sync::{Arc, Mutex};

    async fn spawn_relay(status: StatusCode) -> (String, Arc<Mutex<Vec<(Option<String>, Vec<u8>)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let app = Router::new().route(
            PRINT_PATH,
            post(move |headers: HeaderMap, body: Bytes| {
                let log = log.clone();
                async move {
                    let token = headers
                        .get(TOKEN_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    log.lock().unwrap().push((token, body.to_vec()));
                    status
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{}/", addr), seen)
    }

    #[test]
    fn test_endpoint_joins_path() {
        let t = HttpRelayTransport::new("http://relay:8080/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(t.endpoint(), "http://relay:8080/api/printer/print");
    }

    #[tokio::test]
    async fn test_posts_body_and_token() {
        let (url, seen) = spawn_relay(StatusCode::OK).await;
        let t = HttpRelayTransport::new(&url, Some("s3cret".into()), Duration::from_secs(2)).unwrap();
        t.send(&[1, 2, 3]).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], (Some("s3cret".to_string()), vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_accepts_any_2xx() {
        let (url, _) = spawn_relay(StatusCode::ACCEPTED).await;
        let t = HttpRelayTransport::new(&url, None, Duration::from_secs(2)).unwrap();
        assert!(t.send(b"x").await.is_ok());
    }

    #[tokio::test]
    async fn test_non_2xx_is_transport_error() {
        let (url, _) = spawn_relay(StatusCode::SERVICE_UNAVAILABLE).await;
        let t = HttpRelayTransport::new(&url, None, Duration::from_secs(2)).unwrap();
        let err = t.send(b"x").await.unwrap_err();
        assert!(matches!(err, DocketError::Transport(ref m) if m.contains("503")));
    }
}
