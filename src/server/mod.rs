//! # HTTP Print Relay
//!
//! Accepts raw ESC/POS streams over HTTP and forwards them to a locally
//! reachable printer through a [`PrinterClient`](crate::transport::PrinterClient).
//! Kiosks configured with an `http-relay` transport talk to this server.
//!
//! ## Endpoints
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | POST | `/api/printer/print` | `application/octet-stream` | `202 {"success": true, "job_id": ...}` once queued |
//! | POST | `/api/printer/test` | ignored | `200 {"success": true, "attempts": n}` after the connection test prints |
//! | GET | `/api/printer/status` | - | Queue status JSON |
//!
//! When a token is configured, print and test requests must carry it in the
//! `X-Kiosk-Token` header.
//!
//! Print jobs are acknowledged before delivery. Poll the status endpoint for
//! the queue state.
//!
//! ## Usage
//!
//! ```bash
//! docket relay --listen 0.0.0.0:8080 --token s3cret
//! ```

mod handlers;
mod state;

pub use state::{AppState, RelayConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{DocketError, Result};
use crate::transport::PrinterClient;
use crate::transport::relay::{PRINT_PATH, TEST_PATH};

/// Largest accepted print stream.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build the relay router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(PRINT_PATH, post(handlers::printer::print))
        .route(TEST_PATH, post(handlers::printer::test))
        .route("/api/printer/status", get(handlers::printer::status))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the relay.
///
/// ## Example
///
/// ```no_run
/// use std::time::Duration;
/// use std::sync::Arc;
/// use docket::server::{serve, RelayConfig};
/// use docket::transport::{PrinterClient, QueueOptions, StreamSocketTransport};
///
/// # async fn example() -> docket::error::Result<()> {
/// let transport = Arc::new(StreamSocketTransport::new("192.168.1.50:9100", Duration::from_secs(5)));
/// let client = PrinterClient::new(transport, QueueOptions::default());
/// let config = RelayConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     token: None,
/// };
///
/// serve(config, client).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: RelayConfig, client: PrinterClient) -> Result<()> {
    let app = router(Arc::new(AppState::new(client.clone(), config.token.clone())));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            DocketError::Transport(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    info!(
        listen = %config.listen_addr,
        transport = client.status().transport,
        token = config.token.is_some(),
        "Print relay listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| DocketError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}
