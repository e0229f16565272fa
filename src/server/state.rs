//! Relay state and configuration.

use crate::transport::PrinterClient;

/// Relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Shared secret expected in `X-Kiosk-Token`; `None` disables the check
    pub token: Option<String>,
}

/// Application state shared across handlers.
pub struct AppState {
    pub client: PrinterClient,
    pub token: Option<String>,
}

impl AppState {
    pub fn new(client: PrinterClient, token: Option<String>) -> Self {
        Self { client, token }
    }

    /// Whether a request carrying `presented` may print.
    pub fn authorized(&self, presented: Option<&str>) -> bool {
        match &self.token {
            None => true,
            Some(expected) => presented == Some(expected.as_str()),
        }
    }
}
