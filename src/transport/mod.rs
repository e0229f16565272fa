//! # Printer Transport Layer
//!
//! Backends that carry an encoded print stream to a printer, plus the
//! retrying queue that drives them.
//!
//! ## Available Transports
//!
//! - [`socket`]: Raw TCP stream (port 9100 style network printers)
//! - [`relay`]: HTTP POST to a print relay
//! - [`device`]: Chunked writes to a serial-like device node (Bluetooth rfcomm)
//!
//! All three implement [`Transport`]; [`queue::PrinterClient`] owns one and
//! serializes jobs through it.

pub mod device;
pub mod queue;
pub mod relay;
pub mod socket;

pub use device::DeviceLinkTransport;
pub use queue::{ClientState, JobHandle, JobReport, PrintJob, PrinterClient, QueueOptions, QueueStatus};
pub use relay::HttpRelayTransport;
pub use socket::StreamSocketTransport;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::printer::{PrinterProfile, TransportKind};

/// One way of delivering bytes to a printer.
///
/// `send` either hands over the whole payload or fails with
/// [`DocketError::Transport`](crate::error::DocketError::Transport).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short label used in logs.
    fn kind(&self) -> &'static str;

    async fn send(&self, payload: &[u8]) -> Result<()>;
}

/// Build the transport a profile asks for.
pub fn from_profile(profile: &PrinterProfile, timeout: Duration) -> Result<Arc<dyn Transport>> {
    let transport: Arc<dyn Transport> = match &profile.transport {
        TransportKind::StreamSocket { host, port } => {
            Arc::new(StreamSocketTransport::new(format!("{}:{}", host, port), timeout))
        }
        TransportKind::HttpRelay { url, token } => {
            Arc::new(HttpRelayTransport::new(url, token.clone(), timeout)?)
        }
        TransportKind::DeviceLink {
            device,
            mtu,
            write_delay_ms,
        } => Arc::new(DeviceLinkTransport::new(
            device::resolve_device(device)?,
            *mtu,
            Duration::from_millis(*write_delay_ms),
        )),
    };
    Ok(transport)
}
