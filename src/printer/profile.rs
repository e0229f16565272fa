//! # Printer Profiles
//!
//! Connection parameters supplied with each print request.
//!
//! ## Transport Kinds
//!
//! | Kind | Fields | Carrier |
//! |------|--------|---------|
//! | `stream-socket` | host, port | Raw TCP (port 9100 printers) |
//! | `http-relay` | url, token | POST to a relay's `/api/printer/print` |
//! | `device-link` | device, mtu, write_delay_ms | Serial-like device node (e.g. `/dev/rfcomm0`) |
//!
//! ## JSON Form
//!
//! ```json
//! {
//!   "name": "Counter printer",
//!   "transport": { "kind": "stream-socket", "host": "192.168.1.50", "port": 9100 },
//!   "paper": "58mm",
//!   "width_dots": 384,
//!   "dpi": 203,
//!   "density": 8
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{DocketError, Result};
use crate::protocol::commands::{DENSITY_MAX, DENSITY_MIN};

/// Default raw-printing port.
pub const DEFAULT_PORT: u16 = 9100;

/// Default device-link write size in bytes.
pub const DEFAULT_MTU: usize = 512;

/// Default pause between device-link writes.
pub const DEFAULT_WRITE_DELAY_MS: u64 = 2;

/// Default print density.
pub const DEFAULT_DENSITY: u8 = 8;

/// Thermal paper roll width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    #[serde(rename = "58mm")]
    Mm58,
    #[serde(rename = "80mm")]
    Mm80,
}

impl PaperSize {
    /// Printable width at 203 DPI.
    pub fn width_dots(self) -> u16 {
        match self {
            PaperSize::Mm58 => 384,
            PaperSize::Mm80 => 576,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PaperSize::Mm58 => "58mm",
            PaperSize::Mm80 => "80mm",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "58mm" | "58" => Some(PaperSize::Mm58),
            "80mm" | "80" => Some(PaperSize::Mm80),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaperSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn default_mtu() -> usize {
    DEFAULT_MTU
}

fn default_write_delay_ms() -> u64 {
    DEFAULT_WRITE_DELAY_MS
}

/// How bytes reach the printer. Each kind carries only its own fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TransportKind {
    StreamSocket {
        host: String,
        #[serde(default = "default_port")]
        port: u16,
    },
    HttpRelay {
        /// Relay base URL, e.g. `http://10.0.0.2:8080`
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    DeviceLink {
        /// Device node path, or a Bluetooth MAC bound via rfcomm
        device: String,
        #[serde(default = "default_mtu")]
        mtu: usize,
        #[serde(default = "default_write_delay_ms")]
        write_delay_ms: u64,
    },
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl TransportKind {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            TransportKind::StreamSocket { .. } => "stream-socket",
            TransportKind::HttpRelay { .. } => "http-relay",
            TransportKind::DeviceLink { .. } => "device-link",
        }
    }

    /// Address or identifier of the far end.
    pub fn address(&self) -> String {
        match self {
            TransportKind::StreamSocket { host, port } => format!("{}:{}", host, port),
            TransportKind::HttpRelay { url, .. } => url.clone(),
            TransportKind::DeviceLink { device, .. } => device.clone(),
        }
    }
}

impl Default for TransportKind {
    fn default() -> Self {
        TransportKind::StreamSocket {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Everything needed to encode for and reach one printer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterProfile {
    pub name: String,
    #[serde(default)]
    pub transport: TransportKind,
    #[serde(default)]
    pub paper: PaperSize,
    /// Printable width in dots. Defaults to the paper's width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_dots: Option<u16>,
    #[serde(default = "default_dpi")]
    pub dpi: u16,
    #[serde(default = "default_density")]
    pub density: u8,
}

fn default_dpi() -> u16 {
    203
}

fn default_density() -> u8 {
    DEFAULT_DENSITY
}

impl Default for PrinterProfile {
    fn default() -> Self {
        Self {
            name: "Generic 58mm".to_string(),
            transport: TransportKind::default(),
            paper: PaperSize::Mm58,
            width_dots: None,
            dpi: default_dpi(),
            density: DEFAULT_DENSITY,
        }
    }
}

impl PrinterProfile {
    /// Effective printable width in dots.
    pub fn width_dots(&self) -> u16 {
        self.width_dots.unwrap_or_else(|| self.paper.width_dots())
    }

    /// Dots per millimeter at this profile's resolution.
    #[inline]
    pub fn dots_per_mm(&self) -> f32 {
        self.dpi as f32 / 25.4
    }

    /// Reject values the printer cannot accept.
    pub fn validate(&self) -> Result<()> {
        if !(DENSITY_MIN..=DENSITY_MAX).contains(&self.density) {
            return Err(DocketError::Config(format!(
                "density {} outside {}..={}",
                self.density, DENSITY_MIN, DENSITY_MAX
            )));
        }
        if self.width_dots() == 0 || self.dpi == 0 {
            return Err(DocketError::Config(
                "printer width and dpi must be non-zero".to_string(),
            ));
        }
        if let TransportKind::DeviceLink { mtu: 0, .. } = self.transport {
            return Err(DocketError::Config("device-link mtu must be non-zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_widths() {
        assert_eq!(PaperSize::Mm58.width_dots(), 384);
        assert_eq!(PaperSize::Mm80.width_dots(), 576);
        assert_eq!(PaperSize::parse("80MM"), Some(PaperSize::Mm80));
        assert_eq!(PaperSize::parse("A4"), None);
        assert_eq!(serde_json::to_string(&PaperSize::Mm58).unwrap(), "\"58mm\"");
    }

    #[test]
    fn test_profile_json() {
        let json = r#"{
            "name": "Counter",
            "transport": { "kind": "http-relay", "url": "http://10.0.0.2:8080", "token": "s3cret" },
            "paper": "80mm",
            "density": 12
        }"#;
        let p: PrinterProfile = serde_json::from_str(json).unwrap();
        assert_eq!(p.width_dots(), 576);
        assert_eq!(p.dpi, 203);
        assert_eq!(p.density, 12);
        assert_eq!(
            p.transport,
            TransportKind::HttpRelay {
                url: "http://10.0.0.2:8080".into(),
                token: Some("s3cret".into())
            }
        );
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_device_link_defaults() {
        let t: TransportKind =
            serde_json::from_str(r#"{ "kind": "device-link", "device": "/dev/rfcomm0" }"#).unwrap();
        assert_eq!(
            t,
            TransportKind::DeviceLink {
                device: "/dev/rfcomm0".into(),
                mtu: DEFAULT_MTU,
                write_delay_ms: DEFAULT_WRITE_DELAY_MS
            }
        );
        assert_eq!(t.label(), "device-link");
    }

    #[test]
    fn test_socket_default_port() {
        let t: TransportKind =
            serde_json::from_str(r#"{ "kind": "stream-socket", "host": "printer.local" }"#).unwrap();
        assert_eq!(t.address(), "printer.local:9100");
    }

    #[test]
    fn test_validate_density() {
        let mut p = PrinterProfile::default();
        assert!(p.validate().is_ok());
        p.density = 0;
        assert!(matches!(p.validate(), Err(DocketError::Config(_))));
        p.density = 16;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_width_override() {
        let mut p = PrinterProfile::default();
        assert_eq!(p.width_dots(), 384);
        p.width_dots = Some(360);
        assert_eq!(p.width_dots(), 360);
        assert!((p.dots_per_mm() - 8.0).abs() < 0.1);
    }
}
