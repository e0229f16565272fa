//! # Kiosk Configuration
//!
//! A JSON file describing one booth. Every field is optional.
//!
//! ```json
//! {
//!   "booth_name": "Pixel Booth",
//!   "template": "Strip 58 – Classic",
//!   "download_base_url": "https://booth.example",
//!   "printer": {
//!     "name": "Counter printer",
//!     "transport": { "kind": "stream-socket", "host": "192.168.1.50", "port": 9100 },
//!     "paper": "58mm",
//!     "density": 8
//!   },
//!   "queue": { "retry_delay_ms": 1000, "send_timeout_ms": 30000 }
//! }
//! ```
//!
//! `layout_file` points at a custom template JSON and takes precedence over
//! `template`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DocketError, Result};
use crate::layout::{Placeholders, Template, registry};
use crate::printer::PrinterProfile;
use crate::transport::QueueOptions;

pub const DEFAULT_BOOTH_NAME: &str = "Pixel Booth";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    pub booth_name: String,
    /// Registry template name
    pub template: String,
    /// Custom template JSON, overriding `template`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_file: Option<PathBuf>,
    /// Base of the per-session download link (`{base}/d/{code}`)
    pub download_base_url: String,
    /// Logo image drawn into templates with a logo region
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<PathBuf>,
    pub printer: PrinterProfile,
    pub queue: QueueOptions,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            booth_name: DEFAULT_BOOTH_NAME.to_string(),
            template: registry::default_template().name.clone(),
            layout_file: None,
            download_base_url: "http://localhost:3000".to_string(),
            logo: None,
            printer: PrinterProfile::default(),
            queue: QueueOptions::default(),
        }
    }
}

impl KioskConfig {
    /// Read a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            DocketError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&text)?;
        debug!(path = %path.display(), template = %config.template, "Loaded kiosk config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| DocketError::Config(format!("Invalid config: {}", e)))?;
        config.printer.validate()?;
        Ok(config)
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// The template this booth composes with.
    pub fn resolve_template(&self) -> Result<Template> {
        match &self.layout_file {
            Some(path) => load_template(path),
            None => registry::by_name(&self.template).cloned().ok_or_else(|| {
                DocketError::Config(format!("Unknown template '{}'", self.template))
            }),
        }
    }

    pub fn download_url(&self, code: &str) -> String {
        format!("{}/d/{}", self.download_base_url.trim_end_matches('/'), code)
    }

    /// Placeholder values for one session.
    pub fn placeholders(&self, code: &str) -> Placeholders {
        Placeholders::new(&self.booth_name, code).with_download_url(self.download_url(code))
    }
}

/// Read and validate a template JSON file.
pub fn load_template(path: impl AsRef<Path>) -> Result<Template> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| DocketError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    let template: Template = serde_json::from_str(&text)
        .map_err(|e| DocketError::Config(format!("Invalid template {}: {}", path.display(), e)))?;
    template.validate()?;
    Ok(template)
}
