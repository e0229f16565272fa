//! # Booth Pipeline
//!
//! Glue between the stages: frames and a template go in, an ESC/POS job comes
//! out and is handed to a [`PrinterClient`].
//!
//! ```text
//! frames ──► layout::compose ──► composite (binary, template width)
//!                                   │
//!                                   ▼
//!              pack::prepare_gray_for_print ──► encoder::encode ──► PrinterClient
//! ```

use image::{GrayImage, Luma};
use qrcode::{EcLevel, QrCode};
use tracing::{debug, info};

use crate::config::KioskConfig;
use crate::error::{DocketError, Result};
use crate::layout::{self, Decorations, Placeholders, Template};
use crate::printer::PrinterProfile;
use crate::protocol::encoder;
use crate::render::dither::DitherMethod;
use crate::render::pack;
use crate::render::raster::Frame;
use crate::transport::{JobReport, PrinterClient};

/// Quiet zone around a rendered QR symbol, in modules.
const QR_QUIET_ZONE: usize = 2;

/// Render `data` as a square QR symbol of `size` pixels.
///
/// Modules are scaled with nearest neighbour so edges stay sharp. Any
/// leftover pixels from integer scaling are split evenly as white margin.
pub fn render_qr(data: &str, size: u32) -> Result<GrayImage> {
    let code = QrCode::with_error_correction_level(data, EcLevel::M)
        .map_err(|e| DocketError::Image(format!("QR code generation failed: {}", e)))?;

    let modules = code.width();
    let total = modules + QR_QUIET_ZONE * 2;
    let size = size as usize;
    let cell = (size / total).max(1);
    let offset = size.saturating_sub(total * cell) / 2;

    let mut img = GrayImage::from_pixel(size as u32, size as u32, Luma([255]));
    for qy in 0..modules {
        for qx in 0..modules {
            if code[(qx, qy)] != qrcode::Color::Dark {
                continue;
            }
            let left = offset + (qx + QR_QUIET_ZONE) * cell;
            let top = offset + (qy + QR_QUIET_ZONE) * cell;
            for py in top..(top + cell).min(size) {
                for px in left..(left + cell).min(size) {
                    img.put_pixel(px as u32, py as u32, Luma([0]));
                }
            }
        }
    }

    Ok(img)
}

/// Encode a finished composite for one printer.
///
/// A composite already at the printer's width is packed as-is. Otherwise it
/// is rescaled and re-dithered with `dither`.
pub fn encode_composite(
    composite: &GrayImage,
    profile: &PrinterProfile,
    dither: DitherMethod,
) -> Result<Vec<u8>> {
    let width_dots = profile.width_dots();
    let redither = (composite.width() != width_dots as u32).then_some(dither);
    let bitmap = pack::prepare_gray_for_print(composite, width_dots as u32, redither);
    debug!(
        width = bitmap.width,
        height = bitmap.height,
        rescaled = redither.is_some(),
        "Packed composite"
    );
    encoder::encode(&bitmap, profile.density, width_dots)
}

/// One composed session, ready to print.
#[derive(Debug, Clone)]
pub struct Session<'a> {
    pub template: &'a Template,
    pub placeholders: Placeholders,
    pub logo: Option<&'a GrayImage>,
}

impl<'a> Session<'a> {
    pub fn new(template: &'a Template, placeholders: Placeholders) -> Self {
        Self {
            template,
            placeholders,
            logo: None,
        }
    }

    pub fn from_config(config: &KioskConfig, template: &'a Template, code: &str) -> Self {
        Self::new(template, config.placeholders(code))
    }

    pub fn with_logo(mut self, logo: &'a GrayImage) -> Self {
        self.logo = Some(logo);
        self
    }

    /// Compose the session's frames, rendering the footer QR if the template has one.
    ///
    /// An empty QR payload leaves the placeholder square in place.
    pub fn compose(&self, frames: &[Frame]) -> Result<GrayImage> {
        let qr = match self.template.footer.as_ref().and_then(|f| f.qr.as_ref()) {
            Some(spec) => {
                let data = self.placeholders.substitute(&spec.data);
                if data.is_empty() {
                    None
                } else {
                    Some(render_qr(&data, spec.size)?)
                }
            }
            None => None,
        };

        let mut decorations = Decorations::new(self.placeholders.clone());
        if let Some(qr) = qr.as_ref() {
            decorations = decorations.with_qr(qr);
        }
        if let Some(logo) = self.logo {
            decorations = decorations.with_logo(logo);
        }

        layout::compose(self.template, frames, &decorations)
    }

    /// Compose and encode for `profile`.
    pub fn encode(&self, frames: &[Frame], profile: &PrinterProfile) -> Result<Vec<u8>> {
        let composite = self.compose(frames)?;
        encode_composite(&composite, profile, self.template.dither)
    }

    /// Compose, encode and print, waiting for the job outcome.
    pub async fn print(
        &self,
        frames: &[Frame],
        profile: &PrinterProfile,
        client: &PrinterClient,
    ) -> Result<JobReport> {
        let payload = self.encode(frames, profile)?;
        info!(
            template = %self.template.name,
            code = %self.placeholders.code,
            bytes = payload.len(),
            "Submitting session"
        );
        client.print(payload).await
    }
}
