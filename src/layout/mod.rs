//! # Layout Engine
//!
//! Resolves a [`Template`] plus an ordered list of [`Frame`]s into a single
//! composite raster.
//!
//! ## Composition order
//!
//! 1. Resolve canvas height (fixed, or auto from the lowest region)
//! 2. Fill white
//! 3. Header text at the top margin
//! 4. Photo slots, in declared order (border, inset, fitted and dithered photo)
//! 5. Logo, then caption
//! 6. Footer: QR region and the code line below it
//!
//! The engine has no notion of preview versus print. A caller wanting both
//! composes twice with two templates over the same frames.
//!
//! Each photo is fitted to its slot first and dithered at slot resolution,
//! so the dot pattern is never resampled. Slots are prepared in parallel and
//! blitted sequentially.

pub mod fit;
pub mod placeholder;
pub mod registry;
pub mod template;

pub use placeholder::Placeholders;
pub use template::{
    Border, Canvas, CanvasHeight, Caption, Fit, FontFamily, Footer, Margins, QrSpec, Region, Slot,
    Template, TextBlock,
};

use image::{GrayImage, imageops::FilterType};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{DocketError, Result};
use crate::render::font::{self, Align};
use crate::render::raster::{self, Frame};
use template::{CAPTION_INSET, FOOTER_INSET};

/// Text size used inside logo and QR placeholders.
const PLACEHOLDER_TEXT: u32 = 16;

/// Everything that decorates a composite besides the photos.
#[derive(Debug, Clone, Default)]
pub struct Decorations<'a> {
    pub placeholders: Placeholders,
    /// Externally rendered QR symbol; a placeholder square is drawn without it.
    pub qr: Option<&'a GrayImage>,
    /// Booth logo; a placeholder block is drawn without it.
    pub logo: Option<&'a GrayImage>,
}

impl<'a> Decorations<'a> {
    pub fn new(placeholders: Placeholders) -> Self {
        Self {
            placeholders,
            qr: None,
            logo: None,
        }
    }

    pub fn with_qr(mut self, qr: &'a GrayImage) -> Self {
        self.qr = Some(qr);
        self
    }

    pub fn with_logo(mut self, logo: &'a GrayImage) -> Self {
        self.logo = Some(logo);
        self
    }
}

/// A photo fitted and dithered for one slot, ready to blit.
struct PreparedSlot {
    image: GrayImage,
    x: u32,
    y: u32,
}

/// Compose `frames` onto `template`.
///
/// Uses the first `template.photo_count()` frames; extra frames are ignored.
pub fn compose(template: &Template, frames: &[Frame], decorations: &Decorations) -> Result<GrayImage> {
    let required = template.photo_count();
    if frames.len() < required {
        return Err(DocketError::InsufficientFrames {
            required,
            supplied: frames.len(),
        });
    }
    template.validate()?;

    let width = template.canvas.width;
    let height = template.resolve_height();
    debug!(template = %template.name, width, height, photos = required, "Composing");

    let mut canvas = GrayImage::from_pixel(width, height, image::Luma([255]));
    let vars = &decorations.placeholders;

    if let Some(header) = &template.header {
        let anchor = match header.align {
            Align::Left => template.margins.left,
            Align::Center => width / 2,
            Align::Right => width.saturating_sub(template.margins.right),
        };
        font::draw_text(
            &mut canvas,
            &vars.substitute(&header.value),
            anchor as i64,
            template.margins.top as i64,
            header.size,
            header.align,
            0,
        );
    }

    // Borders are painted up front so the prepared photos land on their insets
    for slot in &template.slots {
        if let Some(border) = template.border_for(slot) {
            raster::fill_rect(&mut canvas, slot.x, slot.y, slot.width, slot.height, border.color);
            raster::fill_rect(
                &mut canvas,
                slot.x + border.width,
                slot.y + border.width,
                slot.width - border.width * 2,
                slot.height - border.width * 2,
                255,
            );
        }
    }

    let prepared: Vec<PreparedSlot> = template
        .slots
        .par_iter()
        .zip(frames.par_iter())
        .map(|(slot, frame)| prepare_slot(template, slot, frame))
        .collect();

    for p in &prepared {
        raster::blit(&mut canvas, &p.image, p.x, p.y);
    }

    if let Some(region) = &template.logo {
        draw_logo(&mut canvas, region, decorations.logo, template);
    }

    if let Some(caption) = &template.caption {
        let anchor = match caption.align {
            Align::Left => caption.x + CAPTION_INSET,
            Align::Center => caption.x + caption.width / 2,
            Align::Right => (caption.x + caption.width).saturating_sub(CAPTION_INSET),
        };
        font::draw_text(
            &mut canvas,
            &vars.substitute(&caption.text),
            anchor as i64,
            (caption.y + CAPTION_INSET) as i64,
            caption.size,
            caption.align,
            0,
        );
    }

    if let Some(footer) = &template.footer {
        draw_footer(&mut canvas, footer, decorations);
    }

    Ok(canvas)
}

fn prepare_slot(template: &Template, slot: &Slot, frame: &Frame) -> PreparedSlot {
    let inset = template.border_for(slot).map_or(0, |b| b.width);
    let (x, y) = (slot.x + inset, slot.y + inset);
    let (w, h) = (slot.width - inset * 2, slot.height - inset * 2);

    let mut fitted = fit::fit(&frame.image, w, h, slot.fit);
    template.dither.apply(&mut fitted.image);

    PreparedSlot {
        image: fitted.image,
        x: x + fitted.offset_x,
        y: y + fitted.offset_y,
    }
}

fn draw_logo(canvas: &mut GrayImage, region: &Region, logo: Option<&GrayImage>, template: &Template) {
    match logo {
        Some(img) => {
            let mut fitted = fit::fit(img, region.width, region.height, Fit::Contain);
            template.dither.apply(&mut fitted.image);
            raster::blit(
                canvas,
                &fitted.image,
                region.x + fitted.offset_x,
                region.y + fitted.offset_y,
            );
        }
        None => {
            raster::fill_rect(canvas, region.x, region.y, region.width, region.height, 0);
            draw_centered_label(canvas, "LOGO", region.x, region.y, region.width, region.height);
        }
    }
}

fn draw_centered_label(canvas: &mut GrayImage, label: &str, x: u32, y: u32, w: u32, h: u32) {
    let center_x = (x + w / 2) as i64;
    let top = (y + h / 2) as i64 - PLACEHOLDER_TEXT as i64 / 2;
    font::draw_text(canvas, label, center_x, top, PLACEHOLDER_TEXT, Align::Center, 255);
}

fn draw_footer(canvas: &mut GrayImage, footer: &Footer, decorations: &Decorations) {
    let width = canvas.width();
    let footer_top = canvas.height().saturating_sub(footer.allotment());

    let code_y = match &footer.qr {
        Some(qr) => {
            let qr_x = match qr.align {
                Align::Center => (width - qr.size) / 2,
                Align::Right => width - qr.size - FOOTER_INSET,
                Align::Left => FOOTER_INSET,
            };
            match decorations.qr {
                Some(symbol) => {
                    let mut scaled = if symbol.dimensions() == (qr.size, qr.size) {
                        symbol.clone()
                    } else {
                        image::imageops::resize(symbol, qr.size, qr.size, FilterType::Nearest)
                    };
                    raster::threshold(&mut scaled);
                    raster::blit(canvas, &scaled, qr_x, footer_top);
                }
                None => {
                    warn!(data = %decorations.placeholders.substitute(&qr.data), "No QR image supplied, drawing placeholder");
                    raster::fill_rect(canvas, qr_x, footer_top, qr.size, qr.size, 0);
                    draw_centered_label(canvas, "QR", qr_x, footer_top, qr.size, qr.size);
                }
            }
            footer_top + qr.size + FOOTER_INSET
        }
        None => footer_top + FOOTER_INSET,
    };

    if let Some(code) = &footer.code {
        let anchor = match code.align {
            Align::Left => FOOTER_INSET,
            Align::Center => width / 2,
            Align::Right => width.saturating_sub(FOOTER_INSET),
        };
        font::draw_text(
            canvas,
            &decorations.placeholders.substitute(&code.value),
            anchor as i64,
            code_y as i64,
            code.size,
            code.align,
            0,
        );
    }
}
