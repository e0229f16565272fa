//! Declarative template types.
//!
//! Templates are static configuration: they are built once (from the
//! registry or a JSON file) and never mutated while composing. Field names
//! accept the short forms used by layout files (`frames`, `w`, `h`).

use serde::{Deserialize, Serialize};

use crate::error::{DocketError, Result};
use crate::printer::PaperSize;
use crate::render::dither::DitherMethod;
use crate::render::font::Align;

/// Vertical space reserved under the footer QR code for the code line.
pub const FOOTER_PADDING: u32 = 40;

/// Horizontal inset for left/right aligned footer elements.
pub const FOOTER_INSET: u32 = 20;

/// Inset of caption text inside its box.
pub const CAPTION_INSET: u32 = 10;

/// Default border color (black).
const BORDER_COLOR: u8 = 0;

/// A complete output composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub paper: PaperSize,
    pub canvas: Canvas,
    #[serde(default)]
    pub margins: Margins,
    #[serde(default)]
    pub dither: DitherMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<TextBlock>,
    #[serde(alias = "frames")]
    pub slots: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<Region>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<Caption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<Footer>,
    /// Border width applied to slots that don't declare their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_border: Option<u32>,
}

/// Canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: CanvasHeight,
}

/// Either a fixed pixel height or `"auto"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HeightRepr", into = "HeightRepr")]
pub enum CanvasHeight {
    Auto,
    Fixed(u32),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum HeightRepr {
    Pixels(u32),
    Keyword(String),
}

impl TryFrom<HeightRepr> for CanvasHeight {
    type Error = String;

    fn try_from(repr: HeightRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            HeightRepr::Pixels(h) => Ok(CanvasHeight::Fixed(h)),
            HeightRepr::Keyword(k) if k.eq_ignore_ascii_case("auto") => Ok(CanvasHeight::Auto),
            HeightRepr::Keyword(k) => Err(format!("Invalid canvas height '{}'", k)),
        }
    }
}

impl From<CanvasHeight> for HeightRepr {
    fn from(h: CanvasHeight) -> Self {
        match h {
            CanvasHeight::Auto => HeightRepr::Keyword("auto".to_string()),
            CanvasHeight::Fixed(px) => HeightRepr::Pixels(px),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Margins {
    pub const fn uniform(px: u32) -> Self {
        Self {
            top: px,
            right: px,
            bottom: px,
            left: px,
        }
    }
}

/// How a photo is scaled into its slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Fill the rectangle, cropping the overflow (centered)
    #[default]
    Cover,
    /// Fit entirely inside the rectangle, letterboxing (centered)
    Contain,
    /// Stretch to the exact rectangle
    Fill,
}

/// A photo placement rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub x: u32,
    pub y: u32,
    #[serde(alias = "w")]
    pub width: u32,
    #[serde(alias = "h")]
    pub height: u32,
    #[serde(default)]
    pub fit: Fit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
}

impl Slot {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            fit: Fit::Cover,
            border: None,
        }
    }

    /// Bottom edge, widened to `u64`.
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }
}

/// Filled frame drawn behind a slot's photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Border {
    pub width: u32,
    #[serde(default = "default_border_color")]
    pub color: u8,
}

fn default_border_color() -> u8 {
    BORDER_COLOR
}

impl Border {
    pub const fn black(width: u32) -> Self {
        Self {
            width,
            color: BORDER_COLOR,
        }
    }
}

/// A plain rectangle (used for the logo).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    #[serde(alias = "w")]
    pub width: u32,
    #[serde(alias = "h")]
    pub height: u32,
}

/// Font family tag. Both families render with the bitmap face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Mono,
    Sans,
}

/// A single line of text with placeholder support.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub value: String,
    #[serde(default)]
    pub font: FontFamily,
    pub size: u32,
    #[serde(default)]
    pub align: Align,
}

impl TextBlock {
    pub fn new(value: impl Into<String>, size: u32, align: Align) -> Self {
        Self {
            value: value.into(),
            font: FontFamily::Mono,
            size,
            align,
        }
    }
}

/// Caption text placed inside its own box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
    pub x: u32,
    pub y: u32,
    #[serde(alias = "w")]
    pub width: u32,
    #[serde(alias = "h")]
    pub height: u32,
    #[serde(default)]
    pub font: FontFamily,
    pub size: u32,
    #[serde(default)]
    pub align: Align,
}

/// QR code placement. The symbol itself is rendered elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrSpec {
    pub size: u32,
    pub data: String,
    #[serde(default = "default_qr_align")]
    pub align: Align,
}

fn default_qr_align() -> Align {
    Align::Center
}

/// Bottom-of-canvas decoration: a QR region and a code line below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr: Option<QrSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<TextBlock>,
}

impl Footer {
    /// Height reserved at the bottom of the canvas.
    pub fn allotment(&self) -> u32 {
        match (&self.qr, &self.code) {
            (Some(qr), _) => qr.size.saturating_add(FOOTER_PADDING),
            (None, Some(code)) => code.size.saturating_add(FOOTER_PADDING),
            (None, None) => 0,
        }
    }
}

impl Template {
    /// Number of photos a session must capture for this template.
    pub fn photo_count(&self) -> usize {
        self.slots.len()
    }

    /// Border for a slot, falling back to the template-wide frame border.
    pub fn border_for(&self, slot: &Slot) -> Option<Border> {
        slot.border
            .or_else(|| self.frame_border.map(Border::black))
            .filter(|b| b.width > 0)
    }

    /// Final canvas height.
    ///
    /// Auto height is the lowest of the slot, logo and caption bottom edges,
    /// plus the footer allotment, plus the top and bottom margins.
    ///
    /// Saturates at `u32::MAX`; [`validate`](Self::validate) rejects such
    /// templates.
    pub fn resolve_height(&self) -> u32 {
        u32::try_from(self.height_u64()).unwrap_or(u32::MAX)
    }

    fn height_u64(&self) -> u64 {
        match self.canvas.height {
            CanvasHeight::Fixed(h) => h as u64,
            CanvasHeight::Auto => {
                let slots = self.slots.iter().map(Slot::bottom);
                let logo = self.logo.iter().map(|l| l.y as u64 + l.height as u64);
                let caption = self.caption.iter().map(|c| c.y as u64 + c.height as u64);
                let max_y = slots.chain(logo).chain(caption).max().unwrap_or(0);
                let footer = self.footer.as_ref().map_or(0, Footer::allotment) as u64;
                max_y + footer + self.margins.top as u64 + self.margins.bottom as u64
            }
        }
    }

    /// Check every region against the canvas.
    pub fn validate(&self) -> Result<()> {
        let width = self.canvas.width;
        if width == 0 {
            return Err(DocketError::InvalidLayout(format!(
                "template '{}' has zero canvas width",
                self.name
            )));
        }
        let height = u32::try_from(self.height_u64()).map_err(|_| {
            DocketError::InvalidLayout(format!(
                "template '{}' auto height exceeds {} rows",
                self.name,
                u32::MAX
            ))
        })?;

        for (i, slot) in self.slots.iter().enumerate() {
            check_rect(&format!("slot {}", i), slot.x, slot.y, slot.width, slot.height, width, height)?;
            if let Some(border) = self.border_for(slot) {
                if border.width as u64 * 2 >= slot.width.min(slot.height) as u64 {
                    return Err(DocketError::InvalidLayout(format!(
                        "slot {} border {} leaves no room for the photo",
                        i, border.width
                    )));
                }
            }
        }
        if let Some(logo) = &self.logo {
            check_rect("logo", logo.x, logo.y, logo.width, logo.height, width, height)?;
        }
        if let Some(header) = &self.header {
            check_text_size("header", header.size, height)?;
        }
        if let Some(caption) = &self.caption {
            check_rect("caption", caption.x, caption.y, caption.width, caption.height, width, height)?;
            check_text_size("caption", caption.size, height)?;
        }
        if let Some(footer) = &self.footer {
            if footer.allotment() > height {
                return Err(DocketError::InvalidLayout(format!(
                    "footer needs {}px but canvas is {}px tall",
                    footer.allotment(),
                    height
                )));
            }
            if let Some(code) = &footer.code {
                check_text_size("footer code", code.size, height)?;
            }
            if let Some(qr) = &footer.qr {
                let needed = match qr.align {
                    Align::Center => qr.size,
                    Align::Left | Align::Right => qr.size.saturating_add(FOOTER_INSET),
                };
                if qr.size == 0 || needed > width {
                    return Err(DocketError::InvalidLayout(format!(
                        "QR size {} does not fit canvas width {}",
                        qr.size, width
                    )));
                }
            }
        }
        Ok(())
    }
}

fn check_text_size(what: &str, size: u32, canvas_h: u32) -> Result<()> {
    if size > canvas_h {
        return Err(DocketError::InvalidLayout(format!(
            "{} text size {} is taller than the canvas ({}px)",
            what, size, canvas_h
        )));
    }
    Ok(())
}

fn check_rect(what: &str, x: u32, y: u32, w: u32, h: u32, canvas_w: u32, canvas_h: u32) -> Result<()> {
    if w == 0 || h == 0 {
        return Err(DocketError::InvalidLayout(format!("{} has zero size", what)));
    }
    if x as u64 + w as u64 > canvas_w as u64 || y as u64 + h as u64 > canvas_h as u64 {
        return Err(DocketError::InvalidLayout(format!(
            "{} ({}, {}, {}x{}) exceeds canvas {}x{}",
            what, x, y, w, h, canvas_w, canvas_h
        )));
    }
    Ok(())
}
