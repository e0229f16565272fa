//! # Printer Presets
//!
//! Hardware specifications for known thermal printers.
//!
//! | Model | Paper | Width (dots) | Resolution |
//! |-------|-------|--------------|------------|
//! | EPPOS EPX-58B | 58mm | 384 | 203 DPI |
//! | XPRINTER XP-P300 | 58mm | 384 | 203 DPI |
//! | HOIN HOP H58 | 58mm | 384 | 203 DPI |
//! | BellaV EP-58A | 58mm | 384 | 203 DPI |
//! | Generic 58mm | 58mm | 384 | 203 DPI |
//! | Generic 80mm | 80mm | 576 | 203 DPI |
//!
//! ## Usage
//!
//! ```
//! use docket::printer::PrinterModel;
//!
//! let model = PrinterModel::detect("XP-P300_A1B2");
//! assert_eq!(model.name, "XPRINTER XP-P300");
//! assert_eq!(model.width_dots, 384);
//! ```

use super::profile::{DEFAULT_DENSITY, PaperSize, PrinterProfile, TransportKind};

/// # Printer Model
///
/// ## Calculations
///
/// ```text
/// dots_per_mm = dpi / 25.4
/// width_mm = width_dots / dots_per_mm
///
/// For a 58mm printer:
///   dots_per_mm = 203 / 25.4 ≈ 8
///   width_mm = 384 / 8 = 48mm printable
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterModel {
    /// Model name
    pub name: &'static str,

    /// Paper roll width
    pub paper: PaperSize,

    /// Maximum print width in dots
    pub width_dots: u16,

    /// Resolution in dots per inch
    pub dpi: u16,
}

impl PrinterModel {
    pub const EPPOS_EPX_58B: Self = Self::narrow("EPPOS EPX-58B");
    pub const XPRINTER_XP_P300: Self = Self::narrow("XPRINTER XP-P300");
    pub const HOIN_HOP_H58: Self = Self::narrow("HOIN HOP H58");
    pub const BELLAV_EP_58A: Self = Self::narrow("BellaV EP-58A");
    pub const GENERIC_58MM: Self = Self::narrow("Generic 58mm");

    /// # Generic 80mm
    ///
    /// ```text
    /// ├── 4mm ──┼────── 72mm printable ──────┼── 4mm ──┤
    /// │ margin  │         576 dots           │ margin  │
    /// ```
    pub const GENERIC_80MM: Self = Self {
        name: "Generic 80mm",
        paper: PaperSize::Mm80,
        width_dots: 576,
        dpi: 203,
    };

    /// All presets, most specific first.
    pub const ALL: [Self; 6] = [
        Self::EPPOS_EPX_58B,
        Self::XPRINTER_XP_P300,
        Self::HOIN_HOP_H58,
        Self::BELLAV_EP_58A,
        Self::GENERIC_58MM,
        Self::GENERIC_80MM,
    ];

    const fn narrow(name: &'static str) -> Self {
        Self {
            name,
            paper: PaperSize::Mm58,
            width_dots: 384,
            dpi: 203,
        }
    }

    /// Look up a preset by its exact name (case-insensitive).
    pub fn by_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Guess the model from an advertised device name.
    ///
    /// Unrecognized names containing "80" map to the generic 80mm preset;
    /// everything else falls back to generic 58mm.
    pub fn detect(device_name: &str) -> Self {
        let n = device_name.to_lowercase();
        if n.contains("eppos") || n.contains("epx") {
            Self::EPPOS_EPX_58B
        } else if n.contains("xprinter") || n.contains("xp-p300") {
            Self::XPRINTER_XP_P300
        } else if n.contains("hoin") || n.contains("h58") {
            Self::HOIN_HOP_H58
        } else if n.contains("bellav") || n.contains("58a") {
            Self::BELLAV_EP_58A
        } else if n.contains("80") {
            Self::GENERIC_80MM
        } else {
            Self::GENERIC_58MM
        }
    }

    /// Calculate dots per millimeter
    #[inline]
    pub fn dots_per_mm(&self) -> f32 {
        self.dpi as f32 / 25.4
    }

    /// Calculate print width in millimeters
    #[inline]
    pub fn width_mm(&self) -> f32 {
        self.width_dots as f32 / self.dots_per_mm()
    }

    /// A profile for this model reached over `transport`.
    pub fn profile(&self, transport: TransportKind) -> PrinterProfile {
        PrinterProfile {
            name: self.name.to_string(),
            transport,
            paper: self.paper,
            width_dots: Some(self.width_dots),
            dpi: self.dpi,
            density: DEFAULT_DENSITY,
        }
    }
}

impl Default for PrinterModel {
    fn default() -> Self {
        Self::GENERIC_58MM
    }
}

// ============================================================================
// TESTS
// ============================================================================
