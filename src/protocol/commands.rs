//! # ESC/POS Control Commands
//!
//! Fixed-format commands used around a bit-image print job.
//!
//! ## Escape Sequence Structure
//!
//! - Single byte: `LF`
//! - Two bytes: `ESC @`
//! - Multi-byte with parameters: `ESC d n`, `GS W hi lo`, `GS ( G pL pH fn m`
//!
//! ## Byte Order
//!
//! Bit-image headers use little-endian 16-bit values. The paper width
//! command is the exception: it is emitted high byte first.

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
pub const GS: u8 = 0x1D;

/// LF (Line Feed) - Print the line buffer and advance one line
pub const LF: u8 = 0x0A;

/// Lowest accepted print density.
pub const DENSITY_MIN: u8 = 1;

/// Highest accepted print density.
pub const DENSITY_MAX: u8 = 15;

// ============================================================================
// INITIALIZATION COMMANDS
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Clears the print buffer and resets formatting to power-on defaults.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
/// | Decimal | 27 64 |
///
/// ## Example
///
/// ```
/// use docket::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Set Print Density (GS ( G)
///
/// Selects the heating level of the print head.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS ( G pL pH fn m |
/// | Hex     | 1D 28 47 02 00 10 m |
///
/// ## Parameters
///
/// - `density`: 1 (lightest) to 15 (darkest). Values outside the range are
///   clamped.
///
/// ## Example
///
/// ```
/// use docket::protocol::commands;
///
/// assert_eq!(
///     commands::set_density(8),
///     vec![0x1D, 0x28, 0x47, 0x02, 0x00, 0x10, 0x08]
/// );
/// ```
#[inline]
pub fn set_density(density: u8) -> Vec<u8> {
    vec![
        GS,
        b'(',
        b'G',
        0x02,
        0x00,
        0x10,
        density.clamp(DENSITY_MIN, DENSITY_MAX),
    ]
}

/// # Set Printable Width (GS W)
///
/// Declares the printable area width in dots.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS W hi lo |
/// | Hex     | 1D 57 hi lo |
///
/// The width is sent **high byte first**.
///
/// ## Example
///
/// ```
/// use docket::protocol::commands;
///
/// // 384 dots = 0x0180
/// assert_eq!(commands::paper_width(384), vec![0x1D, 0x57, 0x01, 0x80]);
/// ```
#[inline]
pub fn paper_width(dots: u16) -> Vec<u8> {
    let [hi, lo] = dots.to_be_bytes();
    vec![GS, b'W', hi, lo]
}

// ============================================================================
// PAPER CONTROL COMMANDS
// ============================================================================

/// # Line Feed (LF)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 0A    |
#[inline]
pub fn line_feed() -> Vec<u8> {
    vec![LF]
}

/// # Print and Feed n Lines (ESC d n)
///
/// ## Protocol Details
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC d n  |
/// | Hex     | 1B 64 n  |
///
/// ## Example
///
/// ```
/// use docket::protocol::commands;
///
/// assert_eq!(commands::feed_lines(2), vec![0x1B, 0x64, 0x02]);
/// ```
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}

/// # Cut Paper (GS V 0)
///
/// Full cut on printers with a cutter; ignored by printers without one.
///
/// ## Protocol Details
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | GS V 0   |
/// | Hex     | 1D 56 00 |
#[inline]
pub fn cut() -> Vec<u8> {
    vec![GS, b'V', 0]
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Encode a u16 value as little-endian bytes [low, high]
///
/// ## Example
///
/// ```
/// use docket::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// assert_eq!(u16_le(384), [0x80, 0x01]);
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// TESTS
// ============================================================================
