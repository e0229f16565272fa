//! # ESC/POS Bit-Image Bands
//!
//! Tall images are printed as a sequence of 8-dot bands, one `ESC *`
//! command per band.
//!
//! ## Coordinate System
//!
//! ```text
//! (0,0) ──────────────────────► X (horizontal, 384 or 576 dots)
//!   │
//!   │   ████████  ← Each dot is ~0.125mm (203 DPI)
//!   │   ████████
//!   ▼
//!   Y (vertical, paper feed direction)
//! ```
//!
//! ## Band Data Layout
//!
//! Unlike the row-major packed bitmap, band data is column-major: one byte
//! per dot column, bit 7 (MSB) being the top row of the band.
//!
//! ```text
//! Column:   0     1     2   ...  width-1
//!         ┌─────┬─────┬─────┬───┬─────┐
//! bit 7   │ r0  │ r0  │ r0  │...│ r0  │
//! bit 6   │ r1  │ r1  │ r1  │...│ r1  │
//!  ...    │     │     │     │   │     │
//! bit 0   │ r7  │ r7  │ r7  │...│ r7  │
//!         └─────┴─────┴─────┴───┴─────┘
//! ```
//!
//! The last band of an image whose height is not a multiple of 8 is padded
//! with white rows.

use super::commands::{ESC, u16_le};

/// Dots per band (`ESC *` mode 0 is an 8-dot single-density image).
pub const BAND_HEIGHT: usize = 8;

/// `ESC *` mode byte: 8-dot single density.
pub const MODE_8_DOT: u8 = 0x00;

/// # Select Bit-Image Mode (ESC * m nL nH d1...dk)
///
/// Prints one 8-dot band.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC * m nL nH d1...dk |
/// | Hex     | 1B 2A m nL nH d1...dk |
/// | Decimal | 27 42 m nL nH d1...dk |
///
/// ## Parameters
///
/// - `m`: 0 (8-dot single density)
/// - `nL, nH`: Width in dots, little-endian
/// - `d1...dk`: One byte per column, k = width
///
/// ## Example
///
/// ```
/// use docket::protocol::graphics;
///
/// let cmd = graphics::bit_image_band(16, &[0xFF; 16]);
/// assert_eq!(&cmd[..5], &[0x1B, 0x2A, 0x00, 0x10, 0x00]);
/// assert_eq!(cmd.len(), 5 + 16);
/// ```
pub fn bit_image_band(width_dots: u16, columns: &[u8]) -> Vec<u8> {
    debug_assert!(
        columns.len() == width_dots as usize,
        "Band data must be one byte per column. Expected {}, got {}",
        width_dots,
        columns.len()
    );

    let [nl, nh] = u16_le(width_dots);
    let mut cmd = Vec::with_capacity(5 + columns.len());
    cmd.push(ESC);
    cmd.push(b'*');
    cmd.push(MODE_8_DOT);
    cmd.push(nl);
    cmd.push(nh);
    cmd.extend_from_slice(columns);
    cmd
}

/// Number of bands needed for `height` rows.
#[inline]
pub fn band_count(height: usize) -> usize {
    height.div_ceil(BAND_HEIGHT)
}

/// Transpose rows `band * 8 .. band * 8 + 8` of a row-major packed bitmap
/// into column bytes.
///
/// `data` must hold `width.div_ceil(8) * height` bytes.
pub fn band_columns(data: &[u8], width: usize, height: usize, band: usize) -> Vec<u8> {
    let bytes_per_row = width.div_ceil(8);
    let top = band * BAND_HEIGHT;
    let mut columns = vec![0u8; width];

    for dy in 0..BAND_HEIGHT {
        let y = top + dy;
        if y >= height {
            break;
        }
        let row = &data[y * bytes_per_row..(y + 1) * bytes_per_row];
        for (x, column) in columns.iter_mut().enumerate() {
            if row[x / 8] & (0x80 >> (x % 8)) != 0 {
                *column |= 0x80 >> dy;
            }
        }
    }

    columns
}

// ============================================================================
// TESTS
// ============================================================================
