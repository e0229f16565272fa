//! # ESC/POS Raster Encoder
//!
//! Wraps a packed monochrome bitmap into the command stream a receipt
//! printer consumes. The encoder is a pure function: no I/O, no state.
//!
//! ## Command Sequence
//!
//! | Step | Bytes | Meaning |
//! |------|-------|---------|
//! | Init | `1B 40` | Reset printer state |
//! | Density | `1D 28 47 02 00 10 <density>` | Print density 1–15 |
//! | Paper width | `1D 57 <hi> <lo>` | Printable width in dots |
//! | Bit image | `1B 2A 00 <wLo> <wHi> <columns…>` | One per 8-row band |
//! | Line feed | `0A` | Advance paper |
//! | Cut | `1D 56 00` | Cut (no-op without a cutter) |
//!
//! ## Example
//!
//! ```
//! use docket::protocol::encoder;
//!
//! let bitmap = vec![0xFF; 2 * 8]; // 16x8, all black
//! let bytes = encoder::encode_raster(&bitmap, 16, 8, 8, 384).unwrap();
//! assert_eq!(&bytes[..2], &[0x1B, 0x40]);
//! assert_eq!(&bytes[bytes.len() - 3..], &[0x1D, 0x56, 0x00]);
//! ```

use tracing::{debug, warn};

use super::commands::{self, DENSITY_MAX, DENSITY_MIN};
use super::graphics::{self, BAND_HEIGHT};
use crate::error::{DocketError, Result};
use crate::render::pack::PackedBitmap;

/// Encode a row-major, MSB-first packed bitmap.
///
/// `bitmap` must hold `width.div_ceil(8) * height` bytes. Widths above
/// 65535 dots cannot be expressed in the band header and are rejected.
pub fn encode_raster(
    bitmap: &[u8],
    width: usize,
    height: usize,
    density: u8,
    paper_width_dots: u16,
) -> Result<Vec<u8>> {
    let width_dots =
        u16::try_from(width).map_err(|_| DocketError::UnsupportedImageWidth(width))?;

    let expected = width.div_ceil(8) * height;
    if bitmap.len() != expected {
        return Err(DocketError::MalformedBitmap {
            expected,
            actual: bitmap.len(),
        });
    }

    if !(DENSITY_MIN..=DENSITY_MAX).contains(&density) {
        warn!(
            density,
            min = DENSITY_MIN,
            max = DENSITY_MAX,
            "Density out of range, clamping"
        );
    }
    if width_dots > paper_width_dots {
        warn!(
            width,
            paper_width_dots, "Image is wider than the paper, printer will clip"
        );
    }

    let bands = graphics::band_count(height);
    let mut out = Vec::with_capacity(7 + 4 + 4 + bands * (5 + width) + 1 + 3);

    out.extend(commands::init());
    out.extend(commands::set_density(density));
    out.extend(commands::paper_width(paper_width_dots));

    for band in 0..bands {
        let columns = graphics::band_columns(bitmap, width, height, band);
        out.extend(graphics::bit_image_band(width_dots, &columns));
    }

    out.extend(commands::line_feed());
    out.extend(commands::cut());

    debug!(
        width,
        height,
        bands,
        band_height = BAND_HEIGHT,
        bytes = out.len(),
        "Encoded raster"
    );
    Ok(out)
}

/// Encode a [`PackedBitmap`].
pub fn encode(bitmap: &PackedBitmap, density: u8, paper_width_dots: u16) -> Result<Vec<u8>> {
    encode_raster(
        &bitmap.data,
        bitmap.width,
        bitmap.height,
        density,
        paper_width_dots,
    )
}

/// Connection test: reset, then feed two lines.
///
/// ```
/// use docket::protocol::encoder;
///
/// assert_eq!(encoder::connection_test(), vec![0x1B, 0x40, 0x1B, 0x64, 0x02]);
/// ```
pub fn connection_test() -> Vec<u8> {
    let mut out = commands::init();
    out.extend(commands::feed_lines(2));
    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER_384_D8: [u8; 13] = [
        0x1B, 0x40, // init
        0x1D, 0x28, 0x47, 0x02, 0x00, 0x10, 0x08, // density 8
        0x1D, 0x57, 0x01, 0x80, // paper width 384
    ];

    #[test]
    fn test_all_black_16x8_single_band() {
        let bitmap = vec![0xFF; 16];
        let bytes = encode_raster(&bitmap, 16, 8, 8, 384).unwrap();

        let mut expected = HEADER_384_D8.to_vec();
        expected.extend([0x1B, 0x2A, 0x00, 0x10, 0x00]);
        expected.extend([0xFF; 16]);
        expected.extend([0x0A, 0x1D, 0x56, 0x00]);

        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_one_band_per_eight_rows() {
        let bitmap = vec![0x00; 2 * 20];
        let bytes = encode_raster(&bitmap, 16, 20, 8, 384).unwrap();
        // 3 bands, each restating the width header
        assert_eq!(bytes.len(), 13 + 3 * (5 + 16) + 4);
        for band in 0..3 {
            let at = 13 + band * 21;
            assert_eq!(&bytes[at..at + 5], &[0x1B, 0x2A, 0x00, 0x10, 0x00]);
        }
    }

    #[test]
    fn test_partial_last_band_is_padded_white() {
        // 8x9, all black: second band has only its top row set
        let bitmap = vec![0xFF; 9];
        let bytes = encode_raster(&bitmap, 8, 9, 8, 384).unwrap();
        let second = &bytes[13 + 13..13 + 13 + 13];
        assert_eq!(&second[..5], &[0x1B, 0x2A, 0x00, 0x08, 0x00]);
        assert_eq!(&second[5..], &[0x80; 8]);
    }

    #[test]
    fn test_width_header_little_endian() {
        let bitmap = vec![0x00; 72 * 8];
        let bytes = encode_raster(&bitmap, 576, 8, 8, 576).unwrap();
        assert_eq!(&bytes[9..13], &[0x1D, 0x57, 0x02, 0x40]);
        assert_eq!(&bytes[13..18], &[0x1B, 0x2A, 0x00, 0x40, 0x02]);
    }

    #[test]
    fn test_rejects_oversized_width() {
        let width = 65_536;
        let bitmap = vec![0x00; width / 8];
        let err = encode_raster(&bitmap, width, 1, 8, 576).unwrap_err();
        assert!(matches!(err, DocketError::UnsupportedImageWidth(65_536)));
    }

    #[test]
    fn test_rejects_short_buffer() {
        let err = encode_raster(&[0xFF; 15], 16, 8, 8, 384).unwrap_err();
        assert!(matches!(
            err,
            DocketError::MalformedBitmap {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn test_density_is_clamped() {
        let bytes = encode_raster(&[0xFF; 2], 16, 1, 99, 384).unwrap();
        assert_eq!(bytes[8], 15);
    }

    #[test]
    fn test_empty_image() {
        let bytes = encode_raster(&[], 0, 0, 8, 384).unwrap();
        let mut expected = HEADER_384_D8.to_vec();
        expected.extend([0x0A, 0x1D, 0x56, 0x00]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_encode_packed_bitmap() {
        let bitmap = PackedBitmap {
            width: 16,
            height: 8,
            data: vec![0xFF; 16],
        };
        assert_eq!(
            encode(&bitmap, 8, 384).unwrap(),
            encode_raster(&[0xFF; 16], 16, 8, 8, 384).unwrap()
        );
    }
}
