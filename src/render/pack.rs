//! # Monochrome Packing
//!
//! Converts a grayscale (or colour) raster into the 1-bit-per-dot layout that
//! printer bit-image commands consume.
//!
//! ## Bit Packing
//!
//! - Rows are packed independently, row-major
//! - Bit 7 (MSB) = leftmost pixel
//! - 1 = black (gray < 128), 0 = white
//! - A row whose width is not a multiple of 8 is zero-padded on the right
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0xAA = 10101010 = █░█░█░█░
//! ```
//!
//! ## Example
//!
//! ```
//! use docket::render::pack::pack_row;
//!
//! let row = [0u8, 0, 0, 0, 255, 255, 255, 255];
//! assert_eq!(pack_row(&row), vec![0xF0]);
//! ```

use image::{DynamicImage, GrayImage, Luma, imageops::FilterType};
use tracing::debug;

use super::dither::DitherMethod;

/// Gray values below this print as black dots.
pub const BLACK_BELOW: u8 = 128;

/// A 1-bit packed raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBitmap {
    /// Width in dots
    pub width: usize,
    /// Height in dots
    pub height: usize,
    /// `bytes_per_row() * height` bytes, row-major, MSB first
    pub data: Vec<u8>,
}

impl PackedBitmap {
    /// Bytes used by one packed row.
    #[inline]
    pub fn bytes_per_row(&self) -> usize {
        self.width.div_ceil(8)
    }

    /// One packed row.
    pub fn row(&self, y: usize) -> &[u8] {
        let bpr = self.bytes_per_row();
        &self.data[y * bpr..(y + 1) * bpr]
    }

    /// Whether the dot at (x, y) is black. Out-of-range reads are white.
    #[inline]
    pub fn is_black(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = self.data[y * self.bytes_per_row() + x / 8];
        byte & (0x80 >> (x % 8)) != 0
    }
}

/// ITU-R BT.601 luma, rounded to the nearest integer.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Reduce any image to a single gray channel. Alpha is ignored.
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = img {
        return gray.clone();
    }
    let rgb = img.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        Luma([luminance(r, g, b)])
    })
}

/// Pack one row of gray pixels into bytes.
pub fn pack_row(pixels: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0u8; pixels.len().div_ceil(8)];

    for (i, &px) in pixels.iter().enumerate() {
        if px < BLACK_BELOW {
            bytes[i / 8] |= 0x80 >> (i % 8);
        }
    }

    bytes
}

/// Pack an already-dithered grayscale raster.
pub fn pack(gray: &GrayImage) -> PackedBitmap {
    let width = gray.width() as usize;
    let height = gray.height() as usize;
    let mut data = Vec::with_capacity(width.div_ceil(8) * height);

    if width > 0 {
        for row in gray.as_raw().chunks_exact(width) {
            data.extend(pack_row(row));
        }
    }

    PackedBitmap {
        width,
        height,
        data,
    }
}

/// Convert to gray, optionally dither, then pack.
///
/// Pass `None` when the raster is already binary (e.g. a finished composite).
pub fn pack_image(img: &DynamicImage, dither: Option<DitherMethod>) -> PackedBitmap {
    let mut gray = to_grayscale(img);
    if let Some(method) = dither {
        method.apply(&mut gray);
    }
    pack(&gray)
}

/// Scale a composite to the printer's dot width and pack it.
///
/// Height follows the aspect ratio. When `dither` is given the scaled image
/// is re-dithered at print resolution; otherwise it is re-thresholded.
pub fn prepare_for_print(
    img: &DynamicImage,
    width_dots: u32,
    dither: Option<DitherMethod>,
) -> PackedBitmap {
    prepare_gray_for_print(&to_grayscale(img), width_dots, dither)
}

/// [`prepare_for_print`] for a raster that is already grayscale.
pub fn prepare_gray_for_print(
    gray: &GrayImage,
    width_dots: u32,
    dither: Option<DitherMethod>,
) -> PackedBitmap {
    if gray.width() == 0 || gray.height() == 0 || width_dots == 0 {
        return pack(&GrayImage::new(0, 0));
    }

    if gray.width() == width_dots && dither.is_none() {
        return pack(gray);
    }

    let mut scaled = if gray.width() == width_dots {
        gray.clone()
    } else {
        let height = ((gray.height() as u64 * width_dots as u64) as f64 / gray.width() as f64)
            .round()
            .max(1.0) as u32;
        debug!(
            from_width = gray.width(),
            from_height = gray.height(),
            width_dots,
            height,
            "Scaling composite to print width"
        );
        image::imageops::resize(gray, width_dots, height, FilterType::Triangle)
    };

    if let Some(method) = dither {
        method.apply(&mut scaled);
    }
    pack(&scaled)
}

/// Expand a packed bitmap back to 0/255 gray pixels.
pub fn unpack(bitmap: &PackedBitmap) -> GrayImage {
    GrayImage::from_fn(bitmap.width as u32, bitmap.height as u32, |x, y| {
        Luma([if bitmap.is_black(x as usize, y as usize) {
            0
        } else {
            255
        }])
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use rand::Rng;

    #[test]
    fn test_pack_row_8_pixels() {
        assert_eq!(pack_row(&[0; 8]), vec![0xFF]);
        assert_eq!(pack_row(&[255; 8]), vec![0x00]);
        assert_eq!(pack_row(&[0, 255, 0, 255, 0, 255, 0, 255]), vec![0xAA]);
        assert_eq!(pack_row(&[0, 0, 0, 0, 255, 255, 255, 255]), vec![0xF0]);
    }

    #[test]
    fn test_pack_row_threshold() {
        assert_eq!(pack_row(&[127]), vec![0x80]);
        assert_eq!(pack_row(&[128]), vec![0x00]);
    }

    #[test]
    fn test_pack_row_padding() {
        assert_eq!(pack_row(&[0, 0, 0, 0]), vec![0xF0]);

        let packed = pack_row(&[0; 9]);
        assert_eq!(packed, vec![0xFF, 0x80]);
    }

    #[test]
    fn test_pack_row_empty() {
        assert_eq!(pack_row(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_pack_pads_each_row() {
        let img = GrayImage::from_pixel(10, 3, Luma([0]));
        let bitmap = pack(&img);
        assert_eq!(bitmap.bytes_per_row(), 2);
        assert_eq!(bitmap.data.len(), 6);
        for y in 0..3 {
            assert_eq!(bitmap.row(y), &[0xFF, 0xC0]);
        }
    }

    #[test]
    fn test_luminance_weights() {
        assert_eq!(luminance(0, 0, 0), 0);
        assert_eq!(luminance(255, 255, 255), 255);
        assert_eq!(luminance(255, 0, 0), 76);
        assert_eq!(luminance(0, 255, 0), 150);
        assert_eq!(luminance(0, 0, 255), 29);
    }

    #[test]
    fn test_to_grayscale_ignores_alpha() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0]));
        let gray = to_grayscale(&DynamicImage::ImageRgba8(img));
        assert!(gray.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_pack_image_from_rgb() {
        // Red (76) is black, green (150) is white
        let img = RgbImage::from_fn(8, 1, |x, _| {
            if x < 4 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 255, 0])
            }
        });
        let bitmap = pack_image(&DynamicImage::ImageRgb8(img), None);
        assert_eq!(bitmap.data, vec![0xF0]);
    }

    #[test]
    fn test_round_trip_random_binary() {
        let mut rng = rand::rng();
        for (w, h) in [(1, 1), (7, 3), (8, 8), (13, 9), (64, 17)] {
            let img = GrayImage::from_fn(w, h, |_, _| {
                Luma([if rng.random_bool(0.5) { 0 } else { 255 }])
            });
            let restored = unpack(&pack(&img));
            assert_eq!(restored, img, "round trip failed for {}x{}", w, h);
        }
    }

    #[test]
    fn test_prepare_for_print_scales_to_width() {
        let img = GrayImage::from_pixel(100, 50, Luma([0]));
        let bitmap = prepare_for_print(&DynamicImage::ImageLuma8(img), 384, None);
        assert_eq!(bitmap.width, 384);
        assert_eq!(bitmap.height, 192);
        assert!(bitmap.data.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_prepare_for_print_empty() {
        let bitmap =
            prepare_for_print(&DynamicImage::ImageLuma8(GrayImage::new(0, 0)), 384, None);
        assert_eq!(bitmap.width, 0);
        assert!(bitmap.data.is_empty());
    }

    #[test]
    fn test_is_black_out_of_range() {
        let bitmap = pack(&GrayImage::from_pixel(3, 3, Luma([0])));
        assert!(bitmap.is_black(2, 2));
        assert!(!bitmap.is_black(3, 0));
        assert!(!bitmap.is_black(0, 3));
    }
}
