//! # Dithering
//!
//! Converts continuous-tone grayscale pixels (0 = black, 255 = white) into
//! strictly binary pixels (0 or 255) suitable for a thermal print head.
//!
//! ## Algorithms
//!
//! | Method | Speed | Quality | Data dependency |
//! |--------|-------|---------|-----------------|
//! | Ordered (Bayer 4×4) | Fast | Good | None, per pixel |
//! | Floyd–Steinberg | Slow | Better | Sequential raster scan |
//! | Atkinson | Slow | High contrast | Sequential raster scan |
//!
//! Ordered dithering is used for live review because every pixel can be
//! computed independently (rows are processed in parallel with rayon).
//! Error diffusion preserves average luminance far better and is used for
//! final print output.
//!
//! ## The Bayer Matrix
//!
//! ```text
//!     0   1   2   3   (x mod 4)
//!   ┌───┬───┬───┬───┐
//! 0 │ 0 │ 8 │ 2 │10 │
//!   ├───┼───┼───┼───┤
//! 1 │12 │ 4 │14 │ 6 │
//!   ├───┼───┼───┼───┤
//! 2 │ 3 │11 │ 1 │ 9 │
//!   ├───┼───┼───┼───┤
//! 3 │15 │ 7 │13 │ 5 │
//!   └───┴───┴───┴───┘
//! (y mod 4)
//! ```
//!
//! The threshold for a cell is `M[y mod 4][x mod 4] × 255/16`. A pixel is
//! black when its luminance is at or below the threshold, so pure black stays
//! black on the zero cell and already-binary images pass through unchanged.
//!
//! ## Usage Example
//!
//! ```
//! use docket::render::dither::{self, DitherMethod};
//! use image::{GrayImage, Luma};
//!
//! let mut img = GrayImage::from_pixel(16, 16, Luma([128]));
//! DitherMethod::FloydSteinberg.apply(&mut img);
//! assert!(dither::is_binary(img.as_raw()));
//! ```

use image::{GrayImage, RgbaImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bayer 4x4 ordered dithering matrix (values 0-15).
pub const BAYER4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

/// Error-diffusion quantization threshold.
const MIDPOINT: u8 = 128;

/// Dithering method selected by a template or print request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DitherMethod {
    /// Bayer 4x4 ordered dithering.
    #[serde(alias = "bayer")]
    Ordered,
    /// Floyd–Steinberg error diffusion.
    #[default]
    #[serde(alias = "error-diffusion")]
    FloydSteinberg,
    /// Atkinson error diffusion (6/8 of the error is propagated).
    Atkinson,
}

impl DitherMethod {
    /// Dither a grayscale image in place.
    pub fn apply(self, img: &mut GrayImage) {
        let (width, height) = (img.width() as usize, img.height() as usize);
        let pixels: &mut [u8] = img;
        self.apply_slice(pixels, width, height);
    }

    /// Dither a raw single-channel buffer in place.
    pub fn apply_slice(self, pixels: &mut [u8], width: usize, height: usize) {
        match self {
            DitherMethod::Ordered => ordered_in_place(pixels, width, height),
            DitherMethod::FloydSteinberg => floyd_steinberg_in_place(pixels, width, height),
            DitherMethod::Atkinson => atkinson_in_place(pixels, width, height),
        }
    }

    /// Parse a method name as used on the command line.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ordered" | "bayer" => Some(DitherMethod::Ordered),
            "floyd-steinberg" | "floyd_steinberg" | "fs" | "error-diffusion" => {
                Some(DitherMethod::FloydSteinberg)
            }
            "atkinson" => Some(DitherMethod::Atkinson),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DitherMethod::Ordered => "ordered",
            DitherMethod::FloydSteinberg => "floyd-steinberg",
            DitherMethod::Atkinson => "atkinson",
        }
    }
}

/// Threshold of the ordered matrix at a pixel position, in luminance units.
#[inline]
pub fn ordered_threshold(x: usize, y: usize) -> f32 {
    BAYER4[y & 3][x & 3] as f32 * (255.0 / 16.0)
}

/// Whether a pixel is black under ordered dithering.
///
/// Integer form of `lum <= M × 255/16`.
#[inline]
pub fn ordered_is_black(x: usize, y: usize, lum: u8) -> bool {
    (lum as u32) * 16 <= (BAYER4[y & 3][x & 3] as u32) * 255
}

/// Ordered (Bayer 4x4) dither of a row-major buffer, rows in parallel.
pub fn ordered_in_place(pixels: &mut [u8], width: usize, height: usize) {
    let height = height.min(pixels.len().checked_div(width).unwrap_or(0));
    if width == 0 || height == 0 {
        return;
    }
    debug!(width, height, "Applying ordered dithering");

    pixels[..width * height]
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.iter_mut().enumerate() {
                *px = if ordered_is_black(x, y, *px) { 0 } else { 255 };
            }
        });
}

/// Ordered dither into a freshly allocated image.
pub fn ordered(img: &GrayImage) -> GrayImage {
    let mut out = img.clone();
    DitherMethod::Ordered.apply(&mut out);
    out
}

/// Floyd–Steinberg dither of a row-major buffer.
///
/// Each neighbour update is rounded (halves to even) and clamped to [0, 255]
/// before it is read back as that neighbour's value. Writes past the buffer edges are dropped.
pub fn floyd_steinberg_in_place(pixels: &mut [u8], width: usize, height: usize) {
    let height = height.min(pixels.len().checked_div(width).unwrap_or(0));
    if width == 0 || height == 0 {
        return;
    }
    debug!(width, height, "Applying Floyd-Steinberg dithering");

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let old = pixels[idx];
            let new = if old < MIDPOINT { 0 } else { 255 };
            pixels[idx] = new;

            let err = old as i32 - new as i32;
            if err == 0 {
                continue;
            }

            if x + 1 < width {
                diffuse(pixels, idx + 1, err, 7, 16);
            }
            if y + 1 < height {
                let below = idx + width;
                if x > 0 {
                    diffuse(pixels, below - 1, err, 3, 16);
                }
                diffuse(pixels, below, err, 5, 16);
                if x + 1 < width {
                    diffuse(pixels, below + 1, err, 1, 16);
                }
            }
        }
    }
}

/// Floyd–Steinberg dither into a freshly allocated image.
pub fn floyd_steinberg(img: &GrayImage) -> GrayImage {
    let mut out = img.clone();
    DitherMethod::FloydSteinberg.apply(&mut out);
    out
}

/// Add `err * num / den` to one pixel, rounding halves to even before clamping.
#[inline]
fn diffuse(pixels: &mut [u8], idx: usize, err: i32, num: i32, den: i32) {
    let v = pixels[idx] as f32 + (err * num) as f32 / den as f32;
    pixels[idx] = v.round_ties_even().clamp(0.0, 255.0) as u8;
}

/// Atkinson dither of a row-major buffer.
///
/// Error is accumulated in a separate buffer and 1/8 of it goes to each of
/// six neighbours: (x+1,y) (x+2,y) (x-1,y+1) (x,y+1) (x+1,y+1) (x,y+2).
pub fn atkinson_in_place(pixels: &mut [u8], width: usize, height: usize) {
    let height = height.min(pixels.len().checked_div(width).unwrap_or(0));
    if width == 0 || height == 0 {
        return;
    }
    debug!(width, height, "Applying Atkinson dithering");

    let mut error = vec![0f32; width * height];

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let old = pixels[idx] as f32 + error[idx];
            let new = if old < MIDPOINT as f32 { 0u8 } else { 255u8 };
            pixels[idx] = new;

            let share = (old - new as f32) / 8.0;
            if x + 1 < width {
                error[idx + 1] += share;
            }
            if x + 2 < width {
                error[idx + 2] += share;
            }
            if y + 1 < height {
                let below = idx + width;
                if x > 0 {
                    error[below - 1] += share;
                }
                error[below] += share;
                if x + 1 < width {
                    error[below + 1] += share;
                }
            }
            if y + 2 < height {
                error[idx + 2 * width] += share;
            }
        }
    }
}

/// Dither an RGBA surface in place.
///
/// Luminance is read from the red channel (the surface is expected to be
/// grayscale already), the result is mirrored into G and B, and alpha is
/// forced to 255. The input alpha is never read.
pub fn dither_rgba_in_place(img: &mut RgbaImage, method: DitherMethod) {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let mut gray: Vec<u8> = img.pixels().map(|p| p.0[0]).collect();
    method.apply_slice(&mut gray, width, height);

    for (px, v) in img.pixels_mut().zip(gray) {
        px.0 = [v, v, v, 255];
    }
}

/// True if every pixel is exactly 0 or 255.
pub fn is_binary(pixels: &[u8]) -> bool {
    pixels.iter().all(|&p| p == 0 || p == 255)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba};

    fn gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            Luma([((x + y) * 255 / (width + height - 2)) as u8])
        })
    }

    #[test]
    fn test_diffuse_rounds_halves_to_even() {
        let mut px = [101u8, 100, 100, 0, 255];
        diffuse(&mut px, 0, 8, 7, 16); // 104.5
        diffuse(&mut px, 1, 8, 5, 16); // 102.5
        diffuse(&mut px, 2, -8, 7, 16); // 96.5
        diffuse(&mut px, 3, -8, 1, 16); // clamps at 0
        diffuse(&mut px, 4, 8, 1, 16); // clamps at 255
        assert_eq!(px, [104, 102, 96, 0, 255]);
    }

    fn ink(img: &GrayImage) -> usize {
        img.pixels().filter(|p| p.0[0] == 0).count()
    }

    #[test]
    fn test_bayer_matrix_values() {
        let mut seen = [false; 16];
        for row in &BAYER4 {
            for &val in row {
                assert!(val < 16, "Matrix value {} out of range", val);
                assert!(!seen[val as usize], "Duplicate value {}", val);
                seen[val as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_threshold_periodicity() {
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(ordered_threshold(x, y), ordered_threshold(x + 4, y));
                assert_eq!(ordered_threshold(x, y), ordered_threshold(x, y + 4));
            }
        }
        assert_eq!(ordered_threshold(1, 0), 8.0 * 255.0 / 16.0);
    }

    #[test]
    fn test_ordered_output_is_binary_and_same_size() {
        let img = gradient(37, 23);
        let out = ordered(&img);
        assert_eq!(out.dimensions(), (37, 23));
        assert!(is_binary(out.as_raw()));
    }

    #[test]
    fn test_ordered_extremes() {
        let black = ordered(&GrayImage::from_pixel(8, 8, Luma([0])));
        assert!(black.pixels().all(|p| p.0[0] == 0));

        let white = ordered(&GrayImage::from_pixel(8, 8, Luma([255])));
        assert!(white.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_ordered_mid_gray_is_roughly_half() {
        let out = ordered(&GrayImage::from_pixel(4, 4, Luma([128])));
        // Cells 9..=15 sit above 128
        assert_eq!(ink(&out), 7);
    }

    #[test]
    fn test_floyd_steinberg_output_is_binary() {
        let out = floyd_steinberg(&gradient(64, 48));
        assert_eq!(out.dimensions(), (64, 48));
        assert!(is_binary(out.as_raw()));
    }

    #[test]
    fn test_floyd_steinberg_conserves_ink() {
        for level in [32u8, 96, 128, 200] {
            let img = GrayImage::from_pixel(64, 64, Luma([level]));
            let expected = 64.0 * 64.0 * (255 - level) as f64 / 255.0;
            let actual = ink(&floyd_steinberg(&img)) as f64;
            let tolerance = 64.0 * 64.0 * 0.03;
            assert!(
                (actual - expected).abs() <= tolerance,
                "level {}: expected ~{} black pixels, got {}",
                level,
                expected,
                actual
            );
        }

        let img = gradient(64, 64);
        let expected: f64 = img.pixels().map(|p| (255 - p.0[0]) as f64 / 255.0).sum();
        let actual = ink(&floyd_steinberg(&img)) as f64;
        assert!((actual - expected).abs() <= 64.0 * 64.0 * 0.03);
    }

    #[test]
    fn test_idempotent_on_binary_input() {
        let binary = GrayImage::from_fn(33, 17, |x, y| {
            Luma([if (x * 7 + y * 3) % 5 < 2 { 0 } else { 255 }])
        });
        for method in [
            DitherMethod::Ordered,
            DitherMethod::FloydSteinberg,
            DitherMethod::Atkinson,
        ] {
            let mut out = binary.clone();
            method.apply(&mut out);
            assert_eq!(out, binary, "{} changed a binary image", method.name());
        }
    }

    #[test]
    fn test_zero_size_input() {
        for method in [
            DitherMethod::Ordered,
            DitherMethod::FloydSteinberg,
            DitherMethod::Atkinson,
        ] {
            let mut img = GrayImage::new(0, 0);
            method.apply(&mut img);
            assert_eq!(img.dimensions(), (0, 0));

            let mut empty: Vec<u8> = vec![];
            method.apply_slice(&mut empty, 0, 5);
            assert!(empty.is_empty());
        }
    }

    #[test]
    fn test_atkinson_output_is_binary() {
        let mut img = gradient(40, 40);
        DitherMethod::Atkinson.apply(&mut img);
        assert!(is_binary(img.as_raw()));
    }

    #[test]
    fn test_rgba_mirrors_channels_and_forces_opacity() {
        let mut img = RgbaImage::from_fn(12, 12, |x, _| {
            let v = (x * 20) as u8;
            Rgba([v, 9, 200, 17])
        });
        dither_rgba_in_place(&mut img, DitherMethod::FloydSteinberg);
        for p in img.pixels() {
            assert!(p.0[0] == 0 || p.0[0] == 255);
            assert_eq!(p.0[0], p.0[1]);
            assert_eq!(p.0[0], p.0[2]);
            assert_eq!(p.0[3], 255);
        }
    }

    #[test]
    fn test_parse_method_names() {
        assert_eq!(DitherMethod::parse("bayer"), Some(DitherMethod::Ordered));
        assert_eq!(
            DitherMethod::parse("Floyd-Steinberg"),
            Some(DitherMethod::FloydSteinberg)
        );
        assert_eq!(DitherMethod::parse("atkinson"), Some(DitherMethod::Atkinson));
        assert_eq!(DitherMethod::parse("halftone"), None);
    }

    #[test]
    fn test_serde_names() {
        let m: DitherMethod = serde_json::from_str("\"error-diffusion\"").unwrap();
        assert_eq!(m, DitherMethod::FloydSteinberg);
        assert_eq!(
            serde_json::to_string(&DitherMethod::Ordered).unwrap(),
            "\"ordered\""
        );
    }
}
