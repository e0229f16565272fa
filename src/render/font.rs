//! Bitmap text rendering for captions, headers and footer codes.
//!
//! Uses the Spleen bitmap font family. The source face is chosen by the
//! requested pixel size (6x12, 8x16 or 12x24) and scaled with nearest
//! neighbour to a cell of `size / 2` by `size` pixels, so output is always
//! pure black/white and needs no dithering.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};
use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Source face for a given pixel size: (font data, width, height).
fn source_face(size: u32) -> (&'static [u8], usize, usize) {
    if size <= 12 {
        (FONT_6X12, 6, 12)
    } else if size <= 16 {
        (FONT_8X16, 8, 16)
    } else {
        (FONT_12X24, 12, 24)
    }
}

/// Cell size of one character at the given pixel size.
#[inline]
pub fn cell_size(size: u32) -> (u32, u32) {
    let size = size.max(1);
    ((size / 2).max(1), size)
}

/// Width in pixels of a single line of text.
pub fn text_width(text: &str, size: u32) -> u32 {
    cell_size(size).0 * text.chars().count() as u32
}

/// Left edge of a line of text given its alignment anchor.
///
/// The anchor is the left edge, the center, or the right edge of the line.
pub fn aligned_left(anchor: i64, width: u32, align: Align) -> i64 {
    match align {
        Align::Left => anchor,
        Align::Center => anchor - width as i64 / 2,
        Align::Right => anchor - width as i64,
    }
}

/// Rasterize one glyph into a `cell_w * cell_h` coverage map.
///
/// Unknown characters render as a box outline.
fn glyph(font: &mut PSF2Font, src_w: usize, src_h: usize, ch: char, size: u32) -> Vec<bool> {
    let mut src = vec![false; src_w * src_h];
    let mut buf = [0u8; 4];
    let utf8 = ch.encode_utf8(&mut buf);

    match font.glyph_for_utf8(utf8.as_bytes()) {
        Some(g) => {
            for (row_y, row) in g.enumerate() {
                for (col_x, on) in row.enumerate() {
                    if row_y < src_h && col_x < src_w {
                        src[row_y * src_w + col_x] = on;
                    }
                }
            }
        }
        None => {
            for x in 0..src_w {
                src[x] = true;
                src[(src_h - 1) * src_w + x] = true;
            }
            for y in 0..src_h {
                src[y * src_w] = true;
                src[y * src_w + src_w - 1] = true;
            }
        }
    }

    let (cell_w, cell_h) = cell_size(size);
    let (cell_w, cell_h) = (cell_w as usize, cell_h as usize);
    let mut out = vec![false; cell_w * cell_h];
    for dy in 0..cell_h {
        for dx in 0..cell_w {
            let sx = dx * src_w / cell_w;
            let sy = dy * src_h / cell_h;
            out[dy * cell_w + dx] = src[sy * src_w + sx];
        }
    }
    out
}

/// Draw a single line of text with its top edge at `y`.
///
/// `anchor_x` is interpreted according to `align`. Pixels outside the
/// image are clipped. Returns the drawn line width.
pub fn draw_text(
    img: &mut GrayImage,
    text: &str,
    anchor_x: i64,
    y: i64,
    size: u32,
    align: Align,
    color: u8,
) -> u32 {
    let width = text_width(text, size);
    if text.is_empty() {
        return 0;
    }

    let (data, src_w, src_h) = source_face(size);
    let Ok(mut font) = PSF2Font::new(data) else {
        tracing::warn!(size, "Bitmap font failed to load, skipping text");
        return 0;
    };

    let (cell_w, cell_h) = cell_size(size);
    let left = aligned_left(anchor_x, width, align);
    let (img_w, img_h) = (img.width() as i64, img.height() as i64);

    for (i, ch) in text.chars().enumerate() {
        if ch == ' ' {
            continue;
        }
        let coverage = glyph(&mut font, src_w, src_h, ch, size);
        let origin_x = left + i as i64 * cell_w as i64;
        for gy in 0..cell_h as i64 {
            let py = y + gy;
            if py < 0 || py >= img_h {
                continue;
            }
            for gx in 0..cell_w as i64 {
                let px = origin_x + gx;
                if px < 0 || px >= img_w {
                    continue;
                }
                if coverage[(gy * cell_w as i64 + gx) as usize] {
                    img.put_pixel(px as u32, py as u32, Luma([color]));
                }
            }
        }
    }

    width
}
