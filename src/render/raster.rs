//! Captured frames and raster helpers shared by the layout engine.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, Luma, imageops};

use super::pack::to_grayscale;
use crate::error::Result;

/// One captured photo: a grayscale buffer and its capture order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub index: usize,
    pub image: GrayImage,
}

impl Frame {
    pub fn new(index: usize, image: GrayImage) -> Self {
        Self { index, image }
    }

    pub fn from_dynamic(index: usize, img: &DynamicImage) -> Self {
        Self::new(index, to_grayscale(img))
    }

    /// Decode an image file from disk.
    pub fn load(index: usize, path: impl AsRef<Path>) -> Result<Self> {
        let img = image::open(path)?;
        Ok(Self::from_dynamic(index, &img))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Encode a raster as PNG (lossless, opaque).
pub fn to_png(img: &GrayImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Fill a rectangle, clipped to the image.
pub fn fill_rect(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32, value: u8) {
    let x_end = x.saturating_add(w).min(img.width());
    let y_end = y.saturating_add(h).min(img.height());
    for py in y.min(y_end)..y_end {
        for px in x.min(x_end)..x_end {
            img.put_pixel(px, py, Luma([value]));
        }
    }
}

/// Copy `src` onto `dst` with its top-left corner at (x, y), clipped.
pub fn blit(dst: &mut GrayImage, src: &GrayImage, x: u32, y: u32) {
    imageops::replace(dst, src, x as i64, y as i64);
}

/// Force every pixel to 0 or 255.
pub fn threshold(img: &mut GrayImage) {
    for p in img.pixels_mut() {
        p.0[0] = if p.0[0] < super::pack::BLACK_BELOW { 0 } else { 255 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_clips() {
        let mut img = GrayImage::from_pixel(10, 10, Luma([255]));
        fill_rect(&mut img, 8, 8, 5, 5, 0);
        assert_eq!(img.get_pixel(9, 9).0[0], 0);
        assert_eq!(img.get_pixel(7, 7).0[0], 255);
        fill_rect(&mut img, 20, 20, 5, 5, 0);
    }

    #[test]
    fn test_blit_places_source() {
        let mut dst = GrayImage::from_pixel(10, 10, Luma([255]));
        let src = GrayImage::from_pixel(3, 2, Luma([0]));
        blit(&mut dst, &src, 4, 5);
        assert_eq!(dst.get_pixel(4, 5).0[0], 0);
        assert_eq!(dst.get_pixel(6, 6).0[0], 0);
        assert_eq!(dst.get_pixel(7, 6).0[0], 255);
        assert_eq!(dst.get_pixel(4, 7).0[0], 255);
    }

    #[test]
    fn test_png_signature() {
        let png = to_png(&GrayImage::from_pixel(4, 4, Luma([0]))).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (4, 4));
    }

    #[test]
    fn test_threshold() {
        let mut img = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 127 } else { 128 }]));
        threshold(&mut img);
        assert_eq!(img.as_raw(), &vec![0, 255]);
    }
}
