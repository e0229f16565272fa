//! Scaling a photo into a slot rectangle.

use image::{GrayImage, imageops::FilterType};

use super::template::Fit;

/// A scaled photo and where it sits inside the target rectangle.
#[derive(Debug, Clone)]
pub struct Fitted {
    pub image: GrayImage,
    pub offset_x: u32,
    pub offset_y: u32,
}

fn resize(src: &GrayImage, width: u32, height: u32) -> GrayImage {
    if src.dimensions() == (width, height) {
        src.clone()
    } else {
        image::imageops::resize(src, width, height, FilterType::Triangle)
    }
}

/// Scale `src` into a `width` x `height` rectangle.
///
/// - `Cover` scales uniformly until both sides are filled, then crops the
///   overflow evenly from both ends.
/// - `Contain` scales uniformly until the image fits, centering it.
/// - `Fill` stretches to the exact rectangle.
pub fn fit(src: &GrayImage, width: u32, height: u32, mode: Fit) -> Fitted {
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 || width == 0 || height == 0 {
        return Fitted {
            image: GrayImage::new(0, 0),
            offset_x: 0,
            offset_y: 0,
        };
    }

    let sx = width as f64 / sw as f64;
    let sy = height as f64 / sh as f64;

    match mode {
        Fit::Fill => Fitted {
            image: resize(src, width, height),
            offset_x: 0,
            offset_y: 0,
        },
        Fit::Cover => {
            let scale = sx.max(sy);
            let rw = ((sw as f64 * scale).round() as u32).max(width);
            let rh = ((sh as f64 * scale).round() as u32).max(height);
            let scaled = resize(src, rw, rh);
            let x0 = (rw - width) / 2;
            let y0 = (rh - height) / 2;
            Fitted {
                image: image::imageops::crop_imm(&scaled, x0, y0, width, height).to_image(),
                offset_x: 0,
                offset_y: 0,
            }
        }
        Fit::Contain => {
            let scale = sx.min(sy);
            let rw = ((sw as f64 * scale).round() as u32).clamp(1, width);
            let rh = ((sh as f64 * scale).round() as u32).clamp(1, height);
            Fitted {
                image: resize(src, rw, rh),
                offset_x: (width - rw) / 2,
                offset_y: (height - rh) / 2,
            }
        }
    }
}
