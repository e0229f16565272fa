//! # Rendering Module
//!
//! Raster primitives shared by the layout engine and the print encoder.
//!
//! ## Modules
//!
//! - [`dither`]: ordered (Bayer 4x4), Floyd-Steinberg and Atkinson dithering
//! - [`font`]: bitmap text for headers, captions and footer codes
//! - [`pack`]: 1-bit packing and print-width preparation
//! - [`raster`]: frames, rectangle fills and blitting
//!
//! ## Usage Example
//!
//! ```
//! use docket::render::dither::DitherMethod;
//! use docket::render::pack;
//! use image::{GrayImage, Luma};
//!
//! let mut photo = GrayImage::from_pixel(64, 64, Luma([128]));
//! DitherMethod::Atkinson.apply(&mut photo);
//!
//! let bitmap = pack::pack(&photo);
//! assert_eq!(bitmap.data.len(), 8 * 64);
//! ```

pub mod dither;
pub mod font;
pub mod pack;
pub mod raster;
