//! # ESC/POS Protocol Implementation
//!
//! Low-level command builders and the raster encoder for ESC/POS receipt
//! printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Control commands (init, density, paper width, feed, cut)
//! - [`graphics`]: `ESC *` bit-image bands
//! - [`encoder`]: Full print stream for a packed bitmap
//!
//! ## Usage Example
//!
//! ```
//! use docket::protocol::{commands, encoder};
//!
//! // 16x8 all-black bitmap, density 8, 58mm paper
//! let stream = encoder::encode_raster(&[0xFF; 16], 16, 8, 8, 384).unwrap();
//! assert_eq!(&stream[..2], commands::init().as_slice());
//!
//! // Send `stream` to the printer via a transport...
//! ```

pub mod commands;
pub mod encoder;
pub mod graphics;
