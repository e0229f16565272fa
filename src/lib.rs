//! # Docket - Thermal Photobooth Printing
//!
//! Docket turns a session of camera frames into a printed strip on a
//! 58mm or 80mm ESC/POS thermal printer. It provides:
//!
//! - **Layout engine**: declarative templates composed into one binary raster
//! - **Dithering**: ordered, Floyd-Steinberg and Atkinson halftoning
//! - **Protocol**: ESC/POS bit-image encoding
//! - **Transport**: raw TCP, HTTP relay and serial/Bluetooth device links,
//!   behind a retrying print queue
//! - **Relay server**: an HTTP endpoint that forwards jobs to a LAN printer
//!
//! ## Quick Start
//!
//! ```no_run
//! use docket::{
//!     booth::Session,
//!     layout::{Placeholders, registry},
//!     printer::PrinterProfile,
//!     render::raster::Frame,
//!     transport::{self, PrinterClient, QueueOptions},
//! };
//! use std::time::Duration;
//!
//! # async fn example() -> docket::Result<()> {
//! let frames = vec![
//!     Frame::load(0, "shot-0.jpg")?,
//!     Frame::load(1, "shot-1.jpg")?,
//!     Frame::load(2, "shot-2.jpg")?,
//! ];
//!
//! let profile = PrinterProfile::default();
//! let transport = transport::from_profile(&profile, Duration::from_secs(10))?;
//! let client = PrinterClient::new(transport, QueueOptions::default());
//!
//! let template = registry::default_template();
//! let session = Session::new(template, Placeholders::new("Pixel Booth", "K7Q2"));
//! let report = session.print(&frames, &profile, &client).await?;
//! println!("printed in {} attempt(s)", report.attempts);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`layout`] | Templates, registry and composition |
//! | [`render`] | Dithering, text, packing |
//! | [`protocol`] | ESC/POS command builders and encoder |
//! | [`printer`] | Paper sizes, printer profiles and models |
//! | [`transport`] | Transports and the retrying print client |
//! | [`server`] | HTTP print relay |
//! | [`booth`] | End-to-end session pipeline |
//! | [`config`] | Kiosk configuration file |
//! | [`error`] | Error types |

pub mod booth;
pub mod config;
pub mod error;
pub mod layout;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod server;
pub mod transport;

// Re-exports for convenience
pub use error::{DocketError, Result};
pub use layout::{Template, compose};
pub use printer::{PaperSize, PrinterProfile};
pub use transport::PrinterClient;
