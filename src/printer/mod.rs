//! # Printer Module
//!
//! Printer profiles and hardware presets.
//!
//! ## Modules
//!
//! - [`profile`]: Connection parameters and paper sizes
//! - [`models`]: Known printer models and name-based detection

pub mod models;
pub mod profile;

pub use models::PrinterModel;
pub use profile::{PaperSize, PrinterProfile, TransportKind};
