//! # Error Types
//!
//! This module defines the error type shared by every stage of the pipeline.
//!
//! | Variant | Raised by | Retried |
//! |---------|-----------|---------|
//! | `InsufficientFrames` | Layout engine | no |
//! | `InvalidLayout` | Layout engine, template validation | no |
//! | `UnsupportedImageWidth` | ESC/POS encoder | no |
//! | `MalformedBitmap` | ESC/POS encoder | no |
//! | `Transport` | Any transport, per attempt | yes |
//! | `PrintFailed` | Printer client, after the last attempt | no |
//!
//! Dithering never fails; a zero-sized input simply yields a zero-sized output.

use thiserror::Error;

/// Main error type for docket operations
#[derive(Debug, Error)]
pub enum DocketError {
    /// The template has more photo slots than frames were supplied
    #[error("Insufficient frames: template needs {required}, got {supplied}")]
    InsufficientFrames { required: usize, supplied: usize },

    /// A template region is empty or falls outside the canvas
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Raster width cannot be expressed in a 16-bit command header
    #[error("Unsupported image width: {0} dots (max 65535)")]
    UnsupportedImageWidth(usize),

    /// Packed bitmap length does not match its declared dimensions
    #[error("Malformed bitmap: expected {expected} bytes, got {actual}")]
    MalformedBitmap { expected: usize, actual: usize },

    /// Transport-level errors (connection, I/O, HTTP status)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A print job exhausted its attempts
    #[error("Print job {job_id} failed after {attempts} attempts: {last_error}")]
    PrintFailed {
        job_id: String,
        attempts: u32,
        last_error: String,
    },

    /// The job was removed from the queue before it started sending
    #[error("Print job {0} was cancelled")]
    JobCancelled(String),

    /// Configuration file or CLI argument problems
    #[error("Config error: {0}")]
    Config(String),

    /// Image decode/encode error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocketError {
    /// Only transport failures are plausibly transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DocketError::Transport(_))
    }
}

impl From<image::ImageError> for DocketError {
    fn from(e: image::ImageError) -> Self {
        DocketError::Image(e.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DocketError>;
