//! Error types for Rawlab.
//!
//! Uses thiserror for structured errors. Kernels surface failures
//! synchronously through their return value; nothing is retried.
//!
//! Invalid scalar parameters (negative scale factor, out-of-range mosaic
//! cell size) are not errors: those operations degrade to returning an
//! unmodified copy. Only conditions with no sensible fallback show up here.

use thiserror::Error;

/// Top-level error type for Rawlab.
#[derive(Error, Debug)]
pub enum RawlabError {
    #[error("Dimension mismatch: {left_width}x{left_height} vs {right_width}x{right_height}")]
    DimensionMismatch {
        left_width: u32,
        left_height: u32,
        right_width: u32,
        right_height: u32,
    },

    #[error("Buffer length {actual} does not match {width}x{height} BGRA8 (expected {expected})")]
    InvalidBufferLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Image dimensions {width}x{height} overflow the addressable buffer size")]
    DimensionOverflow { width: u32, height: u32 },

    #[error("Failed to allocate {bytes} bytes for output buffer")]
    Allocation { bytes: usize },

    #[error("Invalid kernel: {0}")]
    InvalidKernel(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Errors raised by the codec adapter.
///
/// Decode and encode belong to the external codec; these wrap its failures
/// so callers never observe a partially populated buffer.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Empty input")]
    EmptyInput,

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RawlabError {
    /// Check if the caller can reasonably continue with other work.
    ///
    /// Allocation and overflow failures mean the image is too large for
    /// this process; everything else is specific to the call that failed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            RawlabError::Allocation { .. } | RawlabError::DimensionOverflow { .. }
        )
    }

    pub(crate) fn mismatch(left: (u32, u32), right: (u32, u32)) -> Self {
        RawlabError::DimensionMismatch {
            left_width: left.0,
            left_height: left.1,
            right_width: right.0,
            right_height: right.1,
        }
    }
}

/// Result type alias for Rawlab operations.
pub type RawlabResult<T> = Result<T, RawlabError>;

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
