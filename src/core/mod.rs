//! Core types for the Rawlab kernels.
//!
//! This module contains the foundations every kernel builds on:
//! - The BGRA8 pixel buffer
//! - Scalar color math
//! - Convolution masks
//! - Error types
//! - Worker pool configuration and fork-join helpers

pub mod buffer;
pub mod color;
pub mod config;
pub mod error;
pub mod kernel;
pub mod parallel;

// Re-export commonly used types
pub use buffer::{Bgra, Channel, PixelBuffer};
pub use config::ProcessingConfig;
pub use error::{CodecError, RawlabError, RawlabResult};
pub use kernel::Kernel;
