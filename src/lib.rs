//! # Rawlab - Pixel Kernels on Raw BGRA8 Buffers
//!
//! Rawlab is a library of byte-exact image transformation kernels. Every
//! kernel reads an immutable [`PixelBuffer`](core::PixelBuffer) and returns
//! a freshly allocated one, parallelized over rows or pixels with rayon.
//!
//! ## Features
//!
//! - **Point operations**: grayscale, inversion, channel isolation
//! - **Geometry**: rotation, flips, bilinear scaling, mosaic
//! - **Noise**: salt-and-pepper and Gaussian, each with a visualization mask
//! - **Histograms**: equalization for gray and color images
//! - **Convolution**: replicate-edge convolution, smoothing, Sobel edges
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rawlab::prelude::*;
//!
//! let image = codec::open("input.png")?;
//! let edges = edge_detect(&image)?;
//! codec::save(&edges, "edges.png")?;
//!
//! let noisy = gaussian_noise(&image, 12.0)?;
//! codec::save(&noisy.mask, "noise-mask.png")?;
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: pixel buffer, color math, kernels, errors, worker pool config
//! - [`filters`]: the image operations
//! - [`codec`]: PNG/JPEG/BMP/WebP decoding and encoding

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod core;
pub mod filters;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use rawlab::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::buffer::{Bgra, Channel, PixelBuffer};
    pub use crate::core::config::ProcessingConfig;
    pub use crate::core::kernel::Kernel;

    // Errors
    pub use crate::core::error::{CodecError, RawlabError, RawlabResult};

    // Codec
    pub use crate::codec::{self, OutputFormat};

    // Filters
    pub use crate::filters::*;
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "rawlab");
    }

    #[test]
    fn test_pipeline_through_prelude() {
        let image = PixelBuffer::from_fn(16, 9, |x, y| {
            [(x * 15) as u8, (y * 25) as u8, 90, 255]
        })
        .unwrap();
        let rotated = rotate_right(&image).unwrap();
        assert_eq!(rotated.dimensions(), (9, 16));
        let restored = rotate_left(&rotated).unwrap();
        assert_eq!(restored, image);

        let edges = edge_detect(&restored).unwrap();
        assert_eq!(edges.dimensions(), image.dimensions());
    }

    #[test]
    fn test_ops_run_in_dedicated_pool() {
        let image = PixelBuffer::from_fn(32, 32, |x, y| [x as u8, y as u8, 0, 255]).unwrap();
        let config = ProcessingConfig::new().with_threads(2);
        let pooled = config.install(|| smooth(&image)).unwrap().unwrap();
        assert_eq!(pooled, smooth(&image).unwrap());
    }
}
