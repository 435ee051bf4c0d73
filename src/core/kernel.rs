//! Convolution masks.
//!
//! A [`Kernel`] is a square, odd-sized grid of coefficients together with a
//! normalization divisor (`scalar`) and a `bias` added after division.
//! Taps are addressed as `weight(i, j)` where `i` walks the horizontal
//! offset and `j` the vertical offset, each in `0..size`.

use crate::core::error::{RawlabError, RawlabResult};
use serde::{Deserialize, Serialize};

/// Largest kernel size accepted from user input.
pub const MAX_KERNEL_SIZE: u32 = 15;

/// An immutable convolution mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KernelSpec", into = "KernelSpec")]
pub struct Kernel {
    size: u32,
    coefficients: Vec<f32>,
    scalar: f32,
    bias: f32,
}

/// Serialized form of a kernel, validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct KernelSpec {
    size: u32,
    coefficients: Vec<f32>,
    #[serde(default = "default_scalar")]
    scalar: f32,
    #[serde(default)]
    bias: f32,
}

fn default_scalar() -> f32 {
    1.0
}

impl TryFrom<KernelSpec> for Kernel {
    type Error = RawlabError;

    fn try_from(spec: KernelSpec) -> Result<Self, Self::Error> {
        Kernel::new(spec.size, spec.coefficients, spec.scalar)?.with_bias(spec.bias)
    }
}

impl From<Kernel> for KernelSpec {
    fn from(kernel: Kernel) -> Self {
        KernelSpec {
            size: kernel.size,
            coefficients: kernel.coefficients,
            scalar: kernel.scalar,
            bias: kernel.bias,
        }
    }
}

impl Kernel {
    /// Create a kernel from `size * size` coefficients, indexed `[i * size + j]`.
    ///
    /// # Errors
    ///
    /// Returns [`RawlabError::InvalidKernel`] if `size` is even, zero or
    /// above [`MAX_KERNEL_SIZE`], if the coefficient count is wrong, if any
    /// coefficient is not finite, or if `scalar` is zero or not finite.
    pub fn new(size: u32, coefficients: Vec<f32>, scalar: f32) -> RawlabResult<Self> {
        if size == 0 || size % 2 == 0 || size > MAX_KERNEL_SIZE {
            return Err(RawlabError::InvalidKernel(format!(
                "size must be odd and between 1 and {MAX_KERNEL_SIZE}, got {size}"
            )));
        }
        let expected = (size * size) as usize;
        if coefficients.len() != expected {
            return Err(RawlabError::InvalidKernel(format!(
                "expected {expected} coefficients for a {size}x{size} kernel, got {}",
                coefficients.len()
            )));
        }
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(RawlabError::InvalidKernel(
                "coefficients must be finite".to_string(),
            ));
        }
        if scalar == 0.0 || !scalar.is_finite() {
            return Err(RawlabError::InvalidKernel(format!(
                "scalar must be finite and nonzero, got {scalar}"
            )));
        }
        Ok(Self {
            size,
            coefficients,
            scalar,
            bias: 0.0,
        })
    }

    /// Create a kernel from a flat square list of coefficients (9 or 25
    /// entries, for instance), normalized by the coefficient sum.
    ///
    /// A sum of zero (edge-style masks) falls back to a scalar of 1.
    pub fn from_coefficients(coefficients: Vec<f32>) -> RawlabResult<Self> {
        let size = (coefficients.len() as f64).sqrt() as u32;
        if (size * size) as usize != coefficients.len() {
            return Err(RawlabError::InvalidKernel(format!(
                "{} coefficients do not form a square",
                coefficients.len()
            )));
        }
        let sum: f32 = coefficients.iter().sum();
        let scalar = if sum == 0.0 { 1.0 } else { sum };
        Self::new(size, coefficients, scalar)
    }

    /// Return a copy with a different bias.
    pub fn with_bias(mut self, bias: f32) -> RawlabResult<Self> {
        if !bias.is_finite() {
            return Err(RawlabError::InvalidKernel(format!(
                "bias must be finite, got {bias}"
            )));
        }
        self.bias = bias;
        Ok(self)
    }

    /// 3x3 Gaussian smoothing mask, normalized by 16.
    pub fn gaussian_smooth() -> Self {
        Self::preset(GAUSSIAN_SMOOTH, 16.0, 0.0)
    }

    /// 3x3 horizontal-gradient Sobel mask, centered on 128.
    pub fn sobel_x() -> Self {
        Self::preset(SOBEL_X, 1.0, GRADIENT_BIAS)
    }

    /// 3x3 vertical-gradient Sobel mask, centered on 128.
    pub fn sobel_y() -> Self {
        Self::preset(SOBEL_Y, 1.0, GRADIENT_BIAS)
    }

    /// Mask with a single 1 at the center.
    ///
    /// # Errors
    ///
    /// Fails for the same sizes [`Kernel::new`] rejects.
    pub fn identity(size: u32) -> RawlabResult<Self> {
        let len = size.saturating_mul(size) as usize;
        let mut coefficients = vec![0.0; len];
        if let Some(center) = coefficients.get_mut(len / 2) {
            *center = 1.0;
        }
        Self::new(size, coefficients, 1.0)
    }

    fn preset(coefficients: [f32; 9], scalar: f32, bias: f32) -> Self {
        Self {
            size: 3,
            coefficients: coefficients.to_vec(),
            scalar,
            bias,
        }
    }

    /// Side length.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Distance from the center tap to the edge, `size / 2`.
    #[inline]
    pub fn offset(&self) -> i64 {
        i64::from(self.size / 2)
    }

    /// Normalization divisor.
    #[inline]
    pub fn scalar(&self) -> f32 {
        self.scalar
    }

    /// Value added after normalization.
    #[inline]
    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Tap at horizontal index `i` and vertical index `j`.
    #[inline]
    pub fn weight(&self, i: usize, j: usize) -> f32 {
        self.coefficients[i * self.size as usize + j]
    }

    /// All coefficients, indexed `[i * size + j]`.
    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }
}

const GRADIENT_BIAS: f32 = 128.0;

#[rustfmt::skip]
const GAUSSIAN_SMOOTH: [f32; 9] = [
    1.0, 2.0, 1.0,
    2.0, 4.0, 2.0,
    1.0, 2.0, 1.0,
];

// Rows are the horizontal index `i`: taps left of center are negative.
#[rustfmt::skip]
const SOBEL_X: [f32; 9] = [
    -1.0, -2.0, -1.0,
     0.0,  0.0,  0.0,
     1.0,  2.0,  1.0,
];

// Columns are the vertical index `j`: taps above center are negative.
#[rustfmt::skip]
const SOBEL_Y: [f32; 9] = [
    -1.0, 0.0, 1.0,
    -2.0, 0.0, 2.0,
    -1.0, 0.0, 1.0,
];
