//! Filter module.
//!
//! Every filter is a free function that reads an immutable
//! [`PixelBuffer`](crate::core::PixelBuffer) and returns a freshly allocated
//! one (plus a mask for the noise filters).

pub mod convolution;
pub mod edge;
pub mod geometry;
pub mod histogram;
pub mod noise;
pub mod point;

pub use convolution::{convolve_full_color, convolve_grayscale, smooth};
pub use edge::{edge_detect, gradient_magnitude};
pub use geometry::{flip_horizontal, flip_vertical, mosaic, rotate_left, rotate_right, scale_bilinear};
pub use histogram::{
    channel_histogram, equalize_full_color, equalize_grayscale, luma_histogram, Histogram,
};
pub use noise::{
    gaussian_noise, gaussian_noise_with, gaussian_noise_with_rng, salt_and_pepper_noise,
    salt_and_pepper_noise_with_rng, GaussianNoiseConfig, NoiseResult, TrailingPixel,
};
pub use point::{
    blue_channel, combine_binary, extract_channel, grayscale_average, grayscale_weighted,
    green_channel, invert, red_channel,
};
