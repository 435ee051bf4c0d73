//! Stochastic noise: salt-and-pepper and additive Gaussian.
//!
//! Both filters return the noisy image together with a mask that shows
//! where and how strongly pixels were perturbed.
//!
//! Randomness is explicit. The `_with_rng` variants draw one base seed from
//! the caller's generator and derive an independent [`StdRng`] per work
//! partition, so a seeded caller gets the same output no matter how rayon
//! schedules the partitions. The plain variants seed from [`rand::rng`].

use crate::core::buffer::{gray, Bgra, PixelBuffer, BLACK, MID_GRAY, WHITE};
use crate::core::color::truncate_to_byte;
use crate::core::error::RawlabResult;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::f64::consts::PI;

/// Highest salt-and-pepper intensity; larger values are clamped.
pub const MAX_INTENSITY: u32 = 100;

/// Pixel pairs handled by one Gaussian noise task.
const PAIRS_PER_TASK: usize = 4096;

/// A noisy image and its visualization mask, with identical dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseResult {
    /// The perturbed image.
    pub image: PixelBuffer,
    /// Per-pixel visualization of the perturbation.
    pub mask: PixelBuffer,
}

/// What to do with the last pixel when the pixel count is odd.
///
/// Gaussian noise consumes pixels in Box-Muller pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingPixel {
    /// Perturb the unpaired pixel with the first sample of a fresh pair.
    #[default]
    Perturb,
    /// Leave the unpaired pixel as in the input, with a zeroed mask pixel.
    Skip,
}

/// Parameters for [`gaussian_noise_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianNoiseConfig {
    /// Standard deviation of the additive noise, in byte units.
    pub sigma: f64,
    /// Handling of an unpaired final pixel.
    pub trailing: TrailingPixel,
}

impl GaussianNoiseConfig {
    /// Create a configuration with the default trailing-pixel policy.
    pub fn new(sigma: f64) -> Self {
        Self {
            sigma,
            trailing: TrailingPixel::default(),
        }
    }

    /// Set the trailing-pixel policy.
    pub fn with_trailing(mut self, trailing: TrailingPixel) -> Self {
        self.trailing = trailing;
        self
    }
}

/// Derive the generator for partition `index` from a base seed.
fn partition_rng(base: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(base ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Add salt-and-pepper noise with `intensity` in `0..=100`.
///
/// See [`salt_and_pepper_noise_with_rng`].
pub fn salt_and_pepper_noise(input: &PixelBuffer, intensity: u32) -> RawlabResult<NoiseResult> {
    salt_and_pepper_noise_with_rng(input, intensity, &mut rand::rng())
}

/// Add salt-and-pepper noise using `rng` as the seed source.
///
/// With `prob = intensity / 2`, each pixel draws an integer in `0..100`:
/// at most `prob` turns it opaque black, at least `100 - prob` opaque
/// white, anything else leaves it untouched. The mask is black or white
/// where the image was hit and mid-gray elsewhere. Intensity 0 touches
/// nothing.
pub fn salt_and_pepper_noise_with_rng<R: Rng + ?Sized>(
    input: &PixelBuffer,
    intensity: u32,
    rng: &mut R,
) -> RawlabResult<NoiseResult> {
    if intensity > MAX_INTENSITY {
        warn!("salt_and_pepper_noise: intensity {intensity} clamped to {MAX_INTENSITY}");
    }
    let prob = f64::from(intensity.min(MAX_INTENSITY)) / 2.0;
    debug!(
        "salt_and_pepper_noise {}x{} prob {prob}",
        input.width(),
        input.height()
    );

    let mut image = input.try_clone()?;
    let mut mask = PixelBuffer::new(input.width(), input.height())?;
    if image.is_empty() {
        return Ok(NoiseResult { image, mask });
    }

    let base: u64 = rng.random();
    let stride = image.stride();
    image
        .as_bytes_mut()
        .par_chunks_mut(stride)
        .zip(mask.as_bytes_mut().par_chunks_mut(stride))
        .enumerate()
        .for_each(|(y, (image_row, mask_row))| {
            let mut rng = partition_rng(base, y);
            let image_row: &mut [Bgra] = bytemuck::cast_slice_mut(image_row);
            let mask_row: &mut [Bgra] = bytemuck::cast_slice_mut(mask_row);
            for (px, m) in image_row.iter_mut().zip(mask_row.iter_mut()) {
                let roll = f64::from(rng.random_range(0u32..100));
                if prob > 0.0 && roll <= prob {
                    *px = BLACK;
                    *m = BLACK;
                } else if prob > 0.0 && roll >= 100.0 - prob {
                    *px = WHITE;
                    *m = WHITE;
                } else {
                    *m = MID_GRAY;
                }
            }
        });

    Ok(NoiseResult { image, mask })
}

/// Add Gaussian noise with standard deviation `sigma`.
///
/// See [`gaussian_noise_with`].
pub fn gaussian_noise(input: &PixelBuffer, sigma: f64) -> RawlabResult<NoiseResult> {
    gaussian_noise_with(input, &GaussianNoiseConfig::new(sigma), &mut rand::rng())
}

/// Add Gaussian noise with standard deviation `sigma`, seeded from `rng`.
pub fn gaussian_noise_with_rng<R: Rng + ?Sized>(
    input: &PixelBuffer,
    sigma: f64,
    rng: &mut R,
) -> RawlabResult<NoiseResult> {
    gaussian_noise_with(input, &GaussianNoiseConfig::new(sigma), rng)
}

/// Add Gaussian noise using the Box-Muller transform.
///
/// Pixels are taken in flat-index pairs. Each pair draws `u1` in `(0, 1]`
/// and `u2` in `[0, 1)` and produces two normal samples `z1`, `z2`, which
/// are added to the blue, green and red channels of the first and second
/// pixel respectively, clamped and truncated. Alpha becomes 255. The mask
/// holds `128 + z` as opaque gray.
pub fn gaussian_noise_with<R: Rng + ?Sized>(
    input: &PixelBuffer,
    config: &GaussianNoiseConfig,
    rng: &mut R,
) -> RawlabResult<NoiseResult> {
    let sigma = if config.sigma.is_finite() {
        config.sigma
    } else {
        warn!("gaussian_noise: non-finite sigma {}, using 0", config.sigma);
        0.0
    };
    debug!(
        "gaussian_noise {}x{} sigma {sigma} trailing {:?}",
        input.width(),
        input.height(),
        config.trailing
    );

    let mut image = input.try_clone()?;
    let mut mask = PixelBuffer::new(input.width(), input.height())?;
    let base: u64 = rng.random();
    let task_len = PAIRS_PER_TASK * 2;
    let trailing = config.trailing;

    image
        .pixels_mut()
        .par_chunks_mut(task_len)
        .zip(mask.pixels_mut().par_chunks_mut(task_len))
        .enumerate()
        .for_each(|(task, (image_px, mask_px))| {
            let mut rng = partition_rng(base, task);
            let mut image_pairs = image_px.chunks_exact_mut(2);
            let mut mask_pairs = mask_px.chunks_exact_mut(2);
            for (pair, mask_pair) in (&mut image_pairs).zip(&mut mask_pairs) {
                let (z1, z2) = box_muller(&mut rng, sigma);
                pair[0] = add_noise(pair[0], z1);
                pair[1] = add_noise(pair[1], z2);
                mask_pair[0] = noise_mask(z1);
                mask_pair[1] = noise_mask(z2);
            }
            let rest = image_pairs.into_remainder();
            let mask_rest = mask_pairs.into_remainder();
            if let (Some(px), Some(m)) = (rest.first_mut(), mask_rest.first_mut()) {
                if trailing == TrailingPixel::Perturb {
                    let (z1, _) = box_muller(&mut rng, sigma);
                    *px = add_noise(*px, z1);
                    *m = noise_mask(z1);
                }
            }
        });

    Ok(NoiseResult { image, mask })
}

/// Two independent normal samples with standard deviation `sigma`.
#[inline]
fn box_muller<R: Rng + ?Sized>(rng: &mut R, sigma: f64) -> (f64, f64) {
    // `random` is in [0, 1); flip it so ln never sees zero.
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    let radius = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * PI * u2;
    (
        sigma * theta.cos() * radius,
        sigma * theta.sin() * radius,
    )
}

#[inline]
fn add_noise([b, g, r, _]: Bgra, z: f64) -> Bgra {
    [
        truncate_to_byte(f64::from(b) + z),
        truncate_to_byte(f64::from(g) + z),
        truncate_to_byte(f64::from(r) + z),
        255,
    ]
}

#[inline]
fn noise_mask(z: f64) -> Bgra {
    gray(truncate_to_byte(128.0 + z))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn checker(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                [40, 80, 120, 200]
            } else {
                [200, 160, 100, 90]
            }
        })
        .unwrap()
    }

    #[test]
    fn test_salt_and_pepper_zero_intensity() {
        let input = checker(9, 7);
        let result = salt_and_pepper_noise_with_rng(&input, 0, &mut seeded()).unwrap();
        assert_eq!(result.image, input);
        assert!(result.mask.pixels().iter().all(|&px| px == MID_GRAY));
    }

    #[test]
    fn test_salt_and_pepper_mask_matches_image() {
        let input = checker(32, 16);
        let result = salt_and_pepper_noise_with_rng(&input, 40, &mut seeded()).unwrap();
        let (mut black, mut white) = (0, 0);
        for ((&out, &m), &orig) in result
            .image
            .pixels()
            .iter()
            .zip(result.mask.pixels())
            .zip(input.pixels())
        {
            match m {
                BLACK => {
                    assert_eq!(out, BLACK);
                    black += 1;
                }
                WHITE => {
                    assert_eq!(out, WHITE);
                    white += 1;
                }
                MID_GRAY => assert_eq!(out, orig),
                other => panic!("unexpected mask pixel {other:?}"),
            }
        }
        assert!(black > 0 && white > 0);
    }

    #[test]
    fn test_salt_and_pepper_full_intensity_hits_everything() {
        let input = checker(10, 10);
        let result = salt_and_pepper_noise_with_rng(&input, 250, &mut seeded()).unwrap();
        assert!(result
            .mask
            .pixels()
            .iter()
            .all(|&px| px == BLACK || px == WHITE));
    }

    #[test]
    fn test_salt_and_pepper_is_reproducible() {
        let input = checker(40, 30);
        let a = salt_and_pepper_noise_with_rng(&input, 20, &mut seeded()).unwrap();
        let b = salt_and_pepper_noise_with_rng(&input, 20, &mut seeded()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_gaussian_zero_sigma_only_forces_alpha() {
        let input = checker(5, 3);
        let result = gaussian_noise_with_rng(&input, 0.0, &mut seeded()).unwrap();
        for (&out, &orig) in result.image.pixels().iter().zip(input.pixels()) {
            assert_eq!(out, [orig[0], orig[1], orig[2], 255]);
        }
        assert!(result.mask.pixels().iter().all(|&px| px == MID_GRAY));
    }

    #[test]
    fn test_gaussian_mask_encodes_offset() {
        let input = PixelBuffer::from_fn(8, 8, |_, _| [100, 100, 100, 255]).unwrap();
        let result = gaussian_noise_with_rng(&input, 10.0, &mut seeded()).unwrap();
        for (&out, &m) in result.image.pixels().iter().zip(result.mask.pixels()) {
            assert_eq!(m[0], m[1]);
            assert_eq!(m[1], m[2]);
            assert_eq!(m[3], 255);
            // 100 + z and 128 + z truncate identically away from the clamp bounds.
            assert_eq!(i32::from(out[0]) - 100, i32::from(m[0]) - 128);
        }
        assert!(result.image.pixels().iter().any(|px| px[0] != 100));
    }

    #[test]
    fn test_gaussian_odd_count_perturb() {
        let input = PixelBuffer::from_fn(3, 3, |_, _| [100, 100, 100, 7]).unwrap();
        let config = GaussianNoiseConfig::new(0.0).with_trailing(TrailingPixel::Perturb);
        let result = gaussian_noise_with(&input, &config, &mut seeded()).unwrap();
        let last = result.image.pixels()[8];
        assert_eq!(last, [100, 100, 100, 255]);
        assert_eq!(result.mask.pixels()[8], MID_GRAY);
    }

    #[test]
    fn test_gaussian_odd_count_skip() {
        let input = PixelBuffer::from_fn(3, 3, |_, _| [100, 100, 100, 7]).unwrap();
        let config = GaussianNoiseConfig::new(25.0).with_trailing(TrailingPixel::Skip);
        let result = gaussian_noise_with(&input, &config, &mut seeded()).unwrap();
        assert_eq!(result.image.pixels()[8], [100, 100, 100, 7]);
        assert_eq!(result.mask.pixels()[8], [0, 0, 0, 0]);
        // Paired pixels are still processed.
        assert_eq!(result.image.pixels()[7][3], 255);
    }

    #[test]
    fn test_gaussian_is_reproducible() {
        let input = checker(101, 97);
        let a = gaussian_noise_with_rng(&input, 30.0, &mut seeded()).unwrap();
        let b = gaussian_noise_with_rng(&input, 30.0, &mut seeded()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.image.dimensions(), input.dimensions());
        assert_eq!(a.mask.dimensions(), input.dimensions());
    }

    #[test]
    fn test_gaussian_noise_statistics() {
        let input = PixelBuffer::from_fn(128, 128, |_, _| [128, 128, 128, 255]).unwrap();
        let result = gaussian_noise_with_rng(&input, 20.0, &mut seeded()).unwrap();
        let n = result.image.pixel_count() as f64;
        let mean = result
            .image
            .pixels()
            .iter()
            .map(|px| f64::from(px[0]))
            .sum::<f64>()
            / n;
        let variance = result
            .image
            .pixels()
            .iter()
            .map(|px| (f64::from(px[0]) - mean).powi(2))
            .sum::<f64>()
            / n;
        // Truncation biases the mean slightly below 128.
        assert!((mean - 127.5).abs() < 1.5, "mean {mean}");
        assert!((variance.sqrt() - 20.0).abs() < 1.5, "std {}", variance.sqrt());
    }

    #[test]
    fn test_empty_input() {
        let input = PixelBuffer::new(0, 0).unwrap();
        let result = salt_and_pepper_noise(&input, 50).unwrap();
        assert!(result.image.is_empty() && result.mask.is_empty());
        let result = gaussian_noise(&input, 5.0).unwrap();
        assert!(result.image.is_empty() && result.mask.is_empty());
    }
}
