//! Intensity histograms and histogram equalization.

use crate::core::buffer::{Bgra, Channel, PixelBuffer};
use crate::core::color::{cbcr_to_rgb, luma_bin, rgb_to_cbcr, round_to_byte};
use crate::core::error::RawlabResult;
use crate::core::parallel::map_pixels;
use log::debug;
use rayon::prelude::*;

/// Number of bins, one per byte value.
pub const BINS: usize = 256;

/// A 256-bin count of byte intensities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; BINS],
}

impl Histogram {
    /// Count one bin per pixel, chosen by `bin`.
    pub fn collect<F>(input: &PixelBuffer, bin: F) -> Self
    where
        F: Fn(Bgra) -> u8 + Sync + Send,
    {
        let bins = input
            .pixels()
            .par_iter()
            .fold(
                || [0u64; BINS],
                |mut acc, &px| {
                    acc[usize::from(bin(px))] += 1;
                    acc
                },
            )
            .reduce(
                || [0u64; BINS],
                |mut a, b| {
                    for (x, y) in a.iter_mut().zip(b.iter()) {
                        *x += y;
                    }
                    a
                },
            );
        Self { bins }
    }

    /// Counts per intensity.
    pub fn bins(&self) -> &[u64; BINS] {
        &self.bins
    }

    /// Number of counted pixels.
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Running sum of the bins.
    pub fn cumulative(&self) -> [u64; BINS] {
        let mut cdf = [0u64; BINS];
        let mut running = 0;
        for (out, &count) in cdf.iter_mut().zip(self.bins.iter()) {
            running += count;
            *out = running;
        }
        cdf
    }

    /// Remap table that spreads the cumulative distribution over `0..=255`.
    ///
    /// `map[i] = round((cdf[i] - min_cdf) * 255 / (total - min_cdf))` where
    /// `min_cdf` is the first nonzero cumulative count. Returns `None` when
    /// the histogram is empty or every pixel falls in one bin.
    pub fn equalization_map(&self) -> Option<[u8; BINS]> {
        let cdf = self.cumulative();
        let total = cdf[BINS - 1];
        let min_cdf = cdf.iter().copied().find(|&c| c != 0).unwrap_or(0);
        if total == 0 || min_cdf == total {
            return None;
        }

        let factor = 255.0 / (total - min_cdf) as f64;
        let mut map = [0u8; BINS];
        for (out, &c) in map.iter_mut().zip(cdf.iter()) {
            // Bins below the first occupied one have cdf 0 < min_cdf.
            let offset = c.saturating_sub(min_cdf) as f64;
            *out = round_to_byte(offset * factor);
        }
        Some(map)
    }
}

/// Histogram of one channel's byte values.
pub fn channel_histogram(input: &PixelBuffer, channel: Channel) -> Histogram {
    let c = channel.index();
    Histogram::collect(input, |px| px[c])
}

/// Histogram of rounded Rec. 601 luma.
pub fn luma_histogram(input: &PixelBuffer) -> Histogram {
    Histogram::collect(input, |[b, g, r, _]| luma_bin(r, g, b))
}

/// Equalize a gray image.
///
/// The blue channel stands in for intensity: its remapped value is written
/// to B, G and R. Alpha is kept. An image with a single intensity, or no
/// pixels, comes back as an unmodified copy.
pub fn equalize_grayscale(input: &PixelBuffer) -> RawlabResult<PixelBuffer> {
    debug!("equalize_grayscale {}x{}", input.width(), input.height());
    let Some(map) = channel_histogram(input, Channel::Blue).equalization_map() else {
        debug!("equalize_grayscale: flat histogram, returning copy");
        return input.try_clone();
    };
    map_pixels(input, move |[b, _, _, a]| {
        let v = map[usize::from(b)];
        [v, v, v, a]
    })
}

/// Equalize the luma of a color image while keeping its chroma.
///
/// Each pixel is split into luma and Cb/Cr, its luma bin is remapped, and
/// the pixel is rebuilt from the new luma and the original chroma. Alpha
/// is kept. Degenerate histograms return an unmodified copy.
pub fn equalize_full_color(input: &PixelBuffer) -> RawlabResult<PixelBuffer> {
    debug!("equalize_full_color {}x{}", input.width(), input.height());
    let Some(map) = luma_histogram(input).equalization_map() else {
        debug!("equalize_full_color: flat histogram, returning copy");
        return input.try_clone();
    };
    map_pixels(input, move |[b, g, r, a]| {
        let (cb, cr) = rgb_to_cbcr(r, g, b);
        let y = f64::from(map[usize::from(luma_bin(r, g, b))]);
        let (r, g, b) = cbcr_to_rgb(y, cb, cr);
        [b, g, r, a]
    })
}
