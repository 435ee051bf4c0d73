//! Position-independent per-pixel filters: grayscale, inversion, channel
//! isolation, and pixelwise combination of two images.

use crate::core::buffer::{Bgra, Channel, PixelBuffer};
use crate::core::color::round_to_byte;
use crate::core::error::RawlabResult;
use crate::core::parallel::{map_indexed, map_pixels};
use log::debug;

/// Convert to gray with the unweighted channel mean, `floor((B+G+R)/3)`.
///
/// Alpha is forced to 255.
pub fn grayscale_average(input: &PixelBuffer) -> RawlabResult<PixelBuffer> {
    debug!("grayscale_average {}x{}", input.width(), input.height());
    map_pixels(input, |[b, g, r, _]| {
        let gray = ((u16::from(b) + u16::from(g) + u16::from(r)) / 3) as u8;
        [gray, gray, gray, 255]
    })
}

/// Convert to gray with Rec. 601 weights, rounded to nearest.
///
/// Alpha is forced to 255.
pub fn grayscale_weighted(input: &PixelBuffer) -> RawlabResult<PixelBuffer> {
    debug!("grayscale_weighted {}x{}", input.width(), input.height());
    map_pixels(input, |[b, g, r, _]| {
        let gray = weighted_gray(b, g, r);
        [gray, gray, gray, 255]
    })
}

#[inline]
fn weighted_gray(b: u8, g: u8, r: u8) -> u8 {
    let value = 0.114f32 * f32::from(b) + 0.587f32 * f32::from(g) + 0.299f32 * f32::from(r);
    round_to_byte(f64::from(value))
}

/// Replace each color channel with `255 - value`. Alpha is unchanged.
pub fn invert(input: &PixelBuffer) -> RawlabResult<PixelBuffer> {
    debug!("invert {}x{}", input.width(), input.height());
    map_pixels(input, |[b, g, r, a]| [255 - b, 255 - g, 255 - r, a])
}

/// Keep only `channel` and alpha; the other color channels are zero.
pub fn extract_channel(input: &PixelBuffer, channel: Channel) -> RawlabResult<PixelBuffer> {
    debug!(
        "extract_channel {} {}x{}",
        channel,
        input.width(),
        input.height()
    );
    let source = input.pixels();
    let c = channel.index();
    map_indexed(input, |i, px| {
        px[c] = source[i][c];
        px[3] = source[i][3];
    })
}

/// Blue channel only.
pub fn blue_channel(input: &PixelBuffer) -> RawlabResult<PixelBuffer> {
    extract_channel(input, Channel::Blue)
}

/// Green channel only.
pub fn green_channel(input: &PixelBuffer) -> RawlabResult<PixelBuffer> {
    extract_channel(input, Channel::Green)
}

/// Red channel only.
pub fn red_channel(input: &PixelBuffer) -> RawlabResult<PixelBuffer> {
    extract_channel(input, Channel::Red)
}

/// Combine two images channel by channel.
///
/// `f` is applied to the blue, green and red bytes of corresponding pixels;
/// alpha is forced to 255.
///
/// # Errors
///
/// Returns [`crate::core::error::RawlabError::DimensionMismatch`] when the
/// images differ in size.
pub fn combine_binary<F>(
    first: &PixelBuffer,
    second: &PixelBuffer,
    f: F,
) -> RawlabResult<PixelBuffer>
where
    F: Fn(u8, u8) -> u8 + Sync + Send,
{
    first.ensure_same_dimensions(second)?;
    debug!("combine_binary {}x{}", first.width(), first.height());
    let (a, b) = (first.pixels(), second.pixels());
    map_indexed(first, |i, px| {
        let (p, q): (Bgra, Bgra) = (a[i], b[i]);
        *px = [f(p[0], q[0]), f(p[1], q[1]), f(p[2], q[2]), 255];
    })
}
