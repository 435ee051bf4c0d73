//! Scalar color-space math.
//!
//! BT.601 luma and the full-range YCbCr transform used by the histogram
//! equalizer. All functions are pure; only [`rgb_to_cbcr`] and
//! [`cbcr_to_rgb`] clamp.

/// Rec. 601 luma weights, red/green/blue.
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Chroma offset for 8-bit YCbCr.
const CHROMA_OFFSET: f64 = 128.0;

/// Weighted brightness of an RGB triple. Not clamped or rounded.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    LUMA_WEIGHTS[0] * f64::from(r) + LUMA_WEIGHTS[1] * f64::from(g) + LUMA_WEIGHTS[2] * f64::from(b)
}

/// Histogram bin of an RGB triple: luma rounded and clamped to a byte.
#[inline]
pub fn luma_bin(r: u8, g: u8, b: u8) -> u8 {
    round_to_byte(luma(r, g, b))
}

/// Round to nearest (ties to even) and clamp to `[0, 255]`.
#[inline]
pub fn round_to_byte(value: f64) -> u8 {
    value.round_ties_even().clamp(0.0, 255.0) as u8
}

/// Clamp to `[0, 255]` and truncate toward zero.
#[inline]
pub fn truncate_to_byte(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

/// Chroma components of an RGB triple, each clamped to `[0, 255]`.
#[inline]
pub fn rgb_to_cbcr(r: u8, g: u8, b: u8) -> (f64, f64) {
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    let cb = -0.168736 * r - 0.331264 * g + 0.5 * b + CHROMA_OFFSET;
    let cr = 0.5 * r - 0.418688 * g - 0.081312 * b + CHROMA_OFFSET;
    (cb.clamp(0.0, 255.0), cr.clamp(0.0, 255.0))
}

/// Inverse of [`rgb_to_cbcr`] for a given luma. Returns `(r, g, b)`.
#[inline]
pub fn cbcr_to_rgb(y: f64, cb: f64, cr: f64) -> (u8, u8, u8) {
    let dcb = cb - CHROMA_OFFSET;
    let dcr = cr - CHROMA_OFFSET;
    let r = round_to_byte(y + 1.402 * dcr);
    let g = round_to_byte(y - 0.344136 * dcb - 0.714136 * dcr);
    let b = round_to_byte(y + 1.772 * dcb);
    (r, g, b)
}
