//! Raw BGRA8 bitmap storage.
//!
//! A [`PixelBuffer`] owns a flat byte buffer with exactly four bytes per
//! pixel in blue, green, red, alpha order. Pixel `(x, y)` starts at byte
//! `(y * width + x) * 4`. Typed views reinterpret the bytes as `[u8; 4]`
//! pixels through `bytemuck`, which cannot fail because the pixel type has
//! byte alignment.

use crate::core::error::{RawlabError, RawlabResult};
use std::fmt;

/// Bytes per pixel in the BGRA8 layout.
pub const BYTES_PER_PIXEL: usize = 4;

/// A single BGRA8 pixel.
pub type Bgra = [u8; 4];

/// Opaque black.
pub const BLACK: Bgra = [0, 0, 0, 255];

/// Opaque white.
pub const WHITE: Bgra = [255, 255, 255, 255];

/// Opaque mid-gray, the neutral value for noise masks.
pub const MID_GRAY: Bgra = [128, 128, 128, 255];

/// Build an opaque gray pixel.
#[inline]
pub const fn gray(value: u8) -> Bgra {
    [value, value, value, 255]
}

/// Color channel of a BGRA8 pixel, with its byte offset as discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Byte 0.
    Blue = 0,
    /// Byte 1.
    Green = 1,
    /// Byte 2.
    Red = 2,
    /// Byte 3.
    Alpha = 3,
}

impl Channel {
    /// Byte offset of this channel within a pixel.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The three color channels, in memory order.
    pub const COLOR: [Channel; 3] = [Channel::Blue, Channel::Green, Channel::Red];
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Blue => write!(f, "blue"),
            Channel::Green => write!(f, "green"),
            Channel::Red => write!(f, "red"),
            Channel::Alpha => write!(f, "alpha"),
        }
    }
}

/// An owned, uncompressed BGRA8 bitmap.
///
/// The invariant `bytes.len() == width * height * 4` holds for every
/// constructed value. Operations borrow a buffer immutably and return a new
/// one; nothing in this crate mutates an input.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a zero-filled buffer.
    ///
    /// # Errors
    ///
    /// Returns [`RawlabError::DimensionOverflow`] if `width * height * 4`
    /// does not fit in `usize`, or [`RawlabError::Allocation`] if the
    /// allocator refuses the request.
    pub fn new(width: u32, height: u32) -> RawlabResult<Self> {
        let len = byte_len(width, height)?;
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(len)
            .map_err(|_| RawlabError::Allocation { bytes: len })?;
        bytes.resize(len, 0);
        Ok(Self {
            width,
            height,
            bytes,
        })
    }

    /// Wrap an existing BGRA8 byte vector.
    ///
    /// # Errors
    ///
    /// Returns [`RawlabError::InvalidBufferLength`] if the length does not
    /// match the dimensions.
    pub fn from_raw(width: u32, height: u32, bytes: Vec<u8>) -> RawlabResult<Self> {
        let expected = byte_len(width, height)?;
        if bytes.len() != expected {
            return Err(RawlabError::InvalidBufferLength {
                width,
                height,
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            width,
            height,
            bytes,
        })
    }

    /// Build a buffer by evaluating `f` at every coordinate.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> RawlabResult<Self>
    where
        F: FnMut(u32, u32) -> Bgra,
    {
        let mut buffer = Self::new(width, height)?;
        for y in 0..height {
            for x in 0..width {
                buffer.set_pixel(x, y, f(x, y));
            }
        }
        Ok(buffer)
    }

    /// Deep copy with fallible allocation.
    pub fn try_clone(&self) -> RawlabResult<Self> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(self.bytes.len())
            .map_err(|_| RawlabError::Allocation {
                bytes: self.bytes.len(),
            })?;
        bytes.extend_from_slice(&self.bytes);
        Ok(Self {
            width: self.width,
            height: self.height,
            bytes,
        })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.bytes.len() / BYTES_PER_PIXEL
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// True when either dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw BGRA8 bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable raw BGRA8 bytes.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Consume the buffer, returning its bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.bytes
    }

    /// Typed pixel view.
    #[inline]
    pub fn pixels(&self) -> &[Bgra] {
        bytemuck::cast_slice(&self.bytes)
    }

    /// Mutable typed pixel view.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Bgra] {
        bytemuck::cast_slice_mut(&mut self.bytes)
    }

    /// Pixels of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[Bgra] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.pixels()[start..start + w]
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Bgra {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.pixels()[self.index(x, y)]
    }

    /// Overwrite the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Bgra) {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.index(x, y);
        self.pixels_mut()[i] = pixel;
    }

    /// Check that `other` has the same dimensions.
    pub fn ensure_same_dimensions(&self, other: &PixelBuffer) -> RawlabResult<()> {
        if self.dimensions() != other.dimensions() {
            return Err(RawlabError::mismatch(self.dimensions(), other.dimensions()));
        }
        Ok(())
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

fn byte_len(width: u32, height: u32) -> RawlabResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
        .ok_or(RawlabError::DimensionOverflow { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let buffer = PixelBuffer::new(3, 2).unwrap();
        assert_eq!(buffer.as_bytes().len(), 24);
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(buffer.pixel_count(), 6);
        assert_eq!(buffer.stride(), 12);
    }

    #[test]
    fn test_from_raw_rejects_wrong_length() {
        let result = PixelBuffer::from_raw(2, 2, vec![0; 15]);
        assert!(matches!(
            result,
            Err(RawlabError::InvalidBufferLength {
                expected: 16,
                actual: 15,
                ..
            })
        ));
    }

    #[test]
    fn test_pixel_addressing() {
        let mut buffer = PixelBuffer::new(4, 3).unwrap();
        buffer.set_pixel(2, 1, [1, 2, 3, 4]);
        let offset = (4 + 2) * 4;
        assert_eq!(&buffer.as_bytes()[offset..offset + 4], &[1, 2, 3, 4]);
        assert_eq!(buffer.pixel(2, 1), [1, 2, 3, 4]);
        assert_eq!(buffer.row(1)[2], [1, 2, 3, 4]);
    }

    #[test]
    fn test_try_clone_is_deep() {
        let original = PixelBuffer::from_fn(2, 2, |x, y| gray((x + y) as u8)).unwrap();
        let mut copy = original.try_clone().unwrap();
        copy.set_pixel(0, 0, WHITE);
        assert_eq!(original.pixel(0, 0), gray(0));
        assert_ne!(original, copy);
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = PixelBuffer::new(0, 5).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.pixels().len(), 0);
    }

    #[test]
    fn test_dimension_check() {
        let a = PixelBuffer::new(2, 3).unwrap();
        let b = PixelBuffer::new(3, 2).unwrap();
        assert!(a.ensure_same_dimensions(&a).is_ok());
        assert!(matches!(
            a.ensure_same_dimensions(&b),
            Err(RawlabError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_channel_offsets() {
        assert_eq!(Channel::Blue.index(), 0);
        assert_eq!(Channel::Green.index(), 1);
        assert_eq!(Channel::Red.index(), 2);
        assert_eq!(Channel::Alpha.index(), 3);
        assert_eq!(Channel::Red.to_string(), "red");
    }
}
