//! Conversion between compressed image files and [`PixelBuffer`].
//!
//! Decoding and encoding are delegated to the `image` crate. Its RGBA
//! layout is swizzled to BGRA on the way in and back on the way out, so
//! kernels only ever see BGRA8.

use crate::core::buffer::PixelBuffer;
use crate::core::error::{CodecError, CodecResult, RawlabResult};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageFormat, Rgba, RgbaImage};
use log::debug;
use std::io::Cursor;
use std::path::Path;

/// JPEG quality used when saving by extension.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Target format for [`encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossless PNG.
    Png,
    /// Baseline JPEG at the given quality (1-100). Alpha is dropped.
    Jpeg {
        /// Encoder quality.
        quality: u8,
    },
    /// Uncompressed BMP.
    Bmp,
    /// Lossless WebP.
    WebP,
}

impl OutputFormat {
    /// Pick a format from a file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> CodecResult<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg {
                quality: DEFAULT_JPEG_QUALITY,
            }),
            "bmp" => Ok(Self::Bmp),
            "webp" => Ok(Self::WebP),
            other => Err(CodecError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Pick a format from the extension of `path`.
    pub fn from_path(path: &Path) -> CodecResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| CodecError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_extension(ext)
    }
}

/// Convert an RGBA image to a BGRA buffer.
pub fn from_rgba_image(image: &RgbaImage) -> RawlabResult<PixelBuffer> {
    let mut bytes = image.as_raw().clone();
    for px in bytes.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
    PixelBuffer::from_raw(image.width(), image.height(), bytes)
}

/// Convert a BGRA buffer to an RGBA image.
pub fn to_rgba_image(buffer: &PixelBuffer) -> RgbaImage {
    RgbaImage::from_fn(buffer.width(), buffer.height(), |x, y| {
        let [b, g, r, a] = buffer.pixel(x, y);
        Rgba([r, g, b, a])
    })
}

/// Decode an image file held in memory.
///
/// Any format the enabled `image` features understand is accepted; the
/// result is always BGRA8.
pub fn decode(bytes: &[u8]) -> RawlabResult<PixelBuffer> {
    if bytes.is_empty() {
        return Err(CodecError::EmptyInput.into());
    }
    let image = image::load_from_memory(bytes).map_err(CodecError::Decode)?;
    debug!("decoded {}x{} {:?}", image.width(), image.height(), image.color());
    from_rgba_image(&image.to_rgba8())
}

/// Read and decode an image file.
pub fn open(path: impl AsRef<Path>) -> RawlabResult<PixelBuffer> {
    let bytes = std::fs::read(path.as_ref()).map_err(CodecError::Io)?;
    decode(&bytes)
}

/// Encode a buffer in the given format.
pub fn encode(buffer: &PixelBuffer, format: OutputFormat) -> RawlabResult<Vec<u8>> {
    debug!(
        "encoding {}x{} as {:?}",
        buffer.width(),
        buffer.height(),
        format
    );
    let rgba = to_rgba_image(buffer);
    let mut out = Vec::new();
    match format {
        OutputFormat::Jpeg { quality } => {
            let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
            encoder
                .encode(&rgb, rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                .map_err(CodecError::Encode)?;
        }
        OutputFormat::Png | OutputFormat::Bmp | OutputFormat::WebP => {
            let target = match format {
                OutputFormat::Png => ImageFormat::Png,
                OutputFormat::Bmp => ImageFormat::Bmp,
                _ => ImageFormat::WebP,
            };
            DynamicImage::ImageRgba8(rgba)
                .write_to(&mut Cursor::new(&mut out), target)
                .map_err(CodecError::Encode)?;
        }
    }
    Ok(out)
}

/// Encode a buffer and write it to `path`, choosing the format from the
/// extension (`png`, `jpg`/`jpeg`, `bmp`, `webp`).
pub fn save(buffer: &PixelBuffer, path: impl AsRef<Path>) -> RawlabResult<()> {
    let path = path.as_ref();
    let format = OutputFormat::from_path(path)?;
    let bytes = encode(buffer, format)?;
    std::fs::write(path, bytes).map_err(CodecError::Io)?;
    debug!("saved {}", path.display());
    Ok(())
}
