//! Transform filters: Rotate, Flip, Scale, Mosaic
//!
//! Rotations and flips move whole pixels. Scaling interpolates every channel,
//! alpha included. Invalid parameters on scale and mosaic are not errors:
//! those filters log a warning and return an unmodified copy.

use crate::core::buffer::{Bgra, PixelBuffer};
use crate::core::error::RawlabResult;
use crate::core::parallel::map_rows;
use log::{debug, warn};
use rayon::prelude::*;

/// Rotate 90 degrees clockwise.
///
/// Source `(x, y)` lands at `(height - 1 - y, x)`; the output is
/// `height x width`.
pub fn rotate_right(input: &PixelBuffer) -> RawlabResult<PixelBuffer> {
    debug!("rotate_right {}x{}", input.width(), input.height());
    let (w, h) = (input.width() as usize, input.height() as usize);
    let source = input.pixels();
    // Output row `dy` is source column `dy`, read bottom to top.
    map_rows(input.height(), input.width(), |dy, row| {
        for (dx, px) in row.iter_mut().enumerate() {
            *px = source[(h - 1 - dx) * w + dy];
        }
    })
}

/// Rotate 90 degrees counter-clockwise.
///
/// Source `(x, y)` lands at `(y, width - 1 - x)`; the output is
/// `height x width`.
pub fn rotate_left(input: &PixelBuffer) -> RawlabResult<PixelBuffer> {
    debug!("rotate_left {}x{}", input.width(), input.height());
    let w = input.width() as usize;
    let source = input.pixels();
    map_rows(input.height(), input.width(), |dy, row| {
        let sx = w - 1 - dy;
        for (dx, px) in row.iter_mut().enumerate() {
            *px = source[dx * w + sx];
        }
    })
}

/// Mirror top to bottom.
pub fn flip_vertical(input: &PixelBuffer) -> RawlabResult<PixelBuffer> {
    debug!("flip_vertical {}x{}", input.width(), input.height());
    let h = input.height();
    map_rows(input.width(), h, |y, row| {
        row.copy_from_slice(input.row(h - 1 - y as u32));
    })
}

/// Mirror left to right, reversing whole pixels.
pub fn flip_horizontal(input: &PixelBuffer) -> RawlabResult<PixelBuffer> {
    debug!("flip_horizontal {}x{}", input.width(), input.height());
    map_rows(input.width(), input.height(), |y, row| {
        row.copy_from_slice(input.row(y as u32));
        row.reverse();
    })
}

/// Resize by `factor` with bilinear interpolation.
///
/// The output is `floor(width * factor) x floor(height * factor)`. Each
/// output channel blends the four surrounding source pixels and is
/// truncated to a byte. A negative or non-finite factor returns an
/// unmodified copy.
pub fn scale_bilinear(input: &PixelBuffer, factor: f64) -> RawlabResult<PixelBuffer> {
    if !factor.is_finite() || factor < 0.0 {
        warn!("scale_bilinear: invalid factor {factor}, returning copy");
        return input.try_clone();
    }
    let (src_w, src_h) = (input.width(), input.height());
    let new_w = scaled_dimension(src_w, factor);
    let new_h = scaled_dimension(src_h, factor);
    debug!("scale_bilinear {src_w}x{src_h} -> {new_w}x{new_h} (factor {factor})");
    if src_w == 0 || src_h == 0 {
        return PixelBuffer::new(new_w, new_h);
    }

    let source = input.pixels();
    let (w, h) = (src_w as usize, src_h as usize);
    map_rows(new_w, new_h, |ny, row| {
        let (y1, y2, dy) = sample_axis(ny, factor, h);
        for (nx, px) in row.iter_mut().enumerate() {
            let (x1, x2, dx) = sample_axis(nx, factor, w);
            let p11 = source[y1 * w + x1];
            let p12 = source[y1 * w + x2];
            let p21 = source[y2 * w + x1];
            let p22 = source[y2 * w + x2];
            for c in 0..4 {
                let value = bilinear(
                    f64::from(p11[c]),
                    f64::from(p12[c]),
                    f64::from(p21[c]),
                    f64::from(p22[c]),
                    dx,
                    dy,
                );
                px[c] = value.clamp(0.0, 255.0) as u8;
            }
        }
    })
}

fn scaled_dimension(dimension: u32, factor: f64) -> u32 {
    // Saturates on overflow; allocation then reports the failure.
    (f64::from(dimension) * factor).floor() as u32
}

/// Source neighbours and blend weight along one axis.
#[inline]
fn sample_axis(n: usize, factor: f64, len: usize) -> (usize, usize, f64) {
    let src = n as f64 / factor;
    let i1 = (src.floor() as usize).min(len - 1);
    let i2 = (i1 + 1).min(len - 1);
    (i1, i2, src - i1 as f64)
}

#[inline]
fn bilinear(v11: f64, v12: f64, v21: f64, v22: f64, dx: f64, dy: f64) -> f64 {
    (1.0 - dx) * (1.0 - dy) * v11 + dx * (1.0 - dy) * v12 + (1.0 - dx) * dy * v21 + dx * dy * v22
}

/// Pixelate into `cell_size x cell_size` blocks.
///
/// Every pixel of a block takes the block's truncated mean blue, green and
/// red; alpha is kept per pixel. Blocks on the right and bottom edges are
/// clipped to the image. A cell size below 2 or larger than either dimension
/// returns an unmodified copy.
pub fn mosaic(input: &PixelBuffer, cell_size: u32) -> RawlabResult<PixelBuffer> {
    let (w, h) = input.dimensions();
    if cell_size < 2 || cell_size > w || cell_size > h {
        warn!("mosaic: cell size {cell_size} invalid for {w}x{h}, returning copy");
        return input.try_clone();
    }
    debug!("mosaic {w}x{h} cell {cell_size}");

    let mut output = PixelBuffer::new(w, h)?;
    let cell = cell_size as usize;
    let width = w as usize;
    let band = output.stride() * cell;
    let source = input.pixels();

    // One task per band of block rows.
    output
        .as_bytes_mut()
        .par_chunks_mut(band)
        .enumerate()
        .for_each(|(r, band_bytes)| {
            let band_px: &mut [Bgra] = bytemuck::cast_slice_mut(band_bytes);
            let start_y = r * cell;
            let rows = band_px.len() / width;
            for start_x in (0..width).step_by(cell) {
                let end_x = (start_x + cell).min(width);
                let [avg_b, avg_g, avg_r] =
                    block_average(source, width, start_x, end_x, start_y, start_y + rows);
                for local_y in 0..rows {
                    let src_row = (start_y + local_y) * width;
                    for x in start_x..end_x {
                        let alpha = source[src_row + x][3];
                        band_px[local_y * width + x] = [avg_b, avg_g, avg_r, alpha];
                    }
                }
            }
        });
    Ok(output)
}

/// Truncated mean of the blue, green and red channels over a block.
fn block_average(
    source: &[Bgra],
    width: usize,
    start_x: usize,
    end_x: usize,
    start_y: usize,
    end_y: usize,
) -> [u8; 3] {
    let mut totals = [0u64; 3];
    for y in start_y..end_y {
        for px in &source[y * width + start_x..y * width + end_x] {
            for c in 0..3 {
                totals[c] += u64::from(px[c]);
            }
        }
    }
    let count = ((end_x - start_x) * (end_y - start_y)) as u64;
    totals.map(|t| (t / count) as u8)
}
