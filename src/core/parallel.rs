//! Fork-join helpers shared by the kernels.
//!
//! Every helper allocates the output, hands each rayon task a disjoint
//! mutable slice of it, and only gives tasks shared references to inputs.
//! Row helpers split by `stride`; pixel helpers split by flat pixel index.

use crate::core::buffer::{Bgra, PixelBuffer, BYTES_PER_PIXEL};
use crate::core::error::RawlabResult;
use rayon::prelude::*;

/// Allocate a `width x height` buffer and fill it row by row in parallel.
///
/// `fill` receives the output row index and that row's pixels, zeroed.
pub fn map_rows<F>(width: u32, height: u32, fill: F) -> RawlabResult<PixelBuffer>
where
    F: Fn(usize, &mut [Bgra]) + Sync + Send,
{
    let mut output = PixelBuffer::new(width, height)?;
    if output.is_empty() {
        return Ok(output);
    }
    let stride = output.stride();
    output
        .as_bytes_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| fill(y, bytemuck::cast_slice_mut(row)));
    Ok(output)
}

/// Apply a position-independent transform to every pixel of `input`.
pub fn map_pixels<F>(input: &PixelBuffer, transform: F) -> RawlabResult<PixelBuffer>
where
    F: Fn(Bgra) -> Bgra + Sync + Send,
{
    let source = input.pixels();
    let width = input.width() as usize;
    map_rows(input.width(), input.height(), |y, row| {
        let src_row = &source[y * width..(y + 1) * width];
        for (dst, &src) in row.iter_mut().zip(src_row) {
            *dst = transform(src);
        }
    })
}

/// Fill a zeroed buffer with the same dimensions as `input`, one pixel per
/// task, addressed by flat index.
pub fn map_indexed<F>(input: &PixelBuffer, fill: F) -> RawlabResult<PixelBuffer>
where
    F: Fn(usize, &mut Bgra) + Sync + Send,
{
    let mut output = PixelBuffer::new(input.width(), input.height())?;
    output
        .as_bytes_mut()
        .par_chunks_exact_mut(BYTES_PER_PIXEL)
        .enumerate()
        .for_each(|(i, px)| {
            let px: &mut Bgra = bytemuck::from_bytes_mut(px);
            fill(i, px);
        });
    Ok(output)
}
