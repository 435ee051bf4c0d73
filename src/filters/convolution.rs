//! Spatial convolution with replicate-edge borders.

use crate::core::buffer::{Bgra, PixelBuffer};
use crate::core::color::truncate_to_byte;
use crate::core::error::RawlabResult;
use crate::core::kernel::Kernel;
use crate::core::parallel::map_rows;
use log::debug;

/// Convolve the blue, green and red channels independently.
///
/// Each output channel is `clamp(sum / scalar + bias)` truncated to a byte.
/// Samples outside the image use the nearest edge pixel. Alpha is copied
/// from the input pixel under the kernel center.
pub fn convolve_full_color(input: &PixelBuffer, kernel: &Kernel) -> RawlabResult<PixelBuffer> {
    debug!(
        "convolve_full_color {}x{} kernel {}x{}",
        input.width(),
        input.height(),
        kernel.size(),
        kernel.size()
    );
    convolve(input, kernel, |px, sums| {
        [
            finish(sums[0], kernel),
            finish(sums[1], kernel),
            finish(sums[2], kernel),
            px[3],
        ]
    })
}

/// Convolve the blue channel only and write the result to B, G and R.
///
/// Intended for gray input, where blue stands in for intensity. Alpha is
/// copied from the input.
pub fn convolve_grayscale(input: &PixelBuffer, kernel: &Kernel) -> RawlabResult<PixelBuffer> {
    debug!(
        "convolve_grayscale {}x{} kernel {}x{}",
        input.width(),
        input.height(),
        kernel.size(),
        kernel.size()
    );
    convolve(input, kernel, |px, sums| {
        let value = finish(sums[0], kernel);
        [value, value, value, px[3]]
    })
}

/// Blur with the 3x3 Gaussian preset.
pub fn smooth(input: &PixelBuffer) -> RawlabResult<PixelBuffer> {
    convolve_full_color(input, &Kernel::gaussian_smooth())
}

#[inline]
fn finish(sum: f32, kernel: &Kernel) -> u8 {
    truncate_to_byte(f64::from(sum / kernel.scalar() + kernel.bias()))
}

/// Shared row-parallel driver. `write` receives the center pixel and the
/// weighted B, G, R sums.
fn convolve<F>(input: &PixelBuffer, kernel: &Kernel, write: F) -> RawlabResult<PixelBuffer>
where
    F: Fn(Bgra, [f32; 3]) -> Bgra + Sync + Send,
{
    let (w, h) = input.dimensions();
    let size = kernel.size() as usize;
    let off = kernel.offset();
    let max_x = i64::from(w) - 1;
    let max_y = i64::from(h) - 1;

    map_rows(w, h, |y, row| {
        // Source rows for each vertical tap, clamped once per output row.
        let rows: Vec<&[Bgra]> = (0..size)
            .map(|j| {
                let sy = (y as i64 + j as i64 - off).clamp(0, max_y);
                input.row(sy as u32)
            })
            .collect();
        let center = input.row(y as u32);

        for (x, out) in row.iter_mut().enumerate() {
            let mut sums = [0f32; 3];
            for i in 0..size {
                let sx = (x as i64 + i as i64 - off).clamp(0, max_x) as usize;
                for (j, source) in rows.iter().enumerate() {
                    let weight = kernel.weight(i, j);
                    let px = source[sx];
                    sums[0] += f32::from(px[0]) * weight;
                    sums[1] += f32::from(px[1]) * weight;
                    sums[2] += f32::from(px[2]) * weight;
                }
            }
            *out = write(center[x], sums);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::from_fn(w, h, |x, y| {
            [
                (x * 31 % 256) as u8,
                (y * 47 % 256) as u8,
                ((x * y) % 256) as u8,
                (50 + x + y) as u8,
            ]
        })
        .unwrap()
    }

    #[test]
    fn test_identity_kernel_is_noop() {
        let input = gradient(7, 5);
        let kernel = Kernel::identity(3).unwrap();
        assert_eq!(convolve_full_color(&input, &kernel).unwrap(), input);

        let kernel = Kernel::identity(5).unwrap();
        assert_eq!(convolve_full_color(&input, &kernel).unwrap(), input);
    }

    #[test]
    fn test_box_blur_on_flat_image() {
        let input = PixelBuffer::from_fn(4, 4, |_, _| [90, 60, 30, 200]).unwrap();
        let kernel = Kernel::from_coefficients(vec![1.0; 9]).unwrap();
        let output = convolve_full_color(&input, &kernel).unwrap();
        // Replicated borders keep a flat image flat, corners included.
        assert_eq!(output, input);
    }

    #[test]
    fn test_replicate_edge_sampling() {
        // 3x1: horizontal box blur at x=0 samples x=0 twice and x=1 once.
        let input =
            PixelBuffer::from_raw(3, 1, vec![0, 0, 0, 255, 30, 30, 30, 255, 90, 90, 90, 255])
                .unwrap();
        #[rustfmt::skip]
        let kernel = Kernel::new(3, vec![
            0.0, 1.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 1.0, 0.0,
        ], 3.0)
        .unwrap();
        let output = convolve_full_color(&input, &kernel).unwrap();
        assert_eq!(output.pixel(0, 0)[0], 10);
        assert_eq!(output.pixel(1, 0)[0], 40);
        assert_eq!(output.pixel(2, 0)[0], 70);
    }

    #[test]
    fn test_truncates_and_clamps() {
        let input = PixelBuffer::from_raw(1, 1, vec![10, 200, 255, 9]).unwrap();
        let kernel = Kernel::new(1, vec![1.0], 3.0).unwrap();
        let output = convolve_full_color(&input, &kernel).unwrap();
        // 10/3 = 3.33, 200/3 = 66.67, 255/3 = 85
        assert_eq!(output.pixel(0, 0), [3, 66, 85, 9]);

        let kernel = Kernel::new(1, vec![-1.0], 1.0).unwrap().with_bias(300.0).unwrap();
        let output = convolve_full_color(&input, &kernel).unwrap();
        assert_eq!(output.pixel(0, 0), [255, 100, 45, 9]);
    }

    #[test]
    fn test_grayscale_uses_blue() {
        let input = PixelBuffer::from_raw(1, 1, vec![40, 200, 7, 77]).unwrap();
        let kernel = Kernel::identity(3).unwrap();
        let output = convolve_grayscale(&input, &kernel).unwrap();
        assert_eq!(output.pixel(0, 0), [40, 40, 40, 77]);
    }

    #[test]
    fn test_sobel_responds_to_horizontal_step() {
        // Left half 0, right half 100.
        let input = PixelBuffer::from_fn(6, 3, |x, _| {
            let v = if x < 3 { 0 } else { 100 };
            [v, v, v, 255]
        })
        .unwrap();
        let gx = convolve_grayscale(&input, &Kernel::sobel_x()).unwrap();
        let gy = convolve_grayscale(&input, &Kernel::sobel_y()).unwrap();
        // Flat regions sit at the bias.
        assert_eq!(gx.pixel(0, 1)[0], 128);
        assert_eq!(gx.pixel(5, 1)[0], 128);
        // Across the step: 4 * 100 + 128 clamps to 255.
        assert_eq!(gx.pixel(2, 1)[0], 255);
        assert!(gy.pixels().iter().all(|px| px[0] == 128));
    }

    #[test]
    fn test_smooth_spreads_a_dot() {
        let input = PixelBuffer::from_fn(3, 3, |x, y| {
            if (x, y) == (1, 1) {
                [160, 160, 160, 255]
            } else {
                [0, 0, 0, 255]
            }
        })
        .unwrap();
        let output = smooth(&input).unwrap();
        assert_eq!(output.pixel(1, 1)[0], 40);
        assert_eq!(output.pixel(0, 1)[0], 20);
        assert_eq!(output.pixel(0, 0)[0], 10);
    }

    #[test]
    fn test_empty_input() {
        let input = PixelBuffer::new(0, 4).unwrap();
        let output = convolve_full_color(&input, &Kernel::gaussian_smooth()).unwrap();
        assert!(output.is_empty());
    }
}
