//! Sobel edge detection.

use crate::core::buffer::PixelBuffer;
use crate::core::color::truncate_to_byte;
use crate::core::error::RawlabResult;
use crate::core::kernel::Kernel;
use crate::filters::convolution::{convolve_grayscale, smooth};
use crate::filters::point::{combine_binary, grayscale_weighted};
use log::debug;

/// Offset the Sobel presets add so signed gradients fit in a byte.
const GRADIENT_CENTER: f64 = 128.0;

/// Magnitude of a gradient whose components are stored centered on 128.
#[inline]
pub fn gradient_magnitude(gx: u8, gy: u8) -> u8 {
    let dx = f64::from(gx) - GRADIENT_CENTER;
    let dy = f64::from(gy) - GRADIENT_CENTER;
    truncate_to_byte(dx.hypot(dy))
}

/// Detect edges: weighted grayscale, Gaussian smoothing, then the Sobel
/// gradient magnitude.
///
/// The output is gray and opaque; bright pixels mark strong edges.
pub fn edge_detect(input: &PixelBuffer) -> RawlabResult<PixelBuffer> {
    debug!("edge_detect {}x{}", input.width(), input.height());
    let gray = grayscale_weighted(input)?;
    let smoothed = smooth(&gray)?;
    let gx = convolve_grayscale(&smoothed, &Kernel::sobel_x())?;
    let gy = convolve_grayscale(&smoothed, &Kernel::sobel_y())?;
    combine_binary(&gx, &gy, gradient_magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_magnitude() {
        assert_eq!(gradient_magnitude(128, 128), 0);
        assert_eq!(gradient_magnitude(131, 132), 5);
        assert_eq!(gradient_magnitude(125, 124), 5);
        assert_eq!(gradient_magnitude(255, 255), 179);
        assert_eq!(gradient_magnitude(0, 0), 181);
    }

    #[test]
    fn test_flat_image_has_no_edges() {
        let input = PixelBuffer::from_fn(8, 6, |_, _| [30, 140, 220, 17]).unwrap();
        let output = edge_detect(&input).unwrap();
        assert!(output.pixels().iter().all(|&px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn test_vertical_step_is_detected() {
        let input = PixelBuffer::from_fn(12, 8, |x, _| {
            if x < 6 {
                [20, 20, 20, 255]
            } else {
                [220, 220, 220, 255]
            }
        })
        .unwrap();
        let output = edge_detect(&input).unwrap();
        for y in 0..8 {
            assert!(output.pixel(5, y)[0] > 100);
            assert!(output.pixel(6, y)[0] > 100);
            assert_eq!(output.pixel(0, y)[0], 0);
            assert_eq!(output.pixel(11, y)[0], 0);
        }
        assert!(output
            .pixels()
            .iter()
            .all(|px| px[0] == px[1] && px[1] == px[2] && px[3] == 255));
    }

    #[test]
    fn test_horizontal_step_is_detected() {
        let input = PixelBuffer::from_fn(8, 12, |_, y| {
            let v = if y < 6 { 200 } else { 10 };
            [v, v, v, 255]
        })
        .unwrap();
        let output = edge_detect(&input).unwrap();
        assert!(output.pixel(3, 5)[0] > 100);
        assert_eq!(output.pixel(3, 0)[0], 0);
        assert_eq!(output.pixel(3, 11)[0], 0);
    }
}
