//! Sepia tone filter.
//!
//! Classic sepia matrix:
//!
//! ```text
//! R' = 0.393 R + 0.769 G + 0.189 B
//! G' = 0.349 R + 0.686 G + 0.168 B
//! B' = 0.272 R + 0.534 G + 0.131 B
//! ```

use crate::buffer::{PixelBuffer, Rgb};
use crate::error::Result;

use super::core::{apply_color_matrix, PixelFilter};

/// Rows are input channels, columns output channels.
pub const SEPIA_MATRIX: [[f64; 3]; 3] = [
    [0.393, 0.349, 0.272],
    [0.769, 0.686, 0.534],
    [0.189, 0.168, 0.131],
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sepia;

impl PixelFilter for Sepia {
    fn name(&self) -> &'static str {
        "sepia"
    }

    fn new_color_at(&self, x: usize, y: usize, source: &PixelBuffer) -> Result<Rgb> {
        apply_color_matrix(&SEPIA_MATRIX, x, y, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sepia_mixed_pixel() {
        let img = PixelBuffer::filled(1, 1, [120, 255, 120]);
        // R saturates (265.935), G = 236.97, B = 184.53
        assert_eq!(Sepia.apply(&img).unwrap().pixel(0, 0), Ok([255, 237, 185]));
    }

    #[test]
    fn test_sepia_white() {
        let img = PixelBuffer::filled(1, 1, [255, 255, 255]);
        // Blue row sums to 0.937: 238.935
        assert_eq!(Sepia.apply(&img).unwrap().pixel(0, 0), Ok([255, 255, 239]));
    }

    #[test]
    fn test_sepia_black_stays_black() {
        let img = PixelBuffer::new(3, 2);
        assert_eq!(Sepia.apply(&img).unwrap(), img);
    }

    #[test]
    fn test_sepia_is_per_pixel() {
        let img = PixelBuffer::from_fn(4, 3, |x, y| [(x * 60) as u8, (y * 100) as u8, 33]);
        let result = Sepia.apply(&img).unwrap();
        for y in 0..3 {
            for x in 0..4 {
                let single = PixelBuffer::filled(1, 1, img.pixel(x, y).unwrap());
                assert_eq!(result.pixel(x, y), Sepia.new_color_at(0, 0, &single));
            }
        }
    }
}
