//! Monochrome (grayscale) filter.
//!
//! Uses ITU-R BT.709 luminosity coefficients. Every output channel gets the
//! same luma value, so the result is R = G = B.

use crate::buffer::{PixelBuffer, Rgb};
use crate::error::Result;

use super::core::{apply_color_matrix, PixelFilter};

/// ITU-R BT.709 luminosity coefficients
const LUMA_R: f64 = 0.2126;
const LUMA_G: f64 = 0.7152;
const LUMA_B: f64 = 0.0722;

/// Rows are input channels, columns output channels.
pub const MONOCHROME_MATRIX: [[f64; 3]; 3] = [
    [LUMA_R, LUMA_R, LUMA_R],
    [LUMA_G, LUMA_G, LUMA_G],
    [LUMA_B, LUMA_B, LUMA_B],
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Monochrome;

impl PixelFilter for Monochrome {
    fn name(&self) -> &'static str {
        "monochrome"
    }

    fn new_color_at(&self, x: usize, y: usize, source: &PixelBuffer) -> Result<Rgb> {
        apply_color_matrix(&MONOCHROME_MATRIX, x, y, source)
    }
}
