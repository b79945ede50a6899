//! 3x3 blur.
//!
//! Weighted average of the pixel and its eight neighbors:
//!
//! ```text
//! 1/16 1/8 1/16
//! 1/8  1/4 1/8
//! 1/16 1/8 1/16
//! ```
//!
//! Neighbors outside the image are dropped without renormalizing.

use crate::buffer::{PixelBuffer, Rgb};
use crate::error::Result;

use super::core::{convolve_trimmed, PixelFilter};

pub const BLUR_KERNEL: [[f64; 3]; 3] = [
    [0.0625, 0.125, 0.0625],
    [0.125, 0.25, 0.125],
    [0.0625, 0.125, 0.0625],
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blur;

impl PixelFilter for Blur {
    fn name(&self) -> &'static str {
        "blur"
    }

    fn new_color_at(&self, x: usize, y: usize, source: &PixelBuffer) -> Result<Rgb> {
        convolve_trimmed(&BLUR_KERNEL, x, y, source)
    }
}
