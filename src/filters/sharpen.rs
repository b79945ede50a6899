//! 5x5 sharpen.
//!
//! Boosts the pixel and its inner ring and subtracts the outer ring:
//!
//! ```text
//! -1/8 -1/8 -1/8 -1/8 -1/8
//! -1/8  1/4  1/4  1/4 -1/8
//! -1/8  1/4   1   1/4 -1/8
//! -1/8  1/4  1/4  1/4 -1/8
//! -1/8 -1/8 -1/8 -1/8 -1/8
//! ```
//!
//! The weights sum to 1. Near the border the out-of-image cells are dropped
//! without renormalizing, same as [`super::blur`].

use crate::buffer::{PixelBuffer, Rgb};
use crate::error::Result;

use super::core::{convolve_trimmed, PixelFilter};

const O: f64 = -0.125;
const I: f64 = 0.25;

pub const SHARPEN_KERNEL: [[f64; 5]; 5] = [
    [O, O, O, O, O],
    [O, I, I, I, O],
    [O, I, 1.0, I, O],
    [O, I, I, I, O],
    [O, O, O, O, O],
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sharpen;

impl PixelFilter for Sharpen {
    fn name(&self) -> &'static str {
        "sharpen"
    }

    fn new_color_at(&self, x: usize, y: usize, source: &PixelBuffer) -> Result<Rgb> {
        convolve_trimmed(&SHARPEN_KERNEL, x, y, source)
    }
}
