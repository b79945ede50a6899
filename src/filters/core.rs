//! Core filter abstractions and shared pixel math.
//!
//! This module provides the pieces every filter is built from:
//! - [`PixelFilter`]: per-pixel rewrite of one image (blur, sharpen, sepia, ...)
//! - [`ImageEffect`]: whole-image transform that may apply to every layer
//! - [`Filter`]: the closed set of built-in pixel filters
//! - Trimmed square-kernel convolution
//! - 3x3 color-matrix transform

use crate::buffer::{clamp_channel, PixelBuffer, Rgb};
use crate::error::Result;

use super::blur::Blur;
use super::grayscale::Monochrome;
use super::sepia::Sepia;
use super::sharpen::Sharpen;

// ============================================================================
// Capability traits
// ============================================================================

/// A filter whose output pixel depends only on the source image around it.
///
/// Implementors supply [`PixelFilter::new_color_at`]; [`PixelFilter::apply`]
/// evaluates it over every pixel into a fresh buffer. The source is only
/// borrowed, so applying a filter never changes its input.
pub trait PixelFilter: Send + Sync {
    /// Short lowercase identifier, used in logs.
    fn name(&self) -> &'static str;

    /// New color of pixel `(x, y)` computed from `source`.
    ///
    /// Fails with an out-of-bounds error when `(x, y)` is not inside `source`.
    fn new_color_at(&self, x: usize, y: usize, source: &PixelBuffer) -> Result<Rgb>;

    /// Filter every pixel of `source` into a new image of the same size.
    fn apply(&self, source: &PixelBuffer) -> Result<PixelBuffer> {
        tracing::debug!(
            filter = self.name(),
            width = source.width(),
            height = source.height(),
            "applying pixel filter"
        );
        source.map_pixels(|x, y| self.new_color_at(x, y, source))
    }
}

/// A transform of a whole image, possibly changing its size.
pub trait ImageEffect: Send + Sync {
    fn name(&self) -> &'static str;

    /// When true the layer model runs the effect on every layer, not only
    /// the current image.
    fn applies_to_all(&self) -> bool;

    /// Produce the transformed image. `source` is left untouched.
    fn apply_effect(&self, source: &PixelBuffer) -> Result<PixelBuffer>;
}

// ============================================================================
// Built-in filters
// ============================================================================

/// The built-in pixel filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Blur,
    Sharpen,
    Monochrome,
    Sepia,
}

impl Filter {
    pub const ALL: [Filter; 4] = [Filter::Blur, Filter::Sharpen, Filter::Monochrome, Filter::Sepia];

    /// Look a filter up by its lowercase name (`"blur"`, `"sepia"`, ...).
    pub fn from_name(name: &str) -> Option<Filter> {
        Filter::ALL
            .into_iter()
            .find(|filter| filter.name().eq_ignore_ascii_case(name))
    }
}

impl PixelFilter for Filter {
    fn name(&self) -> &'static str {
        match self {
            Filter::Blur => Blur.name(),
            Filter::Sharpen => Sharpen.name(),
            Filter::Monochrome => Monochrome.name(),
            Filter::Sepia => Sepia.name(),
        }
    }

    fn new_color_at(&self, x: usize, y: usize, source: &PixelBuffer) -> Result<Rgb> {
        match self {
            Filter::Blur => Blur.new_color_at(x, y, source),
            Filter::Sharpen => Sharpen.new_color_at(x, y, source),
            Filter::Monochrome => Monochrome.new_color_at(x, y, source),
            Filter::Sepia => Sepia.new_color_at(x, y, source),
        }
    }
}

// ============================================================================
// Square-kernel convolution
// ============================================================================

/// Convolve one pixel with an odd-sized square kernel.
///
/// Cell `(i, j)` of the kernel weighs source pixel `(x - s + i, y - s + j)`
/// where `s = (D - 1) / 2`. Cells that land outside the image are dropped and
/// the remaining weights are NOT renormalized, so border pixels come out
/// darker than the same neighborhood would in the interior.
///
/// Sums are accumulated as `f64` per channel and clamped once at the end.
pub fn convolve_trimmed<const D: usize>(
    kernel: &[[f64; D]; D],
    x: usize,
    y: usize,
    source: &PixelBuffer,
) -> Result<Rgb> {
    source.check_bounds(x, y)?;
    let shift = (D as isize - 1) / 2;
    let mut sums = [0.0f64; 3];

    for (i, row) in kernel.iter().enumerate() {
        let sx = x as isize - shift + i as isize;
        for (j, &weight) in row.iter().enumerate() {
            let sy = y as isize - shift + j as isize;
            if weight == 0.0 || !source.contains_signed(sx, sy) {
                continue;
            }
            let px = source.pixel_unchecked(sx as usize, sy as usize);
            for c in 0..3 {
                sums[c] += weight * px[c] as f64;
            }
        }
    }

    Ok([
        clamp_channel(sums[0]),
        clamp_channel(sums[1]),
        clamp_channel(sums[2]),
    ])
}

// ============================================================================
// Color matrix
// ============================================================================

/// Apply a 3x3 color matrix to one pixel.
///
/// `matrix[input][output]`: output channel `c` is
/// `clamp(matrix[0][c] * R + matrix[1][c] * G + matrix[2][c] * B)`.
pub fn apply_color_matrix(
    matrix: &[[f64; 3]; 3],
    x: usize,
    y: usize,
    source: &PixelBuffer,
) -> Result<Rgb> {
    let [r, g, b] = source.pixel(x, y)?;
    let (r, g, b) = (r as f64, g as f64, b as f64);

    let mut out = [0u8; 3];
    for (c, slot) in out.iter_mut().enumerate() {
        *slot = clamp_channel(matrix[0][c] * r + matrix[1][c] * g + matrix[2][c] * b);
    }
    Ok(out)
}
