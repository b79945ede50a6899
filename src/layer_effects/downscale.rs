//! Downscale effect.
//!
//! Resamples every layer to a smaller canvas. Target pixel `(x, y)` maps to
//! source coordinates `x * W / w`, `y * H / h`:
//!
//! - If either coordinate is integral, the source pixel at the truncated
//!   coordinates is copied.
//! - Otherwise the four surrounding pixels are blended bilinearly, with each
//!   intermediate result truncated to an integer.
//!
//! Upscaling is refused.

use crate::buffer::{PixelBuffer, Rgb};
use crate::error::{non_negative, EditorError, Result};
use crate::filters::ImageEffect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Downscale {
    new_width: usize,
    new_height: usize,
}

impl Downscale {
    pub fn new(new_width: usize, new_height: usize) -> Self {
        Downscale {
            new_width,
            new_height,
        }
    }

    /// Build from signed dimensions, rejecting negatives.
    pub fn from_signed(new_width: i64, new_height: i64) -> Result<Self> {
        Ok(Self::new(
            non_negative(new_width, "downscale width")?,
            non_negative(new_height, "downscale height")?,
        ))
    }

    pub fn new_width(&self) -> usize {
        self.new_width
    }

    pub fn new_height(&self) -> usize {
        self.new_height
    }

    fn sample(&self, source: &PixelBuffer, x: usize, y: usize) -> Rgb {
        let x_old = x as f64 * source.width() as f64 / self.new_width as f64;
        let y_old = y as f64 * source.height() as f64 / self.new_height as f64;

        if x_old == x_old.floor() || y_old == y_old.floor() {
            return source.pixel_unchecked(x_old as usize, y_old as usize);
        }

        let (x0, x1) = (x_old.floor() as usize, x_old.ceil() as usize);
        let (y0, y1) = (y_old.floor() as usize, y_old.ceil() as usize);
        let a = source.pixel_unchecked(x0, y0);
        let b = source.pixel_unchecked(x1, y0);
        let c = source.pixel_unchecked(x0, y1);
        let d = source.pixel_unchecked(x1, y1);

        let mut out = [0u8; 3];
        for ch in 0..3 {
            out[ch] = interpolate(x_old, y_old, a[ch], b[ch], c[ch], d[ch]);
        }
        out
    }
}

/// Bilinear blend of corners a=(x0,y0), b=(x1,y0), c=(x0,y1), d=(x1,y1).
///
/// Both horizontal passes and the vertical pass truncate toward zero.
#[inline]
fn interpolate(x_old: f64, y_old: f64, a: u8, b: u8, c: u8, d: u8) -> u8 {
    let fx = x_old - x_old.floor();
    let gx = x_old.ceil() - x_old;
    let fy = y_old - y_old.floor();
    let gy = y_old.ceil() - y_old;

    let m = (b as f64 * fx + a as f64 * gx) as i32;
    let n = (d as f64 * fx + c as f64 * gx) as i32;
    (n as f64 * fy + m as f64 * gy) as i32 as u8
}

impl ImageEffect for Downscale {
    fn name(&self) -> &'static str {
        "downscale"
    }

    fn applies_to_all(&self) -> bool {
        true
    }

    fn apply_effect(&self, source: &PixelBuffer) -> Result<PixelBuffer> {
        if self.new_width > source.width() || self.new_height > source.height() {
            return Err(EditorError::invalid_input(format!(
                "cannot downscale a {}x{} image to {}x{}",
                source.width(),
                source.height(),
                self.new_width,
                self.new_height
            )));
        }
        tracing::debug!(
            from_width = source.width(),
            from_height = source.height(),
            to_width = self.new_width,
            to_height = self.new_height,
            "downscaling image"
        );
        Ok(PixelBuffer::from_fn(self.new_width, self.new_height, |x, y| {
            self.sample(source, x, y)
        }))
    }
}
