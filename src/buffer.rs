//! Pixel buffer shared by every filter, effect and generator.
//!
//! ## Layout
//!
//! | Field | Shape | Type | Description |
//! |-------|-------|------|-------------|
//! | data | (H, W, 3) | u8 | Red, green, blue, 0-255 |
//!
//! The three channels live in one `Array3` so they always share a shape.
//! Coordinates are `(x, y)` with `x` in `[0, width)` and `y` in `[0, height)`;
//! internally that is `data[[y, x, channel]]`.
//!
//! Buffers are values: filters read a borrowed source and build a new buffer,
//! they never write into their input.

use ndarray::{Array2, Array3, ArrayView3};
use rayon::prelude::*;

use crate::error::{EditorError, Result};

/// One RGB sample.
pub type Rgb = [u8; 3];

/// Color channel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// Round a real channel value to the nearest integer and saturate to 0-255.
///
/// Rounds half up (`floor(v + 0.5)`), not half-to-even.
#[inline]
pub fn clamp_channel(value: f64) -> u8 {
    if value > 255.0 {
        255
    } else if value < 0.0 {
        0
    } else {
        (value + 0.5).floor() as u8
    }
}

/// Owned RGB image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Array3<u8>,
}

impl PixelBuffer {
    /// Black image of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        PixelBuffer {
            data: Array3::<u8>::zeros((height, width, 3)),
        }
    }

    /// Image where every pixel is `color`.
    pub fn filled(width: usize, height: usize, color: Rgb) -> Self {
        Self::from_fn(width, height, |_, _| color)
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> Rgb,
    {
        let mut data = Array3::<u8>::zeros((height, width, 3));
        for y in 0..height {
            for x in 0..width {
                let rgb = f(x, y);
                data[[y, x, 0]] = rgb[0];
                data[[y, x, 1]] = rgb[1];
                data[[y, x, 2]] = rgb[2];
            }
        }
        PixelBuffer { data }
    }

    /// Assemble an image from three (height, width) planes.
    ///
    /// Fails unless all three planes have the same shape.
    pub fn from_channels(red: Array2<u8>, green: Array2<u8>, blue: Array2<u8>) -> Result<Self> {
        if red.dim() != green.dim() || red.dim() != blue.dim() {
            return Err(EditorError::invalid_input(format!(
                "channel shapes differ: red {:?}, green {:?}, blue {:?}",
                red.dim(),
                green.dim(),
                blue.dim()
            )));
        }
        let (height, width) = red.dim();
        let mut data = Array3::<u8>::zeros((height, width, 3));
        for y in 0..height {
            for x in 0..width {
                data[[y, x, 0]] = red[[y, x]];
                data[[y, x, 1]] = green[[y, x]];
                data[[y, x, 2]] = blue[[y, x]];
            }
        }
        Ok(PixelBuffer { data })
    }

    /// Wrap an existing (height, width, 3) array.
    pub fn from_array(data: Array3<u8>) -> Result<Self> {
        let (_, _, channels) = data.dim();
        if channels != 3 {
            return Err(EditorError::invalid_input(format!(
                "expected 3 color channels, got {channels}"
            )));
        }
        Ok(PixelBuffer { data })
    }

    /// Read a flat, row-major RGB byte buffer (length = width * height * 3).
    pub fn from_rgb_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(3))
            .ok_or_else(|| EditorError::invalid_input(format!("{width}x{height} RGB image is too large")))?;
        if bytes.len() != expected {
            return Err(EditorError::invalid_input(format!(
                "expected {expected} bytes for a {width}x{height} RGB image, got {}",
                bytes.len()
            )));
        }
        let data = Array3::from_shape_vec((height, width, 3), bytes.to_vec())
            .map_err(|e| EditorError::invalid_input(e.to_string()))?;
        Ok(PixelBuffer { data })
    }

    /// Flat, row-major RGB bytes.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.data.iter().copied().collect()
    }

    pub fn as_array(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    pub fn into_array(self) -> Array3<u8> {
        self.data
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width() && y < self.height()
    }

    /// Signed-coordinate bounds test used by neighborhood filters.
    #[inline]
    pub(crate) fn contains_signed(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width() && (y as usize) < self.height()
    }

    pub(crate) fn check_bounds(&self, x: usize, y: usize) -> Result<()> {
        if self.contains(x, y) {
            Ok(())
        } else {
            Err(EditorError::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            })
        }
    }

    /// Single channel value at `(x, y)`.
    pub fn get(&self, channel: Channel, x: usize, y: usize) -> Result<u8> {
        self.check_bounds(x, y)?;
        Ok(self.data[[y, x, channel.index()]])
    }

    /// All three channel values at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Result<Rgb> {
        self.check_bounds(x, y)?;
        Ok(self.pixel_unchecked(x, y))
    }

    /// Overwrite one pixel. Only producers that still exclusively own the
    /// buffer (codecs, generators) write pixels.
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: Rgb) -> Result<()> {
        self.check_bounds(x, y)?;
        self.data[[y, x, 0]] = rgb[0];
        self.data[[y, x, 1]] = rgb[1];
        self.data[[y, x, 2]] = rgb[2];
        Ok(())
    }

    /// Caller guarantees `(x, y)` is inside the image.
    #[inline]
    pub(crate) fn pixel_unchecked(&self, x: usize, y: usize) -> Rgb {
        [
            self.data[[y, x, 0]],
            self.data[[y, x, 1]],
            self.data[[y, x, 2]],
        ]
    }

    /// Build a same-sized image by evaluating `f(x, y)` for every pixel.
    ///
    /// Rows are computed in parallel; `f` only reads shared state, so the
    /// result matches a sequential scan exactly. The first error wins.
    pub fn map_pixels<F>(&self, f: F) -> Result<PixelBuffer>
    where
        F: Fn(usize, usize) -> Result<Rgb> + Sync,
    {
        let (height, width) = (self.height(), self.width());

        let rows: Vec<Vec<Rgb>> = (0..height)
            .into_par_iter()
            .map(|y| (0..width).map(|x| f(x, y)).collect::<Result<Vec<Rgb>>>())
            .collect::<Result<Vec<_>>>()?;

        let mut data = Array3::<u8>::zeros((height, width, 3));
        for (y, row) in rows.into_iter().enumerate() {
            for (x, rgb) in row.into_iter().enumerate() {
                data[[y, x, 0]] = rgb[0];
                data[[y, x, 1]] = rgb[1];
                data[[y, x, 2]] = rgb[2];
            }
        }
        Ok(PixelBuffer { data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn sample() -> PixelBuffer {
        PixelBuffer::from_fn(3, 2, |x, y| [(x * 10) as u8, (y * 10) as u8, 7])
    }

    #[test]
    fn test_clamp_rounds_half_up() {
        assert_eq!(clamp_channel(216.552), 217);
        assert_eq!(clamp_channel(2.5), 3);
        assert_eq!(clamp_channel(3.5), 4);
        assert_eq!(clamp_channel(3.49), 3);
        assert_eq!(clamp_channel(0.0), 0);
    }

    #[test]
    fn test_clamp_saturates() {
        assert_eq!(clamp_channel(255.4), 255);
        assert_eq!(clamp_channel(1000.0), 255);
        assert_eq!(clamp_channel(-0.1), 0);
        assert_eq!(clamp_channel(-300.0), 0);
    }

    #[test]
    fn test_dimensions_and_get() {
        let img = sample();
        assert_eq!(img.width(), 3);
        assert_eq!(img.height(), 2);
        assert_eq!(img.get(Channel::Red, 2, 1), Ok(20));
        assert_eq!(img.get(Channel::Green, 2, 1), Ok(10));
        assert_eq!(img.get(Channel::Blue, 0, 0), Ok(7));
        assert_eq!(img.pixel(1, 0), Ok([10, 0, 7]));
    }

    #[test]
    fn test_get_out_of_bounds() {
        let img = sample();
        assert_eq!(
            img.get(Channel::Red, 3, 0),
            Err(EditorError::OutOfBounds { x: 3, y: 0, width: 3, height: 2 })
        );
        assert!(img.pixel(0, 2).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_clone_is_deep() {
        let img = sample();
        let mut copy = img.clone();
        copy.set_pixel(0, 0, [255, 255, 255]).unwrap();
        assert_eq!(img.pixel(0, 0), Ok([0, 0, 7]));
        assert_eq!(copy.pixel(0, 0), Ok([255, 255, 255]));
    }

    #[test]
    fn test_from_channels_shape_mismatch() {
        let red = Array2::<u8>::zeros((2, 3));
        let green = Array2::<u8>::zeros((2, 3));
        let blue = Array2::<u8>::zeros((3, 2));
        assert!(PixelBuffer::from_channels(red, green, blue).is_err());
    }

    #[test]
    fn test_from_channels() {
        let red = Array2::from_elem((2, 3), 1u8);
        let green = Array2::from_elem((2, 3), 2u8);
        let blue = Array2::from_elem((2, 3), 3u8);
        let img = PixelBuffer::from_channels(red, green, blue).unwrap();
        assert_eq!(img.width(), 3);
        assert_eq!(img.height(), 2);
        assert_eq!(img.pixel(2, 1), Ok([1, 2, 3]));
    }

    #[test]
    fn test_rgb_bytes() {
        let img = sample();
        let bytes = img.to_rgb_bytes();
        assert_eq!(bytes.len(), 18);
        // Second pixel of the first row
        assert_eq!(&bytes[3..6], &[10, 0, 7]);
        assert_eq!(PixelBuffer::from_rgb_bytes(3, 2, &bytes), Ok(img));
        assert!(PixelBuffer::from_rgb_bytes(3, 3, &bytes).is_err());
    }

    #[test]
    fn test_rgb_bytes_size_overflow() {
        let err = PixelBuffer::from_rgb_bytes(usize::MAX / 2, 3, &[]).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(PixelBuffer::from_rgb_bytes(usize::MAX, usize::MAX, &[]).is_err());
    }

    #[test]
    fn test_from_array_requires_three_channels() {
        assert!(PixelBuffer::from_array(Array3::<u8>::zeros((2, 2, 4))).is_err());
        assert!(PixelBuffer::from_array(Array3::<u8>::zeros((2, 2, 3))).is_ok());
    }

    #[test]
    fn test_map_pixels_matches_sequential() {
        let img = PixelBuffer::from_fn(17, 9, |x, y| [(x * 7 % 256) as u8, (y * 13) as u8, (x ^ y) as u8]);
        let mapped = img
            .map_pixels(|x, y| {
                let [r, g, b] = img.pixel_unchecked(x, y);
                Ok([b, r, g])
            })
            .unwrap();
        for y in 0..9 {
            for x in 0..17 {
                let [r, g, b] = img.pixel(x, y).unwrap();
                assert_eq!(mapped.pixel(x, y), Ok([b, r, g]));
            }
        }
    }

    #[test]
    fn test_empty_image() {
        let img = PixelBuffer::new(0, 0);
        assert_eq!(img.width(), 0);
        assert_eq!(img.height(), 0);
        assert!(img.to_rgb_bytes().is_empty());
        assert_eq!(img.map_pixels(|_, _| Ok([1, 1, 1])), Ok(PixelBuffer::new(0, 0)));
    }
}
