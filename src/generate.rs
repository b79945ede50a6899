//! Programmatic image generation.
//!
//! Generates images without requiring an input image. The only pattern so
//! far is a two-color checkerboard.

use crate::buffer::{PixelBuffer, Rgb};
use crate::error::{EditorError, Result};

/// Named colors available to generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl Color {
    pub const ALL: [Color; 8] = [
        Color::White,
        Color::Black,
        Color::Red,
        Color::Orange,
        Color::Yellow,
        Color::Green,
        Color::Blue,
        Color::Purple,
    ];

    pub fn rgb(self) -> Rgb {
        match self {
            Color::White => [255, 255, 255],
            Color::Black => [0, 0, 0],
            Color::Red => [255, 0, 0],
            Color::Orange => [255, 153, 0],
            Color::Yellow => [255, 255, 0],
            Color::Green => [0, 255, 0],
            Color::Blue => [0, 0, 255],
            Color::Purple => [102, 0, 204],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
            Color::Red => "red",
            Color::Orange => "orange",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Purple => "purple",
        }
    }

    pub fn from_name(name: &str) -> Option<Color> {
        Color::ALL
            .into_iter()
            .find(|color| color.name().eq_ignore_ascii_case(name))
    }
}

/// Something that can synthesize an image from size, tile size and colors.
pub trait ImageGenerator {
    fn generate(&self, width: usize, height: usize, tile_size: usize, colors: &[Color]) -> Result<PixelBuffer>;
}

/// Kinds of programmatic images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgrammaticImageType {
    Checkerboard,
}

impl ProgrammaticImageType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "checkerboard" | "checker_board" => Some(ProgrammaticImageType::Checkerboard),
            _ => None,
        }
    }

    /// Generator for this kind of image.
    pub fn generator(self) -> Box<dyn ImageGenerator> {
        match self {
            ProgrammaticImageType::Checkerboard => Box::new(Checkerboard),
        }
    }

    pub fn generate(self, width: usize, height: usize, tile_size: usize, colors: &[Color]) -> Result<PixelBuffer> {
        self.generator().generate(width, height, tile_size, colors)
    }
}

/// Two-color checkerboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checkerboard;

impl ImageGenerator for Checkerboard {
    fn generate(&self, width: usize, height: usize, tile_size: usize, colors: &[Color]) -> Result<PixelBuffer> {
        checkerboard(width, height, tile_size, colors)
    }
}

/// Check size parameters shared by the tile-based generators.
pub fn validate_tiling(width: usize, height: usize, tile_size: usize) -> Result<()> {
    if tile_size > width || tile_size > height {
        return Err(EditorError::invalid_input(format!(
            "tile size {tile_size} does not fit a {width}x{height} image"
        )));
    }
    if tile_size == 0 && width > 0 && height > 0 {
        return Err(EditorError::invalid_input("tile size must be positive"));
    }
    Ok(())
}

/// Build a checkerboard of `tile_size` squares.
///
/// Pixel `(x, y)` sits in tile row `x / tile_size` and tile column
/// `y / tile_size`. Tiles whose row and column parities match get
/// `colors[0]`, the rest `colors[1]`, so the tile at the origin is `colors[0]`.
///
/// # Arguments
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `tile_size` - Edge length of one tile, at most `min(width, height)`
/// * `colors` - Exactly two colors
pub fn checkerboard(width: usize, height: usize, tile_size: usize, colors: &[Color]) -> Result<PixelBuffer> {
    let [first, second] = colors else {
        return Err(EditorError::invalid_input(format!(
            "checkerboard needs exactly 2 colors, got {}",
            colors.len()
        )));
    };
    validate_tiling(width, height, tile_size)?;

    let (first, second) = (first.rgb(), second.rgb());
    Ok(PixelBuffer::from_fn(width, height, |x, y| {
        let row_parity = (x / tile_size + 1) % 2;
        let col_parity = (y / tile_size + 1) % 2;
        if row_parity == col_parity {
            first
        } else {
            second
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BW: [Color; 2] = [Color::Black, Color::White];

    #[test]
    fn test_checkerboard_3x3() {
        let img = checkerboard(3, 3, 1, &BW).unwrap();
        for y in 0..3 {
            for x in 0..3 {
                let expected = if (x + y) % 2 == 0 { [0, 0, 0] } else { [255, 255, 255] };
                assert_eq!(img.pixel(x, y), Ok(expected), "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_checkerboard_tiles() {
        let img = checkerboard(6, 4, 2, &[Color::Red, Color::Blue]).unwrap();
        assert_eq!((img.width(), img.height()), (6, 4));
        assert_eq!(img.pixel(0, 0), Ok(Color::Red.rgb()));
        assert_eq!(img.pixel(1, 1), Ok(Color::Red.rgb()));
        assert_eq!(img.pixel(2, 0), Ok(Color::Blue.rgb()));
        assert_eq!(img.pixel(0, 3), Ok(Color::Blue.rgb()));
        assert_eq!(img.pixel(3, 2), Ok(Color::Red.rgb()));
        assert_eq!(img.pixel(5, 3), Ok(Color::Blue.rgb()));
    }

    #[test]
    fn test_wrong_color_count() {
        assert!(checkerboard(2, 2, 1, &[Color::Black]).unwrap_err().is_invalid_input());
        assert!(checkerboard(2, 2, 1, &[Color::Black, Color::White, Color::Red]).is_err());
        assert!(checkerboard(2, 2, 1, &[]).is_err());
    }

    #[test]
    fn test_tile_too_big() {
        assert!(checkerboard(4, 2, 3, &BW).is_err());
        assert!(checkerboard(2, 4, 3, &BW).is_err());
        assert!(checkerboard(3, 3, 3, &BW).is_ok());
    }

    #[test]
    fn test_zero_tile() {
        assert!(checkerboard(2, 2, 0, &BW).is_err());
        let empty = checkerboard(0, 0, 0, &BW).unwrap();
        assert_eq!((empty.width(), empty.height()), (0, 0));
        let no_columns = checkerboard(0, 5, 0, &BW).unwrap();
        assert_eq!((no_columns.width(), no_columns.height()), (0, 5));
        let no_rows = checkerboard(4, 0, 0, &BW).unwrap();
        assert_eq!((no_rows.width(), no_rows.height()), (4, 0));
    }

    #[test]
    fn test_generator_factory() {
        let kind = ProgrammaticImageType::from_name("checkerboard").unwrap();
        assert_eq!(kind.generate(3, 3, 1, &BW), checkerboard(3, 3, 1, &BW));
        assert_eq!(ProgrammaticImageType::from_name("stripes"), None);
    }

    #[test]
    fn test_palette() {
        assert_eq!(Color::Orange.rgb(), [255, 153, 0]);
        assert_eq!(Color::Purple.rgb(), [102, 0, 204]);
        assert_eq!(Color::from_name("Yellow"), Some(Color::Yellow));
        assert_eq!(Color::from_name("teal"), None);
    }
}
