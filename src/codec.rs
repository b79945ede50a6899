//! Image file codecs.
//!
//! | Extension | Codec | Notes |
//! |-----------|-------|-------|
//! | ppm | [`PpmCodec`] | Plain (P3) text format |
//! | png | [`RasterCodec::png`] | Via the `image` crate |
//! | jpg, jpeg | [`RasterCodec::jpeg`] | Via the `image` crate, lossy |
//!
//! The editing model never picks a codec itself; front ends call
//! [`codec_for_extension`] (or [`load`] / [`save`]) and hand the decoded
//! [`PixelBuffer`] to the model.

use std::io::Cursor;
use std::path::Path;

use ::image::{DynamicImage, ImageFormat, RgbImage};

use crate::buffer::PixelBuffer;
use crate::error::{EditorError, Result};

/// Converts between encoded bytes and pixel buffers.
pub trait Codec: Send + Sync {
    /// Canonical lowercase file extension.
    fn extension(&self) -> &'static str;

    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer>;

    fn encode(&self, image: &PixelBuffer) -> Result<Vec<u8>>;
}

fn codec_error(reason: impl Into<String>) -> EditorError {
    EditorError::Codec(reason.into())
}

// ============================================================================
// Plain PPM
// ============================================================================

/// Plain-text PPM (`P3`).
///
/// Decoding skips `#` comments, accepts a max value in `1..=255` and stores
/// samples as written (no rescaling to 255). Encoding always writes a max
/// value of 255 with one image row per line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PpmCodec;

impl PpmCodec {
    fn tokens(text: &str) -> impl Iterator<Item = &str> {
        text.lines()
            .map(|line| line.split('#').next().unwrap_or(""))
            .flat_map(str::split_whitespace)
    }

    fn number<'a>(tokens: &mut impl Iterator<Item = &'a str>, what: &str) -> Result<usize> {
        let token = tokens
            .next()
            .ok_or_else(|| codec_error(format!("PPM data ends before the {what}")))?;
        token
            .parse::<usize>()
            .map_err(|_| codec_error(format!("PPM {what} is not a number: {token:?}")))
    }
}

impl Codec for PpmCodec {
    fn extension(&self) -> &'static str {
        "ppm"
    }

    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer> {
        let text = std::str::from_utf8(bytes).map_err(|e| codec_error(format!("PPM is not text: {e}")))?;
        let mut tokens = Self::tokens(text);

        match tokens.next() {
            Some("P3") => {}
            Some(other) => return Err(codec_error(format!("expected P3 header, got {other:?}"))),
            None => return Err(codec_error("empty PPM data")),
        }
        let width = Self::number(&mut tokens, "width")?;
        let height = Self::number(&mut tokens, "height")?;
        let max_value = Self::number(&mut tokens, "max value")?;
        if !(1..=255).contains(&max_value) {
            return Err(codec_error(format!("PPM max value {max_value} is outside 1..=255")));
        }

        let sample_count = width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(3))
            .ok_or_else(|| codec_error(format!("PPM size {width}x{height} is too large")))?;

        // Nothing sized by the header is allocated before the samples exist.
        let mut samples = Vec::new();
        for index in 0..sample_count {
            let sample = Self::number(&mut tokens, "sample")?;
            if sample > max_value {
                let pixel = index / 3;
                return Err(codec_error(format!(
                    "PPM sample {sample} at ({}, {}) exceeds max value {max_value}",
                    pixel % width,
                    pixel / width
                )));
            }
            samples.push(sample as u8);
        }
        PixelBuffer::from_rgb_bytes(width, height, &samples).map_err(|e| codec_error(e.to_string()))
    }

    fn encode(&self, image: &PixelBuffer) -> Result<Vec<u8>> {
        let mut out = format!("P3\n{} {}\n255\n", image.width(), image.height());
        for y in 0..image.height() {
            let row: Vec<String> = (0..image.width())
                .map(|x| {
                    let [r, g, b] = image.pixel_unchecked(x, y);
                    format!("{r} {g} {b}")
                })
                .collect();
            out.push_str(&row.join(" "));
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

// ============================================================================
// PNG / JPEG
// ============================================================================

/// PNG or JPEG through the `image` crate. Alpha is dropped on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterCodec {
    format: ImageFormat,
}

impl RasterCodec {
    pub fn png() -> Self {
        RasterCodec { format: ImageFormat::Png }
    }

    pub fn jpeg() -> Self {
        RasterCodec { format: ImageFormat::Jpeg }
    }
}

impl Codec for RasterCodec {
    fn extension(&self) -> &'static str {
        match self.format {
            ImageFormat::Jpeg => "jpg",
            _ => "png",
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer> {
        let decoded = ::image::load_from_memory_with_format(bytes, self.format)
            .map_err(|e| codec_error(e.to_string()))?
            .to_rgb8();
        let (width, height) = (decoded.width() as usize, decoded.height() as usize);
        PixelBuffer::from_rgb_bytes(width, height, decoded.as_raw())
    }

    fn encode(&self, image: &PixelBuffer) -> Result<Vec<u8>> {
        let width = u32::try_from(image.width()).map_err(|_| codec_error("image is too wide"))?;
        let height = u32::try_from(image.height()).map_err(|_| codec_error("image is too tall"))?;
        let raw = RgbImage::from_raw(width, height, image.to_rgb_bytes())
            .ok_or_else(|| codec_error("pixel data does not match the image size"))?;

        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(raw)
            .write_to(&mut out, self.format)
            .map_err(|e| codec_error(e.to_string()))?;
        Ok(out.into_inner())
    }
}

// ============================================================================
// Selection and file helpers
// ============================================================================

/// Pick a codec from a file extension (case-insensitive, leading dot allowed).
pub fn codec_for_extension(extension: &str) -> Result<Box<dyn Codec>> {
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();
    match extension.as_str() {
        "ppm" => Ok(Box::new(PpmCodec)),
        "png" => Ok(Box::new(RasterCodec::png())),
        "jpg" | "jpeg" => Ok(Box::new(RasterCodec::jpeg())),
        _ => Err(EditorError::invalid_input(format!(
            "unsupported image file type {extension:?}"
        ))),
    }
}

fn codec_for_path(path: &Path) -> Result<Box<dyn Codec>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| EditorError::invalid_input(format!("{} has no file extension", path.display())))?;
    codec_for_extension(extension)
}

/// Read and decode an image file, choosing the codec from its extension.
pub fn load(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let path = path.as_ref();
    let codec = codec_for_path(path)?;
    let bytes = std::fs::read(path).map_err(|e| codec_error(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), codec = codec.extension(), "decoding image file");
    codec.decode(&bytes)
}

/// Encode an image and write it to `path`, choosing the codec from its extension.
pub fn save(path: impl AsRef<Path>, image: &PixelBuffer) -> Result<()> {
    let path = path.as_ref();
    let codec = codec_for_path(path)?;
    let bytes = codec.encode(image)?;
    tracing::debug!(path = %path.display(), codec = codec.extension(), bytes = bytes.len(), "writing image file");
    std::fs::write(path, bytes).map_err(|e| codec_error(format!("{}: {e}", path.display())))
}
