//! Pixel filters.
//!
//! ## Image Format
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | RGB8 | (H, W, 3) | u8 | Red, green, blue, 0-255 |
//!
//! ## Architecture
//!
//! All filters follow these principles:
//! - **Pure** - Read a borrowed source, return a new [`PixelBuffer`](crate::buffer::PixelBuffer)
//! - **Per-pixel** - Each output pixel comes from [`PixelFilter::new_color_at`]
//! - **Half-up rounding** - Real results go through [`clamp_channel`](crate::buffer::clamp_channel)
//! - **Thread-safe** - Rows are evaluated in parallel with rayon
//!
//! ## Filter Categories
//!
//! - **Spatial kernel**: blur (3x3), sharpen (5x5), with trimmed borders
//! - **Color matrix**: monochrome, sepia

pub mod core;
pub mod blur;
pub mod sharpen;
pub mod grayscale;
pub mod sepia;

pub use self::core::{Filter, ImageEffect, PixelFilter};
pub use blur::Blur;
pub use grayscale::Monochrome;
pub use sepia::Sepia;
pub use sharpen::Sharpen;
