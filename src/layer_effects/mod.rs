//! Whole-image effects.
//!
//! ## Effects
//! - **Downscale** - Resample to a smaller canvas, applied to every layer (`downscale.rs`)
//! - **Mosaic** - Seed clustering with per-cluster average color (`mosaic.rs`)
//!
//! ## Effects vs Filters
//!
//! Effects differ from [pixel filters](crate::filters) in that they:
//! - May change the canvas size
//! - May apply to every layer of the stack, not only the current image
//! - May need setup against a specific image (mosaic seeds)

pub mod downscale;
pub mod mosaic;

pub use downscale::Downscale;
pub use mosaic::{Mosaic, RandomSource, Seed, SeedSearch, SimpleRng};

use crate::buffer::PixelBuffer;
use crate::error::Result;
use crate::filters::ImageEffect;

/// The built-in effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Downscale(Downscale),
    Mosaic(Mosaic),
}

impl ImageEffect for Effect {
    fn name(&self) -> &'static str {
        match self {
            Effect::Downscale(effect) => ImageEffect::name(effect),
            Effect::Mosaic(effect) => ImageEffect::name(effect),
        }
    }

    fn applies_to_all(&self) -> bool {
        match self {
            Effect::Downscale(effect) => effect.applies_to_all(),
            Effect::Mosaic(effect) => effect.applies_to_all(),
        }
    }

    fn apply_effect(&self, source: &PixelBuffer) -> Result<PixelBuffer> {
        match self {
            Effect::Downscale(effect) => effect.apply_effect(source),
            Effect::Mosaic(effect) => effect.apply_effect(source),
        }
    }
}

impl From<Downscale> for Effect {
    fn from(effect: Downscale) -> Self {
        Effect::Downscale(effect)
    }
}

impl From<Mosaic> for Effect {
    fn from(effect: Mosaic) -> Self {
        Effect::Mosaic(effect)
    }
}
