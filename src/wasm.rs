//! WebAssembly exports for LayerStag filters and effects.
//!
//! These functions are exposed to JavaScript via wasm-bindgen.
//!
//! ## Buffers
//!
//! Images cross the boundary as flat, row-major RGB bytes
//! (length = width * height * 3). Invalid arguments come back as a thrown
//! JavaScript string.

use wasm_bindgen::prelude::*;

use crate::buffer::PixelBuffer;
use crate::error::{non_negative, EditorError};
use crate::filters::{Filter, ImageEffect, PixelFilter};
use crate::generate::{self, Color};
use crate::layer_effects::{Downscale, Mosaic, SeedSearch, SimpleRng};

fn to_js(err: EditorError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn filter_bytes(data: &[u8], width: usize, height: usize, filter: Filter) -> Result<Vec<u8>, JsValue> {
    let input = PixelBuffer::from_rgb_bytes(width, height, data).map_err(to_js)?;
    let result = filter.apply(&input).map_err(to_js)?;
    Ok(result.to_rgb_bytes())
}

// ============================================================================
// Pixel filters
// ============================================================================

/// 3x3 blur with trimmed borders.
///
/// # Arguments
/// * `data` - Flat array of RGB bytes (length = width * height * 3)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Returns
/// Flat array of RGB bytes, same size as the input
#[wasm_bindgen]
pub fn blur_rgb_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    filter_bytes(data, width, height, Filter::Blur)
}

/// 5x5 sharpen with trimmed borders.
#[wasm_bindgen]
pub fn sharpen_rgb_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    filter_bytes(data, width, height, Filter::Sharpen)
}

/// BT.709 luma written to all three channels.
#[wasm_bindgen]
pub fn monochrome_rgb_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    filter_bytes(data, width, height, Filter::Monochrome)
}

#[wasm_bindgen]
pub fn sepia_rgb_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    filter_bytes(data, width, height, Filter::Sepia)
}

/// Filter by name: "blur", "sharpen", "monochrome" or "sepia".
#[wasm_bindgen]
pub fn filter_rgb_wasm(data: &[u8], width: usize, height: usize, name: &str) -> Result<Vec<u8>, JsValue> {
    let filter = Filter::from_name(name).ok_or_else(|| JsValue::from_str(&format!("unknown filter: {name}")))?;
    filter_bytes(data, width, height, filter)
}

// ============================================================================
// Effects and generators
// ============================================================================

/// Resample to `new_width` x `new_height`. Upscaling is rejected.
///
/// # Returns
/// Flat array of RGB bytes (length = new_width * new_height * 3)
#[wasm_bindgen]
pub fn downscale_rgb_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    new_width: i32,
    new_height: i32,
) -> Result<Vec<u8>, JsValue> {
    let input = PixelBuffer::from_rgb_bytes(width, height, data).map_err(to_js)?;
    let effect = Downscale::from_signed(new_width.into(), new_height.into()).map_err(to_js)?;
    let result = effect.apply_effect(&input).map_err(to_js)?;
    Ok(result.to_rgb_bytes())
}

/// Mosaic with `seed_count` seeds drawn from two seeded generators.
///
/// # Arguments
/// * `seed_count` - Number of clusters; 0 returns the input unchanged
/// * `seed_x` - Seed of the stream for seed x positions
/// * `seed_y` - Seed of the stream for seed y positions
/// * `exact` - Scan every seed instead of the windowed search
#[wasm_bindgen]
pub fn mosaic_rgb_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    seed_count: i32,
    seed_x: u32,
    seed_y: u32,
    exact: bool,
) -> Result<Vec<u8>, JsValue> {
    let input = PixelBuffer::from_rgb_bytes(width, height, data).map_err(to_js)?;
    let seed_count = non_negative(seed_count.into(), "seed count").map_err(to_js)?;
    let search = if exact { SeedSearch::Exact } else { SeedSearch::Windowed };
    let effect = Mosaic::initialize_with(
        search,
        seed_count,
        &input,
        &mut SimpleRng::new(seed_x.into()),
        &mut SimpleRng::new(seed_y.into()),
    )
    .map_err(to_js)?;
    let result = effect.apply_effect(&input).map_err(to_js)?;
    Ok(result.to_rgb_bytes())
}

/// Two-color checkerboard; colors are palette names ("black", "white", ...).
#[wasm_bindgen]
pub fn checkerboard_rgb_wasm(
    width: i32,
    height: i32,
    tile_size: i32,
    first: &str,
    second: &str,
) -> Result<Vec<u8>, JsValue> {
    let width = non_negative(width.into(), "width").map_err(to_js)?;
    let height = non_negative(height.into(), "height").map_err(to_js)?;
    let tile_size = non_negative(tile_size.into(), "tile size").map_err(to_js)?;
    let colors = [first, second]
        .into_iter()
        .map(|name| Color::from_name(name).ok_or_else(|| JsValue::from_str(&format!("unknown color: {name}"))))
        .collect::<Result<Vec<_>, _>>()?;
    let result = generate::checkerboard(width, height, tile_size, &colors).map_err(to_js)?;
    Ok(result.to_rgb_bytes())
}
