//! LayerStag Rust core
//!
//! Layered raster editing: a stack of RGB images, per-pixel filters,
//! whole-image effects and programmatic image generation, with Python
//! bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! Every image is a [`PixelBuffer`] of shape (height, width, 3), `u8` per
//! channel (0-255). Python callers pass and receive numpy arrays of that
//! shape; JavaScript callers pass flat row-major RGB bytes.
//!
//! ## Architecture
//! - [`filters`]: blur, sharpen, monochrome and sepia, all [`PixelFilter`]s
//! - [`layer_effects`]: downscale (every layer) and mosaic (current image)
//! - [`generate`]: checkerboard generator and the named [`Color`] palette
//! - [`layers`]: the [`Model`] that owns the layer stack
//! - [`codec`]: PPM, PNG and JPEG encoding for front ends

pub mod buffer;
pub mod codec;
pub mod error;
pub mod filters;
pub mod generate;
pub mod layer_effects;
pub mod layers;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use buffer::{clamp_channel, Channel, PixelBuffer, Rgb};
pub use codec::{codec_for_extension, Codec, PpmCodec, RasterCodec};
pub use error::{EditorError, Result};
pub use filters::{Blur, Filter, ImageEffect, Monochrome, PixelFilter, Sepia, Sharpen};
pub use generate::{Color, ImageGenerator, ProgrammaticImageType};
pub use layer_effects::{Downscale, Effect, Mosaic, RandomSource, Seed, SeedSearch, SimpleRng};
pub use layers::{Layer, Model};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::{PyRuntimeError, PyValueError};
    use pyo3::prelude::*;

    use crate::buffer::PixelBuffer;
    use crate::error::{non_negative, EditorError};
    use crate::filters::{Filter, ImageEffect, PixelFilter};
    use crate::generate::{self, Color, ProgrammaticImageType};
    use crate::layer_effects::{Downscale, Mosaic, SeedSearch, SimpleRng};
    use crate::layers::Model;

    fn to_py_err(err: EditorError) -> PyErr {
        if err.is_invalid_state() {
            PyRuntimeError::new_err(err.to_string())
        } else {
            PyValueError::new_err(err.to_string())
        }
    }

    fn read_image(image: &PyReadonlyArray3<'_, u8>) -> PyResult<PixelBuffer> {
        PixelBuffer::from_array(image.as_array().to_owned()).map_err(to_py_err)
    }

    fn to_numpy<'py>(py: Python<'py>, image: PixelBuffer) -> Bound<'py, PyArray3<u8>> {
        image.into_array().into_pyarray(py)
    }

    fn parse_filter(name: &str) -> PyResult<Filter> {
        Filter::from_name(name).ok_or_else(|| PyValueError::new_err(format!("unknown filter: {name}")))
    }

    fn parse_colors(names: &[String]) -> PyResult<Vec<Color>> {
        names
            .iter()
            .map(|name| {
                Color::from_name(name).ok_or_else(|| PyValueError::new_err(format!("unknown color: {name}")))
            })
            .collect()
    }

    fn parse_search(exact: bool) -> SeedSearch {
        if exact {
            SeedSearch::Exact
        } else {
            SeedSearch::Windowed
        }
    }

    fn run_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        filter: Filter,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = read_image(&image)?;
        let result = filter.apply(&input).map_err(to_py_err)?;
        Ok(to_numpy(py, result))
    }

    // ========================================================================
    // Pixel filters
    // ========================================================================

    /// 3x3 blur of an RGB u8 image, borders trimmed.
    #[pyfunction]
    pub fn blur<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<Bound<'py, PyArray3<u8>>> {
        run_filter(py, image, Filter::Blur)
    }

    /// 5x5 sharpen of an RGB u8 image, borders trimmed.
    #[pyfunction]
    pub fn sharpen<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<Bound<'py, PyArray3<u8>>> {
        run_filter(py, image, Filter::Sharpen)
    }

    /// BT.709 luma written to all three channels.
    #[pyfunction]
    pub fn monochrome<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<Bound<'py, PyArray3<u8>>> {
        run_filter(py, image, Filter::Monochrome)
    }

    /// Classic sepia tone.
    #[pyfunction]
    pub fn sepia<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<Bound<'py, PyArray3<u8>>> {
        run_filter(py, image, Filter::Sepia)
    }

    /// Apply a pixel filter by name ("blur", "sharpen", "monochrome", "sepia").
    #[pyfunction]
    pub fn apply_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        name: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        run_filter(py, image, parse_filter(name)?)
    }

    // ========================================================================
    // Effects and generators
    // ========================================================================

    /// Resample to a smaller canvas. Upscaling raises ValueError.
    #[pyfunction]
    pub fn downscale<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        new_width: i64,
        new_height: i64,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = read_image(&image)?;
        let effect = Downscale::from_signed(new_width, new_height).map_err(to_py_err)?;
        let result = effect.apply_effect(&input).map_err(to_py_err)?;
        Ok(to_numpy(py, result))
    }

    /// Mosaic with `seed_count` random seeds.
    ///
    /// # Arguments
    /// * `image` - Input RGB image
    /// * `seed_count` - Number of clusters; 0 returns the image unchanged
    /// * `seed_x` - Seed of the random stream for seed x positions
    /// * `seed_y` - Seed of the random stream for seed y positions
    /// * `exact` - Scan every seed instead of the windowed search
    #[pyfunction]
    #[pyo3(signature = (image, seed_count, seed_x=0, seed_y=1, exact=false))]
    pub fn mosaic<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        seed_count: i64,
        seed_x: u64,
        seed_y: u64,
        exact: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = read_image(&image)?;
        let seed_count = non_negative(seed_count, "seed count").map_err(to_py_err)?;
        let effect = Mosaic::initialize_with(
            parse_search(exact),
            seed_count,
            &input,
            &mut SimpleRng::new(seed_x),
            &mut SimpleRng::new(seed_y),
        )
        .map_err(to_py_err)?;
        let result = effect.apply_effect(&input).map_err(to_py_err)?;
        Ok(to_numpy(py, result))
    }

    /// Two-color checkerboard, colors given by name.
    #[pyfunction]
    pub fn checkerboard<'py>(
        py: Python<'py>,
        width: i64,
        height: i64,
        tile_size: i64,
        colors: Vec<String>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let width = non_negative(width, "width").map_err(to_py_err)?;
        let height = non_negative(height, "height").map_err(to_py_err)?;
        let tile_size = non_negative(tile_size, "tile size").map_err(to_py_err)?;
        let colors = parse_colors(&colors)?;
        let result = generate::checkerboard(width, height, tile_size, &colors).map_err(to_py_err)?;
        Ok(to_numpy(py, result))
    }

    // ========================================================================
    // Layer model
    // ========================================================================

    /// Layer stack with a current layer and current image.
    #[pyclass(name = "LayerModel")]
    #[derive(Default)]
    pub struct LayerModel {
        inner: Model,
    }

    #[pymethods]
    impl LayerModel {
        #[new]
        fn new() -> Self {
            Self::default()
        }

        fn __len__(&self) -> usize {
            self.inner.len()
        }

        #[getter]
        fn current_index(&self) -> usize {
            self.inner.current_index()
        }

        fn add_layer(&mut self) {
            self.inner.add_layer();
        }

        fn remove_layer(&mut self) -> PyResult<()> {
            self.inner.remove_layer().map(|_| ()).map_err(to_py_err)
        }

        fn set_image(&mut self, image: PyReadonlyArray3<'_, u8>) -> PyResult<()> {
            let image = read_image(&image)?;
            self.inner.set_image(image).map_err(to_py_err)
        }

        fn get_current_image<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray3<u8>>> {
            let image = self.inner.get_current_image().map_err(to_py_err)?;
            Ok(to_numpy(py, PixelBuffer::clone(image)))
        }

        fn get_image_at<'py>(&self, py: Python<'py>, index: i64) -> PyResult<Option<Bound<'py, PyArray3<u8>>>> {
            let index = non_negative(index, "layer index").map_err(to_py_err)?;
            let image = self.inner.get_image_at(index).map_err(to_py_err)?;
            Ok(image.map(|image| to_numpy(py, PixelBuffer::clone(image))))
        }

        fn update_img_to_current_layer(&mut self, index: i64) -> PyResult<()> {
            let index = non_negative(index, "layer index").map_err(to_py_err)?;
            self.inner.update_img_to_current_layer(index).map_err(to_py_err)
        }

        fn adjust_visibility(&mut self, index: i64, visible: bool) -> PyResult<()> {
            let index = non_negative(index, "layer index").map_err(to_py_err)?;
            self.inner.adjust_visibility(index, visible).map_err(to_py_err)
        }

        fn is_visible(&self, index: i64) -> PyResult<bool> {
            let index = non_negative(index, "layer index").map_err(to_py_err)?;
            self.inner
                .layers()
                .get(index)
                .map(|layer| layer.is_visible())
                .ok_or_else(|| PyValueError::new_err(format!("layer index {index} is out of range")))
        }

        fn layer_names(&self) -> Vec<Option<String>> {
            self.inner
                .layers()
                .iter()
                .map(|layer| layer.name().map(str::to_owned))
                .collect()
        }

        fn topmost_visible_index(&self) -> Option<usize> {
            self.inner.topmost_visible_index()
        }

        fn save(&mut self, name: String) -> PyResult<()> {
            self.inner.save(name).map_err(to_py_err)
        }

        fn apply_filter(&mut self, name: &str) -> PyResult<()> {
            let filter = parse_filter(name)?;
            self.inner.apply_filter(&filter).map_err(to_py_err)
        }

        fn downscale(&mut self, new_width: i64, new_height: i64) -> PyResult<()> {
            let effect = Downscale::from_signed(new_width, new_height).map_err(to_py_err)?;
            self.inner.apply_complex_effect(&effect).map_err(to_py_err)
        }

        #[pyo3(signature = (seed_count, seed_x=0, seed_y=1, exact=false))]
        fn mosaic(&mut self, seed_count: i64, seed_x: u64, seed_y: u64, exact: bool) -> PyResult<()> {
            let seed_count = non_negative(seed_count, "seed count").map_err(to_py_err)?;
            let image = self.inner.get_current_image().map_err(to_py_err)?;
            let effect = Mosaic::initialize_with(
                parse_search(exact),
                seed_count,
                image,
                &mut SimpleRng::new(seed_x),
                &mut SimpleRng::new(seed_y),
            )
            .map_err(to_py_err)?;
            self.inner.apply_complex_effect(&effect).map_err(to_py_err)
        }

        fn create_image(
            &mut self,
            kind: &str,
            width: i64,
            height: i64,
            tile_size: i64,
            colors: Vec<String>,
        ) -> PyResult<()> {
            let kind = ProgrammaticImageType::from_name(kind)
                .ok_or_else(|| PyValueError::new_err(format!("unknown image type: {kind}")))?;
            let width = non_negative(width, "width").map_err(to_py_err)?;
            let height = non_negative(height, "height").map_err(to_py_err)?;
            let tile_size = non_negative(tile_size, "tile size").map_err(to_py_err)?;
            let colors = parse_colors(&colors)?;
            self.inner
                .create_image(kind, width, height, tile_size, &colors)
                .map_err(to_py_err)
        }
    }

    /// Python module definition
    #[pymodule]
    pub fn layerstag_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Pixel filters
        m.add_function(wrap_pyfunction!(blur, m)?)?;
        m.add_function(wrap_pyfunction!(sharpen, m)?)?;
        m.add_function(wrap_pyfunction!(monochrome, m)?)?;
        m.add_function(wrap_pyfunction!(sepia, m)?)?;
        m.add_function(wrap_pyfunction!(apply_filter, m)?)?;

        // Effects and generators
        m.add_function(wrap_pyfunction!(downscale, m)?)?;
        m.add_function(wrap_pyfunction!(mosaic, m)?)?;
        m.add_function(wrap_pyfunction!(checkerboard, m)?)?;

        // Layer model
        m.add_class::<LayerModel>()?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::layerstag_rust;
