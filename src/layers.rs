//! Layer stack and the editing model built on it.
//!
//! ## Ownership
//!
//! Layer images are held as `Arc<PixelBuffer>` so the model can express which
//! operations share a buffer and which take a snapshot:
//!
//! | Operation | Layer slot | Current image |
//! |-----------|------------|---------------|
//! | [`Model::set_image`] | stores the given `Arc` | fresh copy |
//! | [`Model::update_img_to_current_layer`] | unchanged | same `Arc` as the layer |
//! | [`Model::apply_filter`] | result `Arc` | fresh copy of the result |
//!
//! Buffers are never written after they are shared, so a shared buffer and a
//! copy only differ in identity (`Arc::ptr_eq`), never in content.
//!
//! The model has no internal locking; callers serialize access.

use std::sync::Arc;

use crate::buffer::PixelBuffer;
use crate::error::{EditorError, Result};
use crate::filters::{ImageEffect, PixelFilter};
use crate::generate::{Color, ProgrammaticImageType};

/// One image slot in the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    image: Option<Arc<PixelBuffer>>,
    name: Option<String>,
    visible: bool,
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer {
    /// Empty, unnamed, visible layer.
    pub fn new() -> Self {
        Layer {
            image: None,
            name: None,
            visible: true,
        }
    }

    pub fn with_image(image: impl Into<Arc<PixelBuffer>>, name: Option<String>) -> Self {
        Layer {
            image: Some(image.into()),
            name,
            visible: true,
        }
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn image(&self) -> Option<&Arc<PixelBuffer>> {
        self.image.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn toggle_visibility(&mut self) {
        self.visible = !self.visible;
    }
}

/// Ordered layer stack (index 0 is the bottom) plus the current selection.
///
/// While the stack is non-empty, `0 <= current_index < len`.
#[derive(Debug, Clone, Default)]
pub struct Model {
    layers: Vec<Layer>,
    current_index: usize,
    current_image: Option<Arc<PixelBuffer>>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Stack structure
    // ========================================================================

    /// Append an empty layer.
    ///
    /// The current index moves to the new layer, except for the very first
    /// layer of an empty stack where it stays at 0.
    pub fn add_layer(&mut self) {
        let first = self.layers.is_empty();
        self.layers.push(Layer::new());
        if !first {
            self.current_index = self.layers.len() - 1;
        }
        tracing::debug!(
            layers = self.layers.len(),
            current_index = self.current_index,
            "layer added"
        );
    }

    /// Drop the top layer of the stack, whichever layer is current.
    ///
    /// The current index is pulled back onto the stack if it pointed at the
    /// removed layer. The current image is left as it was.
    pub fn remove_layer(&mut self) -> Result<Layer> {
        let removed = self
            .layers
            .pop()
            .ok_or_else(|| EditorError::invalid_state("cannot remove a layer from an empty stack"))?;
        if self.current_index >= self.layers.len() {
            self.current_index = self.layers.len().saturating_sub(1);
        }
        tracing::debug!(
            layers = self.layers.len(),
            current_index = self.current_index,
            "layer removed"
        );
        Ok(removed)
    }

    /// Replace the whole stack. Layer 0 becomes current.
    pub fn set_all_layers(&mut self, layers: Vec<Layer>) {
        self.layers = layers;
        self.current_index = 0;
        self.current_image = self.layers.first().and_then(|layer| layer.image.clone());
        tracing::debug!(layers = self.layers.len(), "layer stack replaced");
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.layers.len() {
            Ok(())
        } else {
            Err(EditorError::invalid_input(format!(
                "layer index {index} is out of range for {} layers",
                self.layers.len()
            )))
        }
    }

    fn current_layer_mut(&mut self) -> Result<&mut Layer> {
        let index = self.current_index;
        self.layers
            .get_mut(index)
            .ok_or_else(|| EditorError::invalid_state("the layer stack is empty"))
    }

    // ========================================================================
    // Images
    // ========================================================================

    /// Store `image` in the current layer and show a copy of it.
    ///
    /// The layer keeps the very `Arc` passed in; the current image is a new
    /// buffer with the same content.
    pub fn set_image(&mut self, image: impl Into<Arc<PixelBuffer>>) -> Result<()> {
        let image = image.into();
        let snapshot = Arc::new(PixelBuffer::clone(&image));
        self.current_layer_mut()?.image = Some(image);
        self.current_image = Some(snapshot);
        Ok(())
    }

    /// The image currently shown.
    ///
    /// Fails with invalid state until some image has been set or selected.
    pub fn get_current_image(&self) -> Result<&Arc<PixelBuffer>> {
        self.current_image
            .as_ref()
            .ok_or_else(|| EditorError::invalid_state("there is no current image"))
    }

    /// Image stored in layer `index`, if that layer has one.
    pub fn get_image_at(&self, index: usize) -> Result<Option<&Arc<PixelBuffer>>> {
        self.check_index(index)?;
        Ok(self.layers[index].image.as_ref())
    }

    /// Make layer `index` current and show its stored image itself, not a copy.
    pub fn update_img_to_current_layer(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.current_index = index;
        self.current_image = self.layers[index].image.clone();
        tracing::debug!(current_index = index, "current layer switched");
        Ok(())
    }

    /// Generate an image on a new layer and make it current.
    ///
    /// Parameters are validated before the stack changes, so a rejected
    /// request leaves the model untouched.
    pub fn create_image(
        &mut self,
        kind: ProgrammaticImageType,
        width: usize,
        height: usize,
        tile_size: usize,
        colors: &[Color],
    ) -> Result<()> {
        let image = kind.generate(width, height, tile_size, colors)?;
        tracing::debug!(?kind, width, height, tile_size, "creating programmatic image");
        self.add_layer();
        self.set_image(image)
    }

    // ========================================================================
    // Filters and effects
    // ========================================================================

    /// Filter the current image and store the result in the current layer.
    pub fn apply_filter<F: PixelFilter + ?Sized>(&mut self, filter: &F) -> Result<()> {
        let result = filter.apply(self.get_current_image()?)?;
        tracing::debug!(
            filter = filter.name(),
            current_index = self.current_index,
            "filter applied"
        );
        self.set_image(result)
    }

    /// Run a whole-image effect.
    ///
    /// Effects that apply to all layers transform every layer's image and
    /// then refresh the current image from the current layer. Every layer is
    /// transformed before any is replaced, so one failure leaves the stack
    /// as it was. Other effects only transform the current image.
    pub fn apply_complex_effect<E: ImageEffect + ?Sized>(&mut self, effect: &E) -> Result<()> {
        if !effect.applies_to_all() {
            let result = effect.apply_effect(self.get_current_image()?)?;
            tracing::debug!(
                effect = effect.name(),
                current_index = self.current_index,
                "effect applied to current image"
            );
            return self.set_image(result);
        }

        if self.layers.is_empty() {
            return Err(EditorError::invalid_state("the layer stack is empty"));
        }
        let results = self
            .layers
            .iter()
            .enumerate()
            .map(|(index, layer)| {
                let image = layer.image.as_ref().ok_or_else(|| {
                    EditorError::invalid_state(format!("layer {index} has no image"))
                })?;
                effect.apply_effect(image).map(Arc::new)
            })
            .collect::<Result<Vec<_>>>()?;

        for (layer, result) in self.layers.iter_mut().zip(results) {
            layer.image = Some(result);
        }
        tracing::debug!(
            effect = effect.name(),
            layers = self.layers.len(),
            "effect applied to all layers"
        );

        let current = self.layers[self.current_index].image.clone();
        match current {
            Some(image) => self.set_image(image),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Visibility and naming
    // ========================================================================

    pub fn adjust_visibility(&mut self, index: usize, visible: bool) -> Result<()> {
        self.check_index(index)?;
        self.layers[index].visible = visible;
        tracing::debug!(index, visible, "layer visibility changed");
        Ok(())
    }

    /// Index of the highest visible layer.
    pub fn topmost_visible_index(&self) -> Option<usize> {
        self.layers.iter().rposition(Layer::is_visible)
    }

    /// The highest visible layer, or `None` when every layer is hidden.
    pub fn get_current_topmost_visible(&self) -> Option<&Layer> {
        self.topmost_visible_index().map(|index| &self.layers[index])
    }

    /// Name the topmost visible layer.
    pub fn save(&mut self, name: impl Into<String>) -> Result<()> {
        let index = self
            .topmost_visible_index()
            .ok_or_else(|| EditorError::invalid_state("no visible layer to save"))?;
        let name = name.into();
        tracing::debug!(index, name = %name, "layer saved");
        self.layers[index].set_name(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{Blur, Filter, Sepia};
    use crate::generate::checkerboard;
    use crate::layer_effects::{Downscale, Mosaic, SimpleRng};

    fn gradient(width: usize, height: usize) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| [(x * 20) as u8, (y * 20) as u8, 90])
    }

    #[test]
    fn test_new_layer_defaults() {
        let layer = Layer::new();
        assert!(layer.image().is_none());
        assert!(layer.name().is_none());
        assert!(layer.is_visible());
    }

    #[test]
    fn test_layer_visibility_helpers() {
        let mut layer = Layer::with_image(gradient(2, 2), Some("base".into())).with_visibility(false);
        assert_eq!(layer.name(), Some("base"));
        assert!(!layer.is_visible());
        layer.toggle_visibility();
        assert!(layer.is_visible());
        layer.set_visible(false);
        assert!(!layer.is_visible());
    }

    #[test]
    fn test_add_layer_index_quirk() {
        let mut model = Model::new();
        model.add_layer();
        assert_eq!(model.current_index(), 0);
        model.add_layer();
        assert_eq!(model.current_index(), 1);
        model.add_layer();
        assert_eq!(model.current_index(), 2);
        assert_eq!(model.len(), 3);
    }

    #[test]
    fn test_remove_layer() {
        let mut model = Model::new();
        assert!(model.remove_layer().unwrap_err().is_invalid_state());

        model.add_layer();
        model.add_layer();
        model.add_layer();
        model.update_img_to_current_layer(0).unwrap();
        model.remove_layer().unwrap();
        // Removes the top, not the current layer
        assert_eq!(model.len(), 2);
        assert_eq!(model.current_index(), 0);

        model.update_img_to_current_layer(1).unwrap();
        model.remove_layer().unwrap();
        assert_eq!(model.current_index(), 0);
        model.remove_layer().unwrap();
        assert!(model.is_empty());
        assert_eq!(model.current_index(), 0);
    }

    #[test]
    fn test_current_image_before_any_image() {
        let mut model = Model::new();
        assert!(model.get_current_image().unwrap_err().is_invalid_state());
        model.add_layer();
        assert!(model.get_current_image().unwrap_err().is_invalid_state());
        assert!(model.apply_filter(&Blur).unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_set_image_requires_layer() {
        let mut model = Model::new();
        assert!(model.set_image(gradient(2, 2)).unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_set_image_aliases_storage_and_copies_view() {
        let mut model = Model::new();
        model.add_layer();
        let image = Arc::new(gradient(3, 2));
        model.set_image(Arc::clone(&image)).unwrap();

        let stored = model.get_image_at(0).unwrap().unwrap();
        assert!(Arc::ptr_eq(stored, &image));

        let current = model.get_current_image().unwrap();
        assert!(!Arc::ptr_eq(current, &image));
        assert_eq!(**current, *image);
    }

    #[test]
    fn test_switching_layers_aliases() {
        let mut model = Model::new();
        model.add_layer();
        model.add_layer();
        model.update_img_to_current_layer(1).unwrap();
        let image = Arc::new(gradient(4, 4));
        model.set_image(Arc::clone(&image)).unwrap();

        model.update_img_to_current_layer(0).unwrap();
        assert_eq!(model.get_image_at(0), Ok(None));
        assert!(model.get_current_image().is_err());

        model.update_img_to_current_layer(1).unwrap();
        assert!(Arc::ptr_eq(model.get_current_image().unwrap(), &image));
    }

    #[test]
    fn test_index_bounds() {
        let mut model = Model::new();
        model.add_layer();
        assert!(model.update_img_to_current_layer(1).unwrap_err().is_invalid_input());
        assert!(model.adjust_visibility(1, false).unwrap_err().is_invalid_input());
        assert!(model.get_image_at(3).unwrap_err().is_invalid_input());
        assert_eq!(model.current_index(), 0);
    }

    #[test]
    fn test_apply_filter_updates_layer_and_view() {
        let mut model = Model::new();
        model.add_layer();
        let image = gradient(5, 4);
        model.set_image(image.clone()).unwrap();
        model.apply_filter(&Filter::Sepia).unwrap();

        let expected = Sepia.apply(&image).unwrap();
        assert_eq!(**model.get_current_image().unwrap(), expected);
        assert_eq!(**model.get_image_at(0).unwrap().unwrap(), expected);
    }

    #[test]
    fn test_create_image() {
        let mut model = Model::new();
        let colors = [Color::Black, Color::White];
        model
            .create_image(ProgrammaticImageType::Checkerboard, 4, 4, 2, &colors)
            .unwrap();
        assert_eq!(model.len(), 1);
        let expected = checkerboard(4, 4, 2, &colors).unwrap();
        assert_eq!(**model.get_current_image().unwrap(), expected);
        assert_eq!(**model.get_image_at(0).unwrap().unwrap(), expected);
    }

    #[test]
    fn test_create_image_rejects_before_mutating() {
        let mut model = Model::new();
        let result = model.create_image(ProgrammaticImageType::Checkerboard, 4, 4, 5, &[Color::Red, Color::Blue]);
        assert!(result.unwrap_err().is_invalid_input());
        assert!(model.is_empty());
    }

    #[test]
    fn test_effect_on_all_layers() {
        let mut model = Model::new();
        model.add_layer();
        model.set_image(gradient(8, 8)).unwrap();
        model.add_layer();
        model.set_image(PixelBuffer::filled(6, 6, [9, 9, 9])).unwrap();
        model.update_img_to_current_layer(0).unwrap();

        model.apply_complex_effect(&Downscale::new(3, 3)).unwrap();
        for index in 0..2 {
            let image = model.get_image_at(index).unwrap().unwrap();
            assert_eq!((image.width(), image.height()), (3, 3));
        }
        let current = model.get_current_image().unwrap();
        assert_eq!(**current, **model.get_image_at(0).unwrap().unwrap());
    }

    #[test]
    fn test_effect_on_all_layers_is_atomic() {
        let mut model = Model::new();
        model.add_layer();
        model.set_image(gradient(8, 8)).unwrap();
        model.add_layer();
        model.set_image(gradient(2, 2)).unwrap();

        let before: Vec<Layer> = model.layers().to_vec();
        assert!(model.apply_complex_effect(&Downscale::new(4, 4)).unwrap_err().is_invalid_input());
        assert_eq!(model.layers(), before.as_slice());
    }

    #[test]
    fn test_effect_on_all_layers_needs_images() {
        let mut model = Model::new();
        assert!(model.apply_complex_effect(&Downscale::new(1, 1)).unwrap_err().is_invalid_state());
        model.add_layer();
        model.set_image(gradient(4, 4)).unwrap();
        model.add_layer();
        assert!(model.apply_complex_effect(&Downscale::new(1, 1)).unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_effect_on_current_image_only() {
        let mut model = Model::new();
        model.add_layer();
        let base = gradient(4, 4);
        model.set_image(base.clone()).unwrap();
        model.add_layer();
        let top = PixelBuffer::filled(4, 4, [200, 100, 50]);
        model.set_image(top.clone()).unwrap();

        let mosaic = Mosaic::initialize(0, &top, &mut SimpleRng::new(1), &mut SimpleRng::new(2)).unwrap();
        model.apply_complex_effect(&mosaic).unwrap();
        assert_eq!(**model.get_image_at(0).unwrap().unwrap(), base);
        assert_eq!(**model.get_image_at(1).unwrap().unwrap(), top);
    }

    #[test]
    fn test_topmost_visible_and_save() {
        let mut model = Model::new();
        assert!(model.get_current_topmost_visible().is_none());
        assert!(model.save("nothing").unwrap_err().is_invalid_state());

        model.add_layer();
        model.add_layer();
        model.add_layer();
        model.adjust_visibility(2, false).unwrap();
        assert_eq!(model.topmost_visible_index(), Some(1));

        model.save("picture.ppm").unwrap();
        assert_eq!(model.layers()[1].name(), Some("picture.ppm"));
        assert_eq!(model.get_current_topmost_visible().and_then(Layer::name), Some("picture.ppm"));

        for index in 0..3 {
            model.adjust_visibility(index, false).unwrap();
        }
        assert!(model.get_current_topmost_visible().is_none());
    }

    #[test]
    fn test_set_all_layers() {
        let mut model = Model::new();
        model.add_layer();
        model.add_layer();
        let bottom = Arc::new(gradient(2, 3));
        model.set_all_layers(vec![
            Layer::with_image(Arc::clone(&bottom), Some("bottom".into())),
            Layer::new(),
        ]);
        assert_eq!(model.len(), 2);
        assert_eq!(model.current_index(), 0);
        assert!(Arc::ptr_eq(model.get_current_image().unwrap(), &bottom));
    }
}
