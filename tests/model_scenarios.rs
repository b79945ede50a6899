//! End-to-end scenarios driving the layer model through its public API.

use std::sync::Arc;

use layerstag_rust::generate::checkerboard;
use layerstag_rust::{
    Color, Downscale, Effect, Filter, Model, Mosaic, PixelBuffer, PixelFilter, ProgrammaticImageType, Sepia,
    SimpleRng,
};

#[test]
fn checkerboard_then_sepia() {
    let colors = [Color::Black, Color::White];
    let mut model = Model::new();
    model
        .create_image(ProgrammaticImageType::Checkerboard, 3, 3, 1, &colors)
        .unwrap();
    model.apply_filter(&Filter::Sepia).unwrap();

    let expected = Sepia.apply(&checkerboard(3, 3, 1, &colors).unwrap()).unwrap();
    assert_eq!(**model.get_current_image().unwrap(), expected);
    assert_eq!(expected.pixel(0, 0), Ok([0, 0, 0]));
    assert_eq!(expected.pixel(1, 0), Ok([255, 255, 239]));
}

#[test]
fn switching_layers_shares_the_stored_image() {
    let mut model = Model::new();
    model.add_layer();
    model.add_layer();
    model.update_img_to_current_layer(1).unwrap();

    let image = Arc::new(PixelBuffer::from_fn(4, 3, |x, y| [x as u8, y as u8, 42]));
    model.set_image(Arc::clone(&image)).unwrap();

    model.update_img_to_current_layer(0).unwrap();
    assert_eq!(model.get_image_at(0), Ok(None));
    assert!(model.get_current_image().unwrap_err().is_invalid_state());

    model.update_img_to_current_layer(1).unwrap();
    let current = model.get_current_image().unwrap();
    assert!(Arc::ptr_eq(current, &image));
    assert!(Arc::ptr_eq(current, model.get_image_at(1).unwrap().unwrap()));
}

#[test]
fn three_adds_point_at_the_last_layer() {
    let mut model = Model::new();
    for _ in 0..3 {
        model.add_layer();
    }
    assert_eq!(model.current_index(), 2);
    assert_eq!(model.len(), 3);
}

#[test]
fn downscale_reaches_every_layer() {
    let mut model = Model::new();
    let colors = [Color::Red, Color::Green];
    model
        .create_image(ProgrammaticImageType::Checkerboard, 40, 20, 10, &colors)
        .unwrap();
    model
        .create_image(ProgrammaticImageType::Checkerboard, 40, 20, 5, &colors)
        .unwrap();
    assert_eq!(model.current_index(), 1);

    model.apply_complex_effect(&Effect::from(Downscale::new(4, 2))).unwrap();

    assert_eq!(
        **model.get_image_at(0).unwrap().unwrap(),
        checkerboard(4, 2, 1, &colors).unwrap()
    );
    let top = model.get_image_at(1).unwrap().unwrap();
    assert_eq!((top.width(), top.height()), (4, 2));
    assert_eq!(**model.get_current_image().unwrap(), **top);
}

#[test]
fn mosaic_then_blur_stays_on_current_layer() {
    let mut model = Model::new();
    model.add_layer();
    let base = PixelBuffer::filled(6, 6, [10, 20, 30]);
    model.set_image(base.clone()).unwrap();
    model.add_layer();
    let gradient = PixelBuffer::from_fn(6, 6, |x, y| [(x * 40) as u8, (y * 40) as u8, 128]);
    model.set_image(gradient.clone()).unwrap();

    let mosaic = Mosaic::initialize(4, &gradient, &mut SimpleRng::new(3), &mut SimpleRng::new(8)).unwrap();
    model.apply_complex_effect(&mosaic).unwrap();
    let mosaicked = mosaic.apply(&gradient).unwrap();
    assert_eq!(**model.get_current_image().unwrap(), mosaicked);

    model.apply_filter(&Filter::Blur).unwrap();
    assert_eq!(**model.get_current_image().unwrap(), Filter::Blur.apply(&mosaicked).unwrap());
    assert_eq!(**model.get_image_at(0).unwrap().unwrap(), base);
}

#[test]
fn visibility_decides_what_save_names() {
    let mut model = Model::new();
    model
        .create_image(ProgrammaticImageType::Checkerboard, 2, 2, 1, &[Color::Blue, Color::Yellow])
        .unwrap();
    model.add_layer();
    model.adjust_visibility(1, false).unwrap();

    model.save("out.ppm").unwrap();
    let top = model.get_current_topmost_visible().unwrap();
    assert_eq!(top.name(), Some("out.ppm"));
    assert!(top.image().is_some());
    assert_eq!(model.layers()[1].name(), None);
}
