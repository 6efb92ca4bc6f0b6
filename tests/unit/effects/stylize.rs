use super::*;
use crate::layers::params::ParamValue;

fn count(r: &Raster, rgba: [u8; 4]) -> usize {
    r.data().chunks_exact(4).filter(|p| *p == rgba).count()
}

#[test]
fn points_walk_the_flat_array_with_pixel_stride() {
    let mut r = Raster::filled(4, 2, [50, 50, 50, 255]);
    let p = points_in_space_schema()
        .values()
        .with(SAMPLING, ParamValue::Number(3.0));
    points_in_space(&mut r, &p);
    // Pixels 0, 3, 6 of the 8-pixel flat array.
    assert_eq!(r.pixel(0, 0), [255, 255, 255, 255]);
    assert_eq!(r.pixel(3, 0), [255, 255, 255, 255]);
    assert_eq!(r.pixel(2, 1), [255, 255, 255, 255]);
    assert_eq!(count(&r, [255, 255, 255, 255]), 3);
    assert_eq!(count(&r, [0, 0, 0, 255]), 5);
}

#[test]
fn points_without_black_background_keep_the_image() {
    let mut r = Raster::filled(2, 1, [50, 50, 50, 255]);
    let p = points_in_space_schema()
        .values()
        .with(SAMPLING, ParamValue::Number(2.0))
        .with(BLACK_BACKGROUND, ParamValue::Bool(false));
    points_in_space(&mut r, &p);
    assert_eq!(r.pixel(1, 0), [50, 50, 50, 255]);
}

#[test]
fn painted_flat_image_is_unchanged_in_colour() {
    let mut r = Raster::filled(6, 6, [10, 120, 200, 255]);
    painted_stylization(&mut r, &painted_stylization_schema().values());
    assert_eq!(count(&r, [10, 120, 200, 255]), 36);
}

#[test]
fn painted_strokes_stop_at_strong_edges() {
    // Black left half, white right half; strokes run vertically along the boundary.
    let mut r = Raster::filled(8, 8, [0, 0, 0, 255]);
    for y in 0..8 {
        for x in 4..8 {
            r.set_pixel(x, y, [255, 255, 255, 255]);
        }
    }
    let before = r.clone();
    painted_stylization(&mut r, &painted_stylization_schema().values());
    // Strokes follow edges, so nothing dark bleeds into the white half.
    for y in 0..8 {
        for x in 5..8 {
            assert_eq!(r.pixel(x, y), before.pixel(x, y));
        }
    }
}

#[test]
fn vectors_draw_configured_colour_over_black() {
    let mut r = Raster::filled(4, 4, [100, 100, 100, 255]);
    let p = vectors_in_space_schema()
        .values()
        .with(SAMPLING, ParamValue::Number(16.0))
        .with(VECTOR_LENGTH, ParamValue::Number(3.0))
        .with(VECTOR_COLOUR, ParamValue::Text("#ff0000".into()));
    vectors_in_space(&mut r, &p);
    // Flat input: gradient angle 0, so the single stroke runs along the first row.
    for x in 0..4 {
        assert_eq!(r.pixel(x, 0), [255, 0, 0, 255]);
    }
    assert_eq!(r.pixel(0, 1), [0, 0, 0, 255]);
}
