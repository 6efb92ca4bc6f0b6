use super::*;
use crate::layers::params::ParamValue;

/// Left half black, right half white, 4x2.
fn step_edge() -> Raster {
    let mut r = Raster::filled(4, 2, [0, 0, 0, 255]);
    for y in 0..2 {
        for x in 2..4 {
            r.set_pixel(x, y, [255, 255, 255, 255]);
        }
    }
    r
}

#[test]
fn flat_image_has_zero_gradient() {
    let r = Raster::filled(3, 3, [90, 90, 90, 255]);
    let field = GradientField::compute(&r, GradientOperator::Sobel);
    for y in 0..3 {
        for x in 0..3 {
            assert_eq!(field.magnitude(x, y), 0.0);
        }
    }
}

#[test]
fn vertical_step_points_along_x() {
    let field = GradientField::compute(&step_edge(), GradientOperator::Sobel);
    // Clamp-to-border: the column next to the step sees the full jump on both sides of the kernel.
    assert_eq!(field.magnitude(1, 0), 4.0 * 255.0);
    assert_eq!(field.direction(1, 0), 0.0);
    assert_eq!(field.magnitude(0, 0), 0.0);

    let prewitt = GradientField::compute(&step_edge(), GradientOperator::Prewitt);
    assert_eq!(prewitt.magnitude(1, 0), 3.0 * 255.0);
}

#[test]
fn sobel_marks_edges_white_and_keeps_background() {
    let mut r = step_edge();
    sobel_edges(&mut r, &edges_schema().values());
    assert_eq!(r.pixel(1, 0), [255, 255, 255, 255]);
    assert_eq!(r.pixel(2, 0), [255, 255, 255, 255]);
    assert_eq!(r.pixel(0, 0), [0, 0, 0, 255]);
}

#[test]
fn transparent_background_clears_non_edges() {
    let mut r = Raster::filled(4, 2, [200, 10, 10, 255]);
    r.set_pixel(3, 0, [255, 255, 255, 255]);
    let p = edges_schema()
        .values()
        .with(EDGE_TRANSPARENT, ParamValue::Bool(true))
        .with(EDGE_THRESHOLD, ParamValue::Number(255.0));
    prewitt_edges(&mut r, &p);
    assert_eq!(r.pixel(0, 1), [0, 0, 0, 0]);
}

#[test]
fn coloured_directions_encode_angle_as_hue() {
    let mut r = step_edge();
    sobel_edges_coloured_directions(&mut r, &edges_schema().values());
    // Gradient angle 0 degrees maps to pure red.
    assert_eq!(r.pixel(1, 1), [255, 0, 0, 255]);
}
