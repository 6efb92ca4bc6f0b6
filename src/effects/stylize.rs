use std::f32::consts::FRAC_PI_2;

use crate::effects::edges::{GradientField, GradientOperator};
use crate::effects::sample_points;
use crate::foundation::color::Rgb8;
use crate::foundation::math::{clamp_u8, lerp};
use crate::foundation::raster::Raster;
use crate::layers::params::{ParamDescriptor, ParamValues, Params};

pub const SAMPLING: &str = "sampling";
pub const STROKE_LENGTH: &str = "strokeLength";
pub const EDGE_THRESHOLD: &str = "edgeThreshold";
pub const OVERWRITE_EDGES: &str = "overwriteEdges";
pub const BLACK_BACKGROUND: &str = "blackBackground";
pub const VECTOR_LENGTH: &str = "length";
pub const VECTOR_COLOUR: &str = "colour";
pub const VECTOR_ALPHA: &str = "alpha";

/// Short strokes laid along edges (perpendicular to the gradient), one per sample point.
///
/// Each stroke takes the colour under its origin and grows in both directions until it reaches
/// `strokeLength` or crosses an edge stronger than `edgeThreshold`, unless `overwriteEdges`.
pub fn painted_stylization(raster: &mut Raster, params: &ParamValues) {
    if raster.is_empty() {
        return;
    }
    let sampling = params.number(SAMPLING, 4.0);
    let length = params.number(STROKE_LENGTH, 8.0).max(0.0).round() as i64;
    let threshold = params.number(EDGE_THRESHOLD, 100.0);
    let overwrite = params.flag(OVERWRITE_EDGES, false);

    let src = raster.clone();
    let field = GradientField::compute(&src, GradientOperator::Sobel);
    let (w, h) = src.dimensions();

    for (x, y) in sample_points(&src, sampling) {
        let colour = src.pixel(x, y);
        let angle = field.direction(x, y) + FRAC_PI_2;
        let (dy, dx) = angle.sin_cos();
        for sign in [1.0f32, -1.0] {
            for s in 0..=length {
                let px = (x as f32 + sign * s as f32 * dx).round() as i64;
                let py = (y as f32 + sign * s as f32 * dy).round() as i64;
                if px < 0 || py < 0 || px >= i64::from(w) || py >= i64::from(h) {
                    break;
                }
                let (px, py) = (px as u32, py as u32);
                if s > 0 && !overwrite && field.magnitude(px, py) > threshold {
                    break;
                }
                raster.set_pixel(px, py, [colour[0], colour[1], colour[2], 255]);
            }
        }
    }
}

pub fn painted_stylization_schema() -> Params {
    Params::new()
        .with(SAMPLING, ParamDescriptor::number(4.0, 1.0, 32.0, 1.0))
        .with(STROKE_LENGTH, ParamDescriptor::number(8.0, 1.0, 64.0, 1.0))
        .with(EDGE_THRESHOLD, ParamDescriptor::number(100.0, 0.0, 255.0, 1.0))
        .with(OVERWRITE_EDGES, ParamDescriptor::flag(false))
}

/// White points on the sampling grid, optionally over black space.
pub fn points_in_space(raster: &mut Raster, params: &ParamValues) {
    let sampling = params.number(SAMPLING, 8.0);
    if params.flag(BLACK_BACKGROUND, true) {
        fill_opaque_black(raster);
    }
    let points: Vec<(u32, u32)> = sample_points(raster, sampling).collect();
    for (x, y) in points {
        raster.set_pixel(x, y, [255, 255, 255, 255]);
    }
}

pub fn points_in_space_schema() -> Params {
    Params::new()
        .with(SAMPLING, ParamDescriptor::number(8.0, 1.0, 64.0, 1.0))
        .with(BLACK_BACKGROUND, ParamDescriptor::flag(true))
}

/// Line strokes oriented along the local gradient, drawn in a configurable RGBA colour.
pub fn vectors_in_space(raster: &mut Raster, params: &ParamValues) {
    if raster.is_empty() {
        return;
    }
    let sampling = params.number(SAMPLING, 8.0);
    let length = params.number(VECTOR_LENGTH, 6.0).max(0.0);
    let colour = params.color(VECTOR_COLOUR, Rgb8::WHITE);
    let alpha = params.number(VECTOR_ALPHA, 255.0).clamp(0.0, 255.0) / 255.0;

    let field = GradientField::compute(raster, GradientOperator::Sobel);
    let points: Vec<(u32, u32)> = sample_points(raster, sampling).collect();
    if params.flag(BLACK_BACKGROUND, true) {
        fill_opaque_black(raster);
    }

    let (w, h) = raster.dimensions();
    let steps = length.ceil() as i64;
    for (x, y) in points {
        let (dy, dx) = field.direction(x, y).sin_cos();
        for s in 0..=steps {
            let t = s as f32;
            let px = (x as f32 + t * dx).round() as i64;
            let py = (y as f32 + t * dy).round() as i64;
            if px < 0 || py < 0 || px >= i64::from(w) || py >= i64::from(h) {
                break;
            }
            let (px, py) = (px as u32, py as u32);
            let under = raster.pixel(px, py);
            let out = [
                clamp_u8(lerp(f32::from(under[0]), f32::from(colour.r), alpha)),
                clamp_u8(lerp(f32::from(under[1]), f32::from(colour.g), alpha)),
                clamp_u8(lerp(f32::from(under[2]), f32::from(colour.b), alpha)),
                under[3].max(clamp_u8(alpha * 255.0)),
            ];
            raster.set_pixel(px, py, out);
        }
    }
}

pub fn vectors_in_space_schema() -> Params {
    Params::new()
        .with(SAMPLING, ParamDescriptor::number(8.0, 1.0, 64.0, 1.0))
        .with(VECTOR_LENGTH, ParamDescriptor::number(6.0, 1.0, 64.0, 1.0))
        .with(VECTOR_COLOUR, ParamDescriptor::color(Rgb8::WHITE))
        .with(VECTOR_ALPHA, ParamDescriptor::number(255.0, 0.0, 255.0, 1.0))
        .with(BLACK_BACKGROUND, ParamDescriptor::flag(true))
}

fn fill_opaque_black(raster: &mut Raster) {
    for px in raster.data_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&[0, 0, 0, 255]);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/stylize.rs"]
mod tests;
