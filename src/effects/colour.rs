use crate::effects::for_each_pixel;
use crate::foundation::color::{hsv_to_rgb, rgb_to_hsv};
use crate::foundation::math::{clamp_u8, lerp};
use crate::foundation::raster::Raster;
use crate::layers::params::{ParamDescriptor, ParamValues, Params};

pub const SEPIA_INTENSITY: &str = "intensity";
pub const FILM_CONTRAST: &str = "contrast";
pub const FILM_PALETTE: &str = "colourPalette";
pub const HSV_HUE: &str = "hue";
pub const HSV_SATURATION: &str = "saturation";
pub const HSV_BRIGHTNESS: &str = "brightness";

/// Replace RGB with the mean of the three channels. Alpha is preserved.
pub fn greyscale(raster: &mut Raster, _params: &ParamValues) {
    for_each_pixel(raster, |px| {
        let avg = (f32::from(px[0]) + f32::from(px[1]) + f32::from(px[2])) / 3.0;
        let v = clamp_u8(avg);
        px[0] = v;
        px[1] = v;
        px[2] = v;
    });
}

pub fn greyscale_schema() -> Params {
    Params::new()
}

/// Interpolate toward the classic sepia matrix tone by `intensity`.
pub fn sepia(raster: &mut Raster, params: &ParamValues) {
    let t = params.number(SEPIA_INTENSITY, 1.0).clamp(0.0, 1.0);
    for_each_pixel(raster, |px| {
        let r = f32::from(px[0]);
        let g = f32::from(px[1]);
        let b = f32::from(px[2]);
        let tr = 0.393 * r + 0.769 * g + 0.189 * b;
        let tg = 0.349 * r + 0.686 * g + 0.168 * b;
        let tb = 0.272 * r + 0.534 * g + 0.131 * b;
        px[0] = clamp_u8(lerp(r, tr, t));
        px[1] = clamp_u8(lerp(g, tg, t));
        px[2] = clamp_u8(lerp(b, tb, t));
    });
}

pub fn sepia_schema() -> Params {
    Params::new().with(SEPIA_INTENSITY, ParamDescriptor::number(1.0, 0.0, 1.0, 0.01))
}

/// Contrast curve plus a warm/cool palette shift.
///
/// `contrast` is centred on 128 (identity). `colourPalette` > 0 warms (more red, less blue),
/// < 0 cools.
pub fn film_effects(raster: &mut Raster, params: &ParamValues) {
    let contrast = params.number(FILM_CONTRAST, 128.0).clamp(0.0, 255.0);
    let palette = params.number(FILM_PALETTE, 0.0).clamp(-100.0, 100.0);

    let adjust = ((contrast - 128.0) * 2.0).clamp(-255.0, 254.0);
    let factor = (259.0 * (adjust + 255.0)) / (255.0 * (259.0 - adjust));
    let shift = palette * 0.3;

    for_each_pixel(raster, |px| {
        let curve = |c: u8| factor * (f32::from(c) - 128.0) + 128.0;
        px[0] = clamp_u8(curve(px[0]) + shift);
        px[1] = clamp_u8(curve(px[1]));
        px[2] = clamp_u8(curve(px[2]) - shift);
    });
}

pub fn film_effects_schema() -> Params {
    Params::new()
        .with(FILM_CONTRAST, ParamDescriptor::number(128.0, 0.0, 255.0, 1.0))
        .with(FILM_PALETTE, ParamDescriptor::number(0.0, -100.0, 100.0, 1.0))
}

/// Hue rotation in degrees, saturation and brightness as percentage deltas.
pub fn hsv_adjustment(raster: &mut Raster, params: &ParamValues) {
    let hue = params.number(HSV_HUE, 0.0);
    let sat = 1.0 + params.number(HSV_SATURATION, 0.0).clamp(-100.0, 100.0) / 100.0;
    let bri = 1.0 + params.number(HSV_BRIGHTNESS, 0.0).clamp(-100.0, 100.0) / 100.0;
    if hue.rem_euclid(360.0) == 0.0 && sat == 1.0 && bri == 1.0 {
        return;
    }

    for_each_pixel(raster, |px| {
        let (h, s, v) = rgb_to_hsv(f32::from(px[0]), f32::from(px[1]), f32::from(px[2]));
        let (r, g, b) = hsv_to_rgb(h + hue, s * sat, v * bri);
        px[0] = clamp_u8(r);
        px[1] = clamp_u8(g);
        px[2] = clamp_u8(b);
    });
}

pub fn hsv_adjustment_schema() -> Params {
    Params::new()
        .with(HSV_HUE, ParamDescriptor::number(0.0, -180.0, 180.0, 1.0))
        .with(HSV_SATURATION, ParamDescriptor::number(0.0, -100.0, 100.0, 1.0))
        .with(HSV_BRIGHTNESS, ParamDescriptor::number(0.0, -100.0, 100.0, 1.0))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/colour.rs"]
mod tests;
