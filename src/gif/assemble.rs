use crate::foundation::error::{LayerforgeError, LayerforgeResult};
use crate::foundation::math::natural_cmp;
use crate::foundation::raster::{PixelRect, Raster};
use crate::gif::frames::GifFrameStack;

/// Delay given to every frame of an assembled animation.
pub const ASSEMBLED_FRAME_DELAY_MS: u32 = 100;

#[derive(Clone, Debug)]
pub struct NamedImage {
    pub name: String,
    pub pixels: Raster,
}

impl NamedImage {
    pub fn new(name: impl Into<String>, pixels: Raster) -> Self {
        Self {
            name: name.into(),
            pixels,
        }
    }

    /// Decode an encoded still image (PNG, JPEG, BMP, WebP, GIF first frame).
    pub fn decode(name: impl Into<String>, bytes: &[u8]) -> LayerforgeResult<Self> {
        let name = name.into();
        let img = image::load_from_memory(bytes)
            .map_err(|e| LayerforgeError::decode_failed(format!("decode '{name}': {e}")))?;
        Ok(Self::new(name, Raster::from_rgba_image(img.to_rgba8())))
    }
}

/// Build a frame stack from still images.
///
/// Images are ordered by natural filename order ("img2" before "img10"). The first image in that
/// order sets the canvas; every image is scaled to fit it with its aspect ratio kept and centred on
/// opaque black.
#[tracing::instrument(level = "debug", skip_all, fields(images = images.len()))]
pub fn assemble(mut images: Vec<NamedImage>) -> LayerforgeResult<GifFrameStack> {
    if images.is_empty() {
        return Err(LayerforgeError::invalid_input("no images to assemble"));
    }
    images.sort_by(|a, b| natural_cmp(&a.name, &b.name));

    let (width, height) = images[0].pixels.dimensions();
    if width == 0 || height == 0 {
        return Err(LayerforgeError::invalid_input(format!(
            "first image '{}' is empty",
            images[0].name
        )));
    }

    let mut stack = GifFrameStack::new();
    for img in &images {
        let frame = fit_centred(&img.pixels, width, height)?;
        stack.add_frame(frame, ASSEMBLED_FRAME_DELAY_MS)?;
    }
    Ok(stack)
}

/// Scale `src` to fit `width x height` preserving aspect ratio and centre it on opaque black.
pub fn fit_centred(src: &Raster, width: u32, height: u32) -> LayerforgeResult<Raster> {
    let mut canvas = Raster::filled(width, height, [0, 0, 0, 255]);
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 {
        return Ok(canvas);
    }
    let scale = (width as f32 / sw as f32).min(height as f32 / sh as f32);
    let fw = ((sw as f32 * scale).round() as u32).clamp(1, width);
    let fh = ((sh as f32 * scale).round() as u32).clamp(1, height);
    let scaled = src.scale_to(fw, fh)?;
    let dx = i64::from((width - fw) / 2);
    let dy = i64::from((height - fh) / 2);
    canvas.draw_subregion(&scaled, PixelRect::new(0, 0, fw, fh), dx, dy);
    Ok(canvas)
}

#[cfg(test)]
#[path = "../../tests/unit/gif/assemble.rs"]
mod tests;
