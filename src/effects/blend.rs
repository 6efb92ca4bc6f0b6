use rayon::prelude::*;

use crate::foundation::error::{LayerforgeError, LayerforgeResult};
use crate::foundation::math::{clamp_u8, lerp};

/// Rows handed to one rayon task when blending.
const ROWS_PER_TASK: usize = 16;

/// Blend one straight-alpha pixel toward `src` by `opacity`, forcing the result opaque.
pub fn lerp_opaque(dst: [u8; 4], src: [u8; 4], opacity: f32) -> [u8; 4] {
    let t = opacity.clamp(0.0, 1.0);
    [
        clamp_u8(lerp(f32::from(dst[0]), f32::from(src[0]), t)),
        clamp_u8(lerp(f32::from(dst[1]), f32::from(src[1]), t)),
        clamp_u8(lerp(f32::from(dst[2]), f32::from(src[2]), t)),
        255,
    ]
}

/// `dst.rgb = lerp(dst.rgb, src.rgb, opacity)`, `dst.a = 255`, for equal-size RGBA8 buffers.
pub fn lerp_opaque_in_place(
    dst: &mut [u8],
    src: &[u8],
    width: u32,
    opacity: f32,
) -> LayerforgeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(LayerforgeError::render_failed(
            "lerp_opaque_in_place expects equal-length rgba8 buffers",
        ));
    }
    let chunk = (width.max(1) as usize) * 4 * ROWS_PER_TASK;
    dst.par_chunks_mut(chunk)
        .zip(src.par_chunks(chunk))
        .for_each(|(d_rows, s_rows)| {
            for (d, s) in d_rows.chunks_exact_mut(4).zip(s_rows.chunks_exact(4)) {
                let out = lerp_opaque([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
                d.copy_from_slice(&out);
            }
        });
    Ok(())
}

/// Force every pixel opaque without touching colour.
pub fn force_opaque(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        px[3] = 255;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blend.rs"]
mod tests;
