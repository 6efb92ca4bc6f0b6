//! Built-in raster effects.
//!
//! Every effect is a plain function `fn(&mut Raster, &ParamValues)` that rewrites the raster in
//! place. Effects are looked up by stable string id through [`registry::EffectRegistry`], which is
//! also what the render worker uses, so an effect never crosses a thread boundary as a closure.

use rayon::prelude::*;

use crate::foundation::raster::Raster;
use crate::layers::params::ParamValues;

pub mod blend;
pub mod colour;
pub mod edges;
pub mod registry;
pub mod stylize;

/// Signature shared by all effects.
pub type EffectFn = fn(&mut Raster, &ParamValues);

/// Apply `f` to every RGBA pixel, one rayon task per row.
pub(crate) fn for_each_pixel<F>(raster: &mut Raster, f: F)
where
    F: Fn(&mut [u8]) + Sync + Send,
{
    let row_bytes = (raster.width() as usize) * 4;
    if row_bytes == 0 {
        return;
    }
    raster
        .data_mut()
        .par_chunks_mut(row_bytes)
        .for_each(|row| row.chunks_exact_mut(4).for_each(&f));
}

/// Byte offsets visited by sampling-driven effects, as pixel coordinates.
///
/// The walk steps through the flat byte array with stride `max(1, 4 * sampling)`, so the grid
/// wraps across rows instead of restarting at each row.
pub(crate) fn sample_points(raster: &Raster, sampling: f32) -> impl Iterator<Item = (u32, u32)> {
    let sampling = if sampling.is_finite() {
        sampling.round().max(0.0) as usize
    } else {
        0
    };
    let stride = sampling.saturating_mul(4).max(1);
    let width = raster.width().max(1) as usize;
    let len = raster.data().len();
    (0..len).step_by(stride).map(move |off| {
        let p = off / 4;
        ((p % width) as u32, (p / width) as u32)
    })
}
