use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::effects::blend::lerp_opaque_in_place;
use crate::effects::registry::EffectRegistry;
use crate::foundation::error::{LayerforgeError, LayerforgeResult};
use crate::foundation::raster::Raster;
use crate::layers::layer::LayerPayload;

/// Run the layer stack over `base`, bottom to top.
///
/// Each renderable layer applies its effect to a copy of the running output and blends it back by
/// the layer opacity; the result is always opaque once any layer has contributed. A layer naming an
/// unknown effect is skipped. A panicking effect aborts the whole composition with
/// [`LayerforgeError::RenderFailed`].
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(w = base.width(), h = base.height(), layers = layers.len())
)]
pub fn compose(
    base: &Raster,
    layers: &[LayerPayload],
    registry: &EffectRegistry,
) -> LayerforgeResult<Raster> {
    compose_owned(base.clone(), layers, registry)
}

/// [`compose`] taking ownership of the base, so callers that already own a copy avoid another.
pub fn compose_owned(
    mut out: Raster,
    layers: &[LayerPayload],
    registry: &EffectRegistry,
) -> LayerforgeResult<Raster> {
    for (index, layer) in layers.iter().enumerate() {
        if !layer.is_renderable() {
            continue;
        }
        let Some(effect_id) = layer.effect_id.as_deref() else {
            continue;
        };
        let Some(def) = registry.get(effect_id) else {
            tracing::warn!(index, effect_id, "unknown effect id, skipping layer");
            continue;
        };

        let mut tmp = out.clone();
        let apply = def.apply;
        let run = catch_unwind(AssertUnwindSafe(|| apply(&mut tmp, &layer.parameters)));
        if let Err(panic) = run {
            return Err(LayerforgeError::render_failed(format!(
                "effect '{effect_id}' on layer {index} panicked: {}",
                panic_message(panic.as_ref())
            )));
        }
        if tmp.dimensions() != out.dimensions() {
            return Err(LayerforgeError::render_failed(format!(
                "effect '{effect_id}' changed raster dimensions"
            )));
        }

        let width = out.width();
        lerp_opaque_in_place(out.data_mut(), tmp.data(), width, layer.opacity)?;
    }
    Ok(out)
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
