use std::collections::HashMap;

use crate::effects::{EffectFn, colour, edges, stylize};
use crate::foundation::raster::Raster;
use crate::layers::params::{ParamValues, Params};

pub const GREYSCALE: &str = "greyscale";
pub const SEPIA: &str = "sepia";
pub const FILM_EFFECTS: &str = "filmEffects";
pub const HSV_ADJUSTMENT: &str = "hsvAdjustment";
pub const PAINTED_STYLIZATION: &str = "paintedStylization";
pub const POINTS_IN_SPACE: &str = "pointsInSpace";
pub const VECTORS_IN_SPACE: &str = "vectorsInSpace";
pub const SOBEL_EDGES: &str = "sobelEdges";
pub const SOBEL_EDGES_COLOURED: &str = "sobelEdgesColouredDirections";
pub const PREWITT_EDGES: &str = "prewireEdges";
pub const PREWITT_EDGES_COLOURED: &str = "prewireEdgesColouredDirections";

/// One registered effect: its stable id, the function, and its default parameter schema.
#[derive(Clone, Copy)]
pub struct EffectDef {
    pub id: &'static str,
    pub label: &'static str,
    pub apply: EffectFn,
    pub schema: fn() -> Params,
}

impl std::fmt::Debug for EffectDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectDef")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Effect id → definition.
///
/// The registry is the single source of truth for resolving an id to code: layers store only the
/// id, and render jobs carry ids that the worker resolves against its shared handle.
#[derive(Clone, Debug, Default)]
pub struct EffectRegistry {
    defs: HashMap<&'static str, EffectDef>,
}

impl EffectRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the eleven built-in effects.
    pub fn builtin() -> Self {
        let mut reg = Self::empty();
        let defs: [(&'static str, &'static str, EffectFn, fn() -> Params); 11] = [
            (GREYSCALE, "Greyscale", colour::greyscale, colour::greyscale_schema),
            (SEPIA, "Sepia", colour::sepia, colour::sepia_schema),
            (
                FILM_EFFECTS,
                "Film effects",
                colour::film_effects,
                colour::film_effects_schema,
            ),
            (
                HSV_ADJUSTMENT,
                "HSV adjustment",
                colour::hsv_adjustment,
                colour::hsv_adjustment_schema,
            ),
            (
                PAINTED_STYLIZATION,
                "Painted stylization",
                stylize::painted_stylization,
                stylize::painted_stylization_schema,
            ),
            (
                POINTS_IN_SPACE,
                "Points in space",
                stylize::points_in_space,
                stylize::points_in_space_schema,
            ),
            (
                VECTORS_IN_SPACE,
                "Vectors in space",
                stylize::vectors_in_space,
                stylize::vectors_in_space_schema,
            ),
            (SOBEL_EDGES, "Sobel edges", edges::sobel_edges, edges::edges_schema),
            (
                SOBEL_EDGES_COLOURED,
                "Sobel edges (coloured directions)",
                edges::sobel_edges_coloured_directions,
                edges::edges_schema,
            ),
            (
                PREWITT_EDGES,
                "Prewitt edges",
                edges::prewitt_edges,
                edges::edges_schema,
            ),
            (
                PREWITT_EDGES_COLOURED,
                "Prewitt edges (coloured directions)",
                edges::prewitt_edges_coloured_directions,
                edges::edges_schema,
            ),
        ];
        for (id, label, apply, schema) in defs {
            reg.register(EffectDef {
                id,
                label,
                apply,
                schema,
            });
        }
        reg
    }

    /// Add or replace a definition. Returns the previous one with the same id.
    pub fn register(&mut self, def: EffectDef) -> Option<EffectDef> {
        self.defs.insert(def.id, def)
    }

    pub fn get(&self, id: &str) -> Option<&EffectDef> {
        self.defs.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.defs.contains_key(id)
    }

    /// Default parameter schema for `id`.
    pub fn schema(&self, id: &str) -> Option<Params> {
        self.defs.get(id).map(|d| (d.schema)())
    }

    /// Run effect `id` on `raster`. Returns `false` when the id is unknown.
    pub fn apply(&self, id: &str, raster: &mut Raster, params: &ParamValues) -> bool {
        match self.defs.get(id) {
            Some(def) => {
                (def.apply)(raster, params);
                true
            }
            None => false,
        }
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.defs.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/registry.rs"]
mod tests;
