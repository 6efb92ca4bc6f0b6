//! Layerforge is a non-destructive raster image editing core.
//!
//! An [`ImageEditor`] owns a base image and an ordered stack of effect layers. Each layer names an
//! effect from the [`EffectRegistry`] and blends its output over the layers below it at the
//! layer's opacity. Edits are recorded in a bounded undo/redo history. Rendering happens in two
//! tiers: a debounced low-resolution preview, then a full-quality pass on a background worker.
//!
//! Alongside the editor sit a GIF codec with a frame stack for per-frame work, and an animation
//! generator that sweeps one layer parameter into an animated GIF.
#![forbid(unsafe_code)]

pub mod animation;
pub mod editor;
pub mod effects;
pub mod foundation;
pub mod gif;
pub mod history;
pub mod layers;
pub mod render;

pub use crate::animation::{AnimationSpec, AnimationTarget, Ease, generate};
pub use crate::editor::{
    EditOptions, ImageEditor, ImageMeta, ImageSource, ResizeMode, StateChanged, SubscriptionId,
};
pub use crate::effects::registry::{EffectDef, EffectRegistry};
pub use crate::foundation::config::EditorConfig;
pub use crate::foundation::error::{CodecError, LayerforgeError, LayerforgeResult};
pub use crate::foundation::raster::{PixelRect, Raster};
pub use crate::gif::{GifFrame, GifFrameStack};
pub use crate::history::{HistoryManager, Snapshot};
pub use crate::layers::{Layer, LayerId, LayerManager, LayerPayload, ParamValue, ParamValues, Params};
pub use crate::render::{RenderScheduler, RenderStats, compose};
