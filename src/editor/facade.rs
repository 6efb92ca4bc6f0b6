use std::sync::Arc;
use std::time::Instant;

use image::imageops::FilterType;

use crate::animation::generator::{self, AnimationSpec, AnimationTarget};
use crate::editor::events::{EventBus, StateChanged, SubscriptionId};
use crate::editor::source::{self, ImageMeta, ImageSource};
use crate::effects::registry::EffectRegistry;
use crate::foundation::config::EditorConfig;
use crate::foundation::error::{LayerforgeError, LayerforgeResult};
use crate::foundation::raster::{PixelRect, Raster};
use crate::gif::decode::decode_with_min_delay;
use crate::gif::encode::EncodeOptions;
use crate::gif::frames::GifFrameStack;
use crate::history::{HistoryManager, Snapshot};
use crate::layers::{Layer, LayerManager, ParamValue, ParamValues};
use crate::render::scheduler::{RenderRequest, RenderScheduler, RenderStats, SchedulerConfig};

/// How a mutation is recorded and rendered.
///
/// Slider drags use [`EditOptions::TRANSIENT`] for intermediate values and
/// [`EditOptions::COMMIT`] on release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditOptions {
    pub snapshot: bool,
    pub defer_render: bool,
}

impl EditOptions {
    pub const COMMIT: Self = Self {
        snapshot: true,
        defer_render: false,
    };

    pub const TRANSIENT: Self = Self {
        snapshot: false,
        defer_render: true,
    };
}

impl Default for EditOptions {
    fn default() -> Self {
        Self::COMMIT
    }
}

/// Resampling used by [`ImageEditor::resize_canvas`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResizeMode {
    #[default]
    Default,
    Bilinear,
    NearestNeighbour,
}

impl ResizeMode {
    pub fn filter(self) -> FilterType {
        match self {
            Self::NearestNeighbour => FilterType::Nearest,
            Self::Default | Self::Bilinear => FilterType::Triangle,
        }
    }
}

/// The editor core: base image, layer stack, history, render scheduling and the GIF frame stack.
///
/// Every mutation follows the same sequence: apply, commit a snapshot (unless
/// [`EditOptions::snapshot`] is off), schedule a render, then notify subscribers. A mutation that
/// returns an error has changed nothing.
///
/// Rendering is cooperative. Callers drive it with [`pump`](Self::pump) from their event loop, or
/// settle it with [`flush`](Self::flush).
#[derive(Debug)]
pub struct ImageEditor {
    config: EditorConfig,
    base: Option<Arc<Raster>>,
    original: Option<Arc<Raster>>,
    canvas: (u32, u32),
    layers: LayerManager,
    meta: ImageMeta,
    history: HistoryManager<Snapshot>,
    scheduler: RenderScheduler,
    events: EventBus,
    gif: GifFrameStack,
}

impl Default for ImageEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageEditor {
    pub fn new() -> Self {
        Self::build(EditorConfig::default(), Arc::new(EffectRegistry::builtin()))
    }

    pub fn with_config(config: EditorConfig) -> LayerforgeResult<Self> {
        Self::with_registry(config, Arc::new(EffectRegistry::builtin()))
    }

    pub fn with_registry(
        config: EditorConfig,
        registry: Arc<EffectRegistry>,
    ) -> LayerforgeResult<Self> {
        config.validate()?;
        Ok(Self::build(config, registry))
    }

    fn build(config: EditorConfig, registry: Arc<EffectRegistry>) -> Self {
        let scheduler = RenderScheduler::new(SchedulerConfig::from(&config), registry);
        Self {
            base: None,
            original: None,
            canvas: (0, 0),
            layers: LayerManager::new(),
            meta: ImageMeta::default(),
            history: HistoryManager::new(config.history_limit),
            scheduler,
            events: EventBus::default(),
            gif: GifFrameStack::with_min_delay(config.gif_min_delay_ms),
            config,
        }
    }

    pub fn subscribe<F>(&mut self, f: F) -> SubscriptionId
    where
        F: FnMut(&StateChanged) + Send + 'static,
    {
        self.events.subscribe(f)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Replace both the working base and the original with `src`.
    pub fn load_image(&mut self, src: ImageSource) -> LayerforgeResult<()> {
        let (raster, mime) = src.decode()?;
        tracing::info!(
            width = raster.width(),
            height = raster.height(),
            mime = mime.as_deref().unwrap_or("raw"),
            "image loaded"
        );
        if let Some(mime) = mime {
            if let Some(ext) = source::extension_for_mime(&mime) {
                self.meta.extension = ext.to_owned();
            }
            self.meta.mime = mime;
        }
        let raster = Arc::new(raster);
        self.original = Some(Arc::clone(&raster));
        self.set_base(raster);
        self.finish("Initial load", EditOptions::COMMIT, true);
        Ok(())
    }

    /// Put the original source back as the base.
    pub fn reset_image(&mut self) -> LayerforgeResult<()> {
        let original = self
            .original
            .clone()
            .ok_or_else(|| LayerforgeError::invalid_input("no image loaded"))?;
        self.set_base(original);
        self.finish("Reset image", EditOptions::COMMIT, true);
        Ok(())
    }

    pub fn set_name(&mut self, name: &str) -> LayerforgeResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LayerforgeError::invalid_input("image name must be non-empty"));
        }
        self.meta.name = name.to_owned();
        self.finish("Rename image", EditOptions::COMMIT, false);
        Ok(())
    }

    /// Change the file extension; the mime type follows when the extension is a known format.
    pub fn set_extension(&mut self, extension: &str) -> LayerforgeResult<()> {
        let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(LayerforgeError::invalid_input(format!(
                "invalid extension '{extension}'"
            )));
        }
        if let Some(mime) = source::mime_for_extension(&ext) {
            self.meta.mime = mime.to_owned();
        }
        self.meta.extension = ext;
        self.finish("Change extension", EditOptions::COMMIT, false);
        Ok(())
    }

    /// Switch the export format by mime type, updating the extension to match.
    pub fn change_file_type(&mut self, mime: &str) -> LayerforgeResult<()> {
        let format = source::format_for_mime(mime).ok_or_else(|| {
            LayerforgeError::invalid_input(format!("unsupported file type '{mime}'"))
        })?;
        let (Some(mime), Some(ext)) = (
            source::mime_for_format(format),
            source::extension_for_mime(mime),
        ) else {
            return Err(LayerforgeError::invalid_input(format!(
                "unsupported file type '{mime}'"
            )));
        };
        self.meta.mime = mime.to_owned();
        self.meta.extension = ext.to_owned();
        self.finish("Change file type", EditOptions::COMMIT, false);
        Ok(())
    }

    /// Resample the base. With `maintain_aspect`, `height` is derived from `width`.
    pub fn resize_canvas(
        &mut self,
        width: u32,
        height: u32,
        maintain_aspect: bool,
        mode: ResizeMode,
    ) -> LayerforgeResult<()> {
        let base = self.require_base()?;
        let (w, h) = base.dimensions();
        let height = if maintain_aspect && w > 0 {
            let scaled = (u64::from(width) * u64::from(h) + u64::from(w) / 2) / u64::from(w);
            u32::try_from(scaled.max(1))
                .map_err(|_| LayerforgeError::invalid_input("resize target too large"))?
        } else {
            height
        };
        let resized = base.scale_with(width, height, mode.filter())?;
        self.set_base(Arc::new(resized));
        self.finish("Resize canvas", EditOptions::COMMIT, true);
        Ok(())
    }

    /// Keep the rectangle spanned by two corners, in either order; the far edges are exclusive.
    pub fn crop(&mut self, y0: u32, x0: u32, y1: u32, x1: u32) -> LayerforgeResult<()> {
        let base = self.require_base()?;
        let rect = PixelRect::new(x0.min(x1), y0.min(y1), x0.abs_diff(x1), y0.abs_diff(y1));
        let cropped = base.crop(rect)?;
        self.set_base(Arc::new(cropped));
        self.finish("Crop", EditOptions::COMMIT, true);
        Ok(())
    }

    /// Rotate clockwise by `degrees`.
    pub fn rotate(&mut self, degrees: f32) -> LayerforgeResult<()> {
        if !degrees.is_finite() {
            return Err(LayerforgeError::invalid_input("rotation must be finite"));
        }
        let base = self.require_base()?;
        let rotated = base.rotate(degrees);
        self.set_base(Arc::new(rotated));
        self.finish(&format!("Rotate {degrees}°"), EditOptions::COMMIT, true);
        Ok(())
    }

    /// Append an empty layer and select it. Returns its index.
    pub fn add_layer(&mut self, name: Option<&str>, opts: EditOptions) -> usize {
        let name = self.layers.add_layer(name).name().to_owned();
        self.finish(&format!("Add layer: {name}"), opts, true);
        self.layers.len() - 1
    }

    /// Append a layer already bound to `effect_id`, with `params` overriding schema defaults.
    ///
    /// Records a single history entry for the whole operation.
    pub fn add_effect_layer(
        &mut self,
        name: Option<&str>,
        effect_id: &str,
        params: Option<&ParamValues>,
        opts: EditOptions,
    ) -> LayerforgeResult<usize> {
        let mut schema = self.effect_schema(effect_id)?;
        if let Some(params) = params {
            schema.update_values(params);
        }
        let mut layers = self.layers.clone();
        let name = layers.add_layer(name).name().to_owned();
        let index = layers.len() - 1;
        layers.add_layer_effect(index, effect_id, schema, None)?;
        self.layers = layers;
        self.finish(&format!("Add layer: {name}"), opts, true);
        Ok(index)
    }

    pub fn delete_layer(&mut self, index: usize, opts: EditOptions) -> LayerforgeResult<()> {
        let removed = self.layers.delete_layer(index)?;
        self.finish(&format!("Delete layer: {}", removed.name()), opts, true);
        Ok(())
    }

    /// Returns the new visibility.
    pub fn toggle_visibility(&mut self, index: usize, opts: EditOptions) -> LayerforgeResult<bool> {
        let visible = self.layers.toggle_visibility(index)?;
        let name = self.layer_name(index)?;
        self.finish(&format!("Toggle visibility: {name}"), opts, true);
        Ok(visible)
    }

    /// Returns the stored opacity after clamping.
    pub fn set_opacity(
        &mut self,
        index: usize,
        opacity: f32,
        opts: EditOptions,
    ) -> LayerforgeResult<f32> {
        let stored = self.layers.set_opacity(index, opacity)?;
        let name = self.layer_name(index)?;
        self.finish(&format!("Change opacity: {name}"), opts, true);
        Ok(stored)
    }

    /// Returns the names of parameters whose value changed.
    pub fn update_layer_effect_parameters(
        &mut self,
        index: usize,
        partial: &ParamValues,
        opts: EditOptions,
    ) -> LayerforgeResult<Vec<String>> {
        let changed = self.layers.update_layer_parameters(index, partial)?;
        let name = self.layer_name(index)?;
        self.finish(&format!("Update parameters: {name}"), opts, true);
        Ok(changed)
    }

    /// Bind `effect_id` with its default parameters, or clear the effect with `None`.
    pub fn set_layer_effect(
        &mut self,
        index: usize,
        effect_id: Option<&str>,
        opts: EditOptions,
    ) -> LayerforgeResult<()> {
        let name = self.layer_name(index)?;
        let reason = match effect_id {
            Some(id) => {
                let schema = self.effect_schema(id)?;
                self.layers.add_layer_effect(index, id, schema, None)?;
                format!("Set effect: {name}")
            }
            None => {
                self.layers.clear_layer_effect(index)?;
                format!("Clear effect: {name}")
            }
        };
        self.finish(&reason, opts, true);
        Ok(())
    }

    pub fn rename_layer(
        &mut self,
        index: usize,
        name: &str,
        opts: EditOptions,
    ) -> LayerforgeResult<()> {
        let old = self.layer_name(index)?;
        self.layers.rename_layer(index, name)?;
        self.finish(&format!("Rename layer: {old}"), opts, false);
        Ok(())
    }

    /// Returns the layer's new index.
    pub fn move_layer_up(&mut self, index: usize, opts: EditOptions) -> LayerforgeResult<usize> {
        let to = self.layers.move_layer_up(index)?;
        let name = self.layer_name(to)?;
        self.finish(&format!("Move layer up: {name}"), opts, true);
        Ok(to)
    }

    /// Returns the layer's new index.
    pub fn move_layer_down(&mut self, index: usize, opts: EditOptions) -> LayerforgeResult<usize> {
        let to = self.layers.move_layer_down(index)?;
        let name = self.layer_name(to)?;
        self.finish(&format!("Move layer down: {name}"), opts, true);
        Ok(to)
    }

    /// Selection is not recorded in history on its own.
    pub fn select_layer(&mut self, index: Option<usize>) -> LayerforgeResult<()> {
        self.layers.set_selected(index)?;
        self.emit("Select layer");
        Ok(())
    }

    pub fn undo(&mut self) -> LayerforgeResult<()> {
        let snapshot = self
            .history
            .undo()
            .map(|e| e.state.clone())
            .ok_or_else(|| LayerforgeError::invalid_input("nothing to undo"))?;
        self.restore(snapshot);
        self.emit("Undo");
        Ok(())
    }

    pub fn redo(&mut self) -> LayerforgeResult<()> {
        let snapshot = self
            .history
            .redo()
            .map(|e| e.state.clone())
            .ok_or_else(|| LayerforgeError::invalid_input("nothing to redo"))?;
        self.restore(snapshot);
        self.emit("Redo");
        Ok(())
    }

    /// The most recent preview or full-quality composite.
    pub fn display(&self) -> Option<&Raster> {
        self.scheduler.display()
    }

    pub fn base(&self) -> Option<&Raster> {
        self.base.as_deref()
    }

    pub fn layers(&self) -> &[Layer] {
        self.layers.layers()
    }

    pub fn layer_manager(&self) -> &LayerManager {
        &self.layers
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.layers.selected_index()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_rendering(&self) -> bool {
        self.scheduler.is_rendering()
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas
    }

    pub fn meta(&self) -> &ImageMeta {
        &self.meta
    }

    pub fn history_labels(&self) -> Vec<&str> {
        self.history.labels()
    }

    pub fn history_cursor(&self) -> Option<usize> {
        self.history.cursor()
    }

    pub fn render_stats(&self) -> RenderStats {
        self.scheduler.stats()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<EffectRegistry> {
        self.scheduler.registry()
    }

    /// Run scheduler ticks that are due and collect worker results. Returns whether the display
    /// changed.
    pub fn pump(&mut self) -> bool {
        self.pump_at(Instant::now())
    }

    pub fn pump_at(&mut self, now: Instant) -> bool {
        let changed = self.scheduler.pump(now);
        self.settle(changed);
        changed
    }

    /// Block until the display holds the full-quality render of the current state.
    pub fn flush(&mut self) -> bool {
        let changed = self.scheduler.flush();
        self.settle(changed);
        changed
    }

    /// Compose the current state at full quality on the calling thread.
    pub fn render_now(&mut self) -> LayerforgeResult<Raster> {
        let request = self.render_request();
        self.scheduler
            .render_sync(request)?
            .cloned()
            .ok_or_else(|| LayerforgeError::invalid_input("no image loaded"))
    }

    /// Encode the settled display in `format`.
    pub fn export_display(&mut self, format: image::ImageFormat) -> LayerforgeResult<Vec<u8>> {
        self.flush();
        let display = self
            .display()
            .ok_or_else(|| LayerforgeError::invalid_input("nothing to export"))?;
        let img = image::DynamicImage::ImageRgba8(display.to_rgba_image());
        // JPEG has no alpha channel.
        let img = match format {
            image::ImageFormat::Jpeg => image::DynamicImage::ImageRgb8(img.to_rgb8()),
            _ => img,
        };
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, format).map_err(|e| {
            LayerforgeError::Other(anyhow::Error::new(e).context(format!("encode {format:?}")))
        })?;
        Ok(out.into_inner())
    }

    /// Encode the display in the format named by [`meta`](Self::meta).
    pub fn export(&mut self) -> LayerforgeResult<Vec<u8>> {
        let format = self.meta.format().ok_or_else(|| {
            LayerforgeError::invalid_input(format!("cannot export as '{}'", self.meta.mime))
        })?;
        self.export_display(format)
    }

    pub fn gif_frames(&self) -> &GifFrameStack {
        &self.gif
    }

    pub fn gif_frames_mut(&mut self) -> &mut GifFrameStack {
        &mut self.gif
    }

    /// Replace the frame stack with the decoded contents of `bytes`. Returns the frame count.
    ///
    /// On error the current stack is kept.
    pub fn import_gif(&mut self, bytes: &[u8]) -> LayerforgeResult<usize> {
        let min_delay = self.config.gif_min_delay_ms;
        let decoded = decode_with_min_delay(bytes, min_delay)?;
        self.gif = GifFrameStack::from_decoded_with_min_delay(decoded, min_delay);
        Ok(self.gif.len())
    }

    /// Encode the frame stack; `quality` defaults to the configured value.
    pub fn export_gif(&self, quality: Option<u32>) -> LayerforgeResult<Vec<u8>> {
        let quality = quality.unwrap_or(self.config.gif_default_quality);
        if !(1..=30).contains(&quality) {
            return Err(LayerforgeError::invalid_input("quality must be in [1, 30]"));
        }
        self.gif.encode(&EncodeOptions {
            quality,
            workers: self.config.gif_workers,
            repeat: true,
        })
    }

    /// Load frame `index` into the editor as the image to work on.
    pub fn open_gif_frame(&mut self, index: usize) -> LayerforgeResult<()> {
        let pixels = self
            .gif
            .get_frame(index)
            .map(|f| f.pixels.clone())
            .ok_or_else(|| {
                LayerforgeError::invalid_input(format!("frame index {index} out of range"))
            })?;
        self.gif.set_current(index)?;
        self.load_image(ImageSource::Raster(pixels))
    }

    /// Write the full-quality composite back into frame `index`.
    pub fn store_gif_frame(&mut self, index: usize) -> LayerforgeResult<()> {
        let pixels = self.render_now()?;
        self.gif.set_frame(index, pixels)
    }

    /// Append the full-quality composite as a new frame. Returns its index.
    pub fn append_gif_frame(&mut self, delay_ms: u32) -> LayerforgeResult<usize> {
        let pixels = self.render_now()?;
        self.gif.add_frame(pixels, delay_ms)
    }

    /// Sweep a layer parameter into an animated GIF. The editor's state is unchanged afterwards.
    pub fn generate_animation<P>(
        &mut self,
        spec: &AnimationSpec,
        progress: P,
    ) -> LayerforgeResult<Vec<u8>>
    where
        P: FnMut(f32),
    {
        let result = generator::generate(self, spec, progress);
        self.schedule_render(true);
        result
    }

    fn require_base(&self) -> LayerforgeResult<Arc<Raster>> {
        self.base
            .clone()
            .ok_or_else(|| LayerforgeError::invalid_input("no image loaded"))
    }

    fn set_base(&mut self, base: Arc<Raster>) {
        self.canvas = base.dimensions();
        self.base = Some(base);
        self.scheduler.invalidate_base();
    }

    fn layer_name(&self, index: usize) -> LayerforgeResult<String> {
        self.layers
            .get(index)
            .map(|l| l.name().to_owned())
            .ok_or_else(|| LayerforgeError::invalid_input(format!("layer index {index} out of range")))
    }

    fn effect_schema(&self, effect_id: &str) -> LayerforgeResult<crate::layers::Params> {
        self.registry()
            .schema(effect_id)
            .ok_or_else(|| LayerforgeError::invalid_input(format!("unknown effect '{effect_id}'")))
    }

    fn render_request(&self) -> RenderRequest {
        RenderRequest::new(self.base.clone(), self.layers.render_payload())
    }

    fn schedule_render(&mut self, immediate: bool) {
        let request = self.render_request();
        self.scheduler.request_render(Instant::now(), request, immediate);
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            base: self.base.clone(),
            original: self.original.clone(),
            canvas_width: self.canvas.0,
            canvas_height: self.canvas.1,
            layers: self.layers.clone(),
            meta: self.meta.clone(),
        }
    }

    fn finish(&mut self, reason: &str, opts: EditOptions, render: bool) {
        if opts.snapshot {
            let snapshot = self.snapshot();
            self.history.push(reason, snapshot);
        }
        if render {
            self.schedule_render(!opts.defer_render);
        }
        self.emit(reason);
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.history.set_restoring(true);
        if snapshot.base_differs(self.base.as_ref()) {
            self.scheduler.invalidate_base();
        }
        self.base = snapshot.base;
        self.original = snapshot.original;
        self.canvas = (snapshot.canvas_width, snapshot.canvas_height);
        self.layers = snapshot.layers;
        self.meta = snapshot.meta;
        self.schedule_render(true);
        self.history.set_restoring(false);
    }

    /// Tell subscribers about scheduler work that finished outside a mutation.
    fn settle(&mut self, changed: bool) {
        if !changed && !self.scheduler.render_failed() {
            return;
        }
        if self.scheduler.is_rendering() {
            self.emit("Render preview");
        } else {
            self.emit("Render complete");
        }
    }

    fn emit(&mut self, reason: &str) {
        let event = StateChanged {
            reason: reason.to_owned(),
            undo_available: self.history.can_undo(),
            redo_available: self.history.can_redo(),
            is_rendering: self.scheduler.is_rendering(),
            render_failed: self.scheduler.take_render_failed(),
        };
        self.events.emit(&event);
    }
}

impl AnimationTarget for ImageEditor {
    fn parameter(&self, layer_index: usize, parameter: &str) -> LayerforgeResult<f64> {
        self.layers
            .get(layer_index)
            .and_then(|l| l.parameters().value(parameter))
            .and_then(ParamValue::as_number)
            .ok_or_else(|| {
                LayerforgeError::invalid_input(format!(
                    "layer {layer_index} has no numeric parameter '{parameter}'"
                ))
            })
    }

    fn set_parameter(
        &mut self,
        layer_index: usize,
        parameter: &str,
        value: f64,
    ) -> LayerforgeResult<()> {
        let partial = ParamValues::new().with(parameter, ParamValue::Number(value));
        self.layers.update_layer_parameters(layer_index, &partial)?;
        Ok(())
    }

    fn render_full(&mut self) -> LayerforgeResult<Raster> {
        self.render_now()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/facade.rs"]
mod tests;
