use crate::animation::ease::Ease;
use crate::foundation::error::{LayerforgeError, LayerforgeResult};
use crate::foundation::raster::Raster;
use crate::gif::encode::EncodeOptions;
use crate::gif::frames::GifFrameStack;

/// What a parameter sweep drives: something that can set one numeric layer parameter and produce
/// a full-quality render of the result.
pub trait AnimationTarget {
    /// Current numeric value of `parameter` on layer `layer_index`.
    fn parameter(&self, layer_index: usize, parameter: &str) -> LayerforgeResult<f64>;

    /// Set `parameter` without recording history.
    fn set_parameter(
        &mut self,
        layer_index: usize,
        parameter: &str,
        value: f64,
    ) -> LayerforgeResult<()>;

    /// Compose the current state at native resolution, synchronously.
    fn render_full(&mut self) -> LayerforgeResult<Raster>;
}

/// A parameter sweep rendered into an animated GIF.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationSpec {
    pub layer_index: usize,
    pub parameter: String,
    pub start: f64,
    pub end: f64,
    pub frame_count: usize,
    pub easing: Ease,
    pub ping_pong: bool,
    /// Output size relative to the canvas, in `(0, 1]`.
    pub scale: f32,
    pub quality: u32,
    pub delay_ms: u32,
    pub workers: usize,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            layer_index: 0,
            parameter: String::new(),
            start: 0.0,
            end: 1.0,
            frame_count: 10,
            easing: Ease::Linear,
            ping_pong: false,
            scale: 1.0,
            quality: 10,
            delay_ms: 100,
            workers: 2,
        }
    }
}

impl AnimationSpec {
    pub fn validate(&self) -> LayerforgeResult<()> {
        if self.parameter.is_empty() {
            return Err(LayerforgeError::invalid_input("animation parameter is empty"));
        }
        if self.frame_count == 0 {
            return Err(LayerforgeError::invalid_input("frame_count must be >= 1"));
        }
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(LayerforgeError::invalid_input("sweep bounds must be finite"));
        }
        if !(self.scale.is_finite() && self.scale > 0.0 && self.scale <= 1.0) {
            return Err(LayerforgeError::invalid_input("scale must be in (0, 1]"));
        }
        if !(1..=30).contains(&self.quality) {
            return Err(LayerforgeError::invalid_input("quality must be in [1, 30]"));
        }
        Ok(())
    }

    /// Parameter value for every output frame.
    ///
    /// `t = i / (n - 1)` (0 for a single frame) eased and mapped onto `start..end`. Ping-pong
    /// appends the reversed sweep without repeating either endpoint.
    pub fn values(&self) -> Vec<f64> {
        let n = self.frame_count;
        let mut values: Vec<f64> = (0..n)
            .map(|i| {
                let t = if n > 1 {
                    i as f64 / (n - 1) as f64
                } else {
                    0.0
                };
                let e = self.easing.apply(t);
                self.start + (self.end - self.start) * e
            })
            .collect();
        if self.ping_pong && n > 2 {
            let back: Vec<f64> = values[1..n - 1].iter().rev().copied().collect();
            values.extend(back);
        }
        values
    }
}

/// Render the sweep described by `spec` on `target` and encode it.
///
/// `progress` receives percentages: 0 to 50 while frames are captured, 50 to 100 for encoding.
/// The swept parameter is restored afterwards, including when capture or encoding fails.
#[tracing::instrument(level = "info", skip(target, progress), fields(parameter = %spec.parameter))]
pub fn generate<T, P>(target: &mut T, spec: &AnimationSpec, mut progress: P) -> LayerforgeResult<Vec<u8>>
where
    T: AnimationTarget + ?Sized,
    P: FnMut(f32),
{
    spec.validate()?;
    let original = target.parameter(spec.layer_index, &spec.parameter)?;

    let captured = capture(target, spec, &mut progress);
    let restored = target.set_parameter(spec.layer_index, &spec.parameter, original);
    let stack = captured?;
    restored?;

    progress(50.0);
    let bytes = stack.encode(&EncodeOptions {
        quality: spec.quality,
        workers: spec.workers.max(1),
        repeat: true,
    })?;
    progress(100.0);
    tracing::info!(frames = stack.len(), bytes = bytes.len(), "animation encoded");
    Ok(bytes)
}

fn capture<T, P>(target: &mut T, spec: &AnimationSpec, progress: &mut P) -> LayerforgeResult<GifFrameStack>
where
    T: AnimationTarget + ?Sized,
    P: FnMut(f32),
{
    let values = spec.values();
    let total = values.len();
    let mut stack = GifFrameStack::new();
    progress(0.0);
    for (i, value) in values.into_iter().enumerate() {
        target.set_parameter(spec.layer_index, &spec.parameter, value)?;
        let full = target.render_full()?;
        let frame = if spec.scale < 1.0 {
            let (w, h) = full.dimensions();
            let sw = ((w as f32 * spec.scale).round() as u32).max(1);
            let sh = ((h as f32 * spec.scale).round() as u32).max(1);
            full.scale_to(sw, sh)?
        } else {
            full
        };
        stack.add_frame(frame, spec.delay_ms)?;
        progress(50.0 * (i + 1) as f32 / total as f32);
    }
    Ok(stack)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/generator.rs"]
mod tests;
