use std::path::Path;
use std::time::Duration;

use crate::foundation::error::{LayerforgeError, LayerforgeResult};

/// Tunables recognized by the editor core.
///
/// Every field has a default, so a partial JSON document is a valid config.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Downscale factor for the preview tier, in `(0, 1]`.
    pub preview_scale: f32,
    /// Debounce before a deferred render runs its preview pass.
    pub preview_delay_ms: u64,
    /// Quiescence interval between a preview and the full-quality pass.
    pub full_quality_delay_ms: u64,
    /// Maximum number of history entries retained.
    pub history_limit: usize,
    /// Lower bound applied to every GIF frame delay.
    pub gif_min_delay_ms: u32,
    /// NeuQuant sample factor used when a frame needs palette reduction (1 = best, 30 = fastest).
    pub gif_default_quality: u32,
    /// Threads used to quantize frames during GIF encoding.
    pub gif_workers: usize,
    /// Dispatch full-quality composition to a background worker thread.
    pub render_worker: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            preview_scale: 0.25,
            preview_delay_ms: 60,
            full_quality_delay_ms: 150,
            history_limit: 50,
            gif_min_delay_ms: 20,
            gif_default_quality: 10,
            gif_workers: 2,
            render_worker: true,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON document; missing fields fall back to defaults.
    pub fn from_json_str(json: &str) -> LayerforgeResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| LayerforgeError::config(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: &Path) -> LayerforgeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            LayerforgeError::config(format!("read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> LayerforgeResult<()> {
        if !self.preview_scale.is_finite() || self.preview_scale <= 0.0 || self.preview_scale > 1.0
        {
            return Err(LayerforgeError::config(
                "preview_scale must be finite and in (0, 1]",
            ));
        }
        if self.history_limit == 0 {
            return Err(LayerforgeError::config("history_limit must be >= 1"));
        }
        if !(1..=30).contains(&self.gif_default_quality) {
            return Err(LayerforgeError::config(
                "gif_default_quality must be in [1, 30]",
            ));
        }
        if self.gif_workers == 0 {
            return Err(LayerforgeError::config("gif_workers must be >= 1"));
        }
        Ok(())
    }

    pub fn preview_delay(&self) -> Duration {
        Duration::from_millis(self.preview_delay_ms)
    }

    pub fn full_quality_delay(&self) -> Duration {
        Duration::from_millis(self.full_quality_delay_ms)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
