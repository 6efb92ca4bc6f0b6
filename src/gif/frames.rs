use crate::foundation::error::{LayerforgeError, LayerforgeResult};
use crate::foundation::raster::Raster;
use crate::gif::decode::{DecodedGif, MIN_FRAME_DELAY_MS};
use crate::gif::encode::{EncodeOptions, encode};
use crate::gif::estimate::estimate_size;

#[derive(Clone, Debug, PartialEq)]
pub struct GifFrame {
    pub pixels: Raster,
    pub delay_ms: u32,
}

/// Ordered frames of an animated GIF under edit.
///
/// The first frame fixes the stack dimensions; every later frame must match them. Delays are
/// raised to the stack's minimum on the way in. `current_index` is always a valid index, or 0 when
/// the stack is empty.
#[derive(Clone, Debug, PartialEq)]
pub struct GifFrameStack {
    frames: Vec<GifFrame>,
    current: usize,
    width: u32,
    height: u32,
    min_delay_ms: u32,
}

impl Default for GifFrameStack {
    fn default() -> Self {
        Self::new()
    }
}

impl GifFrameStack {
    pub fn new() -> Self {
        Self::with_min_delay(MIN_FRAME_DELAY_MS)
    }

    pub fn with_min_delay(min_delay_ms: u32) -> Self {
        Self {
            frames: Vec::new(),
            current: 0,
            width: 0,
            height: 0,
            min_delay_ms,
        }
    }

    pub fn from_decoded(decoded: DecodedGif) -> Self {
        Self::from_decoded_with_min_delay(decoded, MIN_FRAME_DELAY_MS)
    }

    pub fn from_decoded_with_min_delay(decoded: DecodedGif, min_delay_ms: u32) -> Self {
        let mut stack = Self::with_min_delay(min_delay_ms);
        stack.width = decoded.width;
        stack.height = decoded.height;
        stack.frames = decoded
            .frames
            .into_iter()
            .map(|f| GifFrame {
                pixels: f.pixels,
                delay_ms: f.delay_ms.max(min_delay_ms),
            })
            .collect();
        stack
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// `(0, 0)` until the first frame arrives.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn min_delay_ms(&self) -> u32 {
        self.min_delay_ms
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn set_current(&mut self, index: usize) -> LayerforgeResult<()> {
        self.check_index(index)?;
        self.current = index;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &GifFrame> {
        self.frames.iter()
    }

    pub fn frames(&self) -> &[GifFrame] {
        &self.frames
    }

    pub fn get_frame(&self, index: usize) -> Option<&GifFrame> {
        self.frames.get(index)
    }

    /// Append a frame; returns its index.
    pub fn add_frame(&mut self, pixels: Raster, delay_ms: u32) -> LayerforgeResult<usize> {
        if pixels.is_empty() {
            return Err(LayerforgeError::invalid_input("gif frames must be non-empty"));
        }
        if self.frames.is_empty() {
            (self.width, self.height) = pixels.dimensions();
        } else {
            self.check_dimensions(&pixels)?;
        }
        self.frames.push(GifFrame {
            pixels,
            delay_ms: delay_ms.max(self.min_delay_ms),
        });
        Ok(self.frames.len() - 1)
    }

    /// Replace the pixels of frame `index`, keeping its delay.
    pub fn set_frame(&mut self, index: usize, pixels: Raster) -> LayerforgeResult<()> {
        self.check_index(index)?;
        self.check_dimensions(&pixels)?;
        self.frames[index].pixels = pixels;
        Ok(())
    }

    pub fn set_delay(&mut self, index: usize, delay_ms: u32) -> LayerforgeResult<()> {
        self.check_index(index)?;
        self.frames[index].delay_ms = delay_ms.max(self.min_delay_ms);
        Ok(())
    }

    pub fn delete_frame(&mut self, index: usize) -> LayerforgeResult<GifFrame> {
        self.check_index(index)?;
        let removed = self.frames.remove(index);
        if self.frames.is_empty() {
            self.current = 0;
            self.width = 0;
            self.height = 0;
        } else if self.current >= self.frames.len() || self.current > index {
            self.current = self.current.saturating_sub(1);
        }
        Ok(removed)
    }

    /// Insert a copy of frame `index` right after it; returns the copy's index.
    pub fn duplicate_frame(&mut self, index: usize) -> LayerforgeResult<usize> {
        self.check_index(index)?;
        let copy = self.frames[index].clone();
        self.frames.insert(index + 1, copy);
        if self.current > index {
            self.current += 1;
        }
        Ok(index + 1)
    }

    /// Move frame `from` so it ends up at index `to`. The current frame follows its content.
    pub fn move_frame(&mut self, from: usize, to: usize) -> LayerforgeResult<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let frame = self.frames.remove(from);
        self.frames.insert(to, frame);
        self.current = if self.current == from {
            to
        } else if from < self.current && self.current <= to {
            self.current - 1
        } else if to <= self.current && self.current < from {
            self.current + 1
        } else {
            self.current
        };
        Ok(())
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.current = 0;
        self.width = 0;
        self.height = 0;
    }

    pub fn encode(&self, options: &EncodeOptions) -> LayerforgeResult<Vec<u8>> {
        Ok(encode(self.width, self.height, &self.frames, options)?)
    }

    /// Rough output size in bytes, see [`estimate_size`].
    pub fn estimated_size(&self) -> u64 {
        estimate_size(self.width, self.height, self.frames.len())
    }

    fn check_index(&self, index: usize) -> LayerforgeResult<()> {
        if index >= self.frames.len() {
            return Err(LayerforgeError::invalid_input(format!(
                "frame index {index} out of range (len {})",
                self.frames.len()
            )));
        }
        Ok(())
    }

    fn check_dimensions(&self, pixels: &Raster) -> LayerforgeResult<()> {
        if pixels.dimensions() != (self.width, self.height) {
            let (w, h) = pixels.dimensions();
            return Err(LayerforgeError::invalid_input(format!(
                "frame is {w}x{h}, stack is {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gif/frames.rs"]
mod tests;
