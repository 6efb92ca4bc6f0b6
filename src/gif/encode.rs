use std::borrow::Cow;
use std::collections::HashMap;

use rayon::prelude::*;

use crate::foundation::error::CodecError;
use crate::gif::frames::GifFrame;

/// Pixels with alpha below this are written as the transparency key.
pub const ALPHA_CUTOFF: u8 = 128;

/// Palette index reserved for the transparency key when any frame has transparent pixels.
const KEY_INDEX: u8 = 0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    /// NeuQuant sample factor, 1 (best) to 30 (fastest). Only used when a frame has more colours
    /// than fit a palette.
    pub quality: u32,
    /// Threads quantizing frames.
    pub workers: usize,
    /// Loop forever instead of playing once.
    pub repeat: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: 10,
            workers: 2,
            repeat: true,
        }
    }
}

struct IndexedFrame {
    palette: Vec<u8>,
    indices: Vec<u8>,
}

/// Encode full-canvas frames of `width x height` into a GIF89a stream.
///
/// Each frame gets its own local palette. When any frame has a pixel with alpha below
/// [`ALPHA_CUTOFF`], every frame is keyed: opaque pure black is nudged to `(1, 1, 1)`, transparent
/// pixels become black, and palette index 0 (black) is declared transparent with background
/// disposal.
#[tracing::instrument(level = "debug", skip(frames), fields(frames = frames.len()))]
pub fn encode(
    width: u32,
    height: u32,
    frames: &[GifFrame],
    options: &EncodeOptions,
) -> Result<Vec<u8>, CodecError> {
    if frames.is_empty() {
        return Err(CodecError::encode("no frames to encode"));
    }
    let (w, h) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(CodecError::encode(format!(
                "canvas {width}x{height} outside GIF limits"
            )));
        }
    };
    if let Some(i) = frames
        .iter()
        .position(|f| f.pixels.dimensions() != (width, height))
    {
        return Err(CodecError::encode(format!(
            "frame {i} is not {width}x{height}"
        )));
    }

    let keyed = frames.iter().any(|f| has_transparency(f.pixels.data()));
    let quality = options.quality.clamp(1, 30) as i32;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers.max(1))
        .build()
        .map_err(|e| CodecError::encode(format!("build quantizer pool: {e}")))?;
    let indexed: Vec<IndexedFrame> = pool.install(|| {
        frames
            .par_iter()
            .map(|f| quantize_frame(f.pixels.data(), keyed, quality))
            .collect()
    });

    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, w, h, &[]).map_err(encoding_error)?;
        if options.repeat {
            encoder
                .set_repeat(gif::Repeat::Infinite)
                .map_err(encoding_error)?;
        }
        for (frame, idx) in frames.iter().zip(indexed) {
            let gif_frame = gif::Frame {
                width: w,
                height: h,
                delay: delay_centiseconds(frame.delay_ms),
                dispose: if keyed {
                    gif::DisposalMethod::Background
                } else {
                    gif::DisposalMethod::Keep
                },
                transparent: keyed.then_some(KEY_INDEX),
                palette: Some(idx.palette),
                buffer: Cow::Owned(idx.indices),
                ..Default::default()
            };
            encoder.write_frame(&gif_frame).map_err(encoding_error)?;
        }
        encoder.into_inner().map_err(encoding_error)?;
    }
    tracing::debug!(bytes = out.len(), keyed, "encoded gif");
    Ok(out)
}

fn encoding_error(err: impl std::fmt::Display) -> CodecError {
    CodecError::encode(err.to_string())
}

fn delay_centiseconds(delay_ms: u32) -> u16 {
    u16::try_from(delay_ms.saturating_add(5) / 10).unwrap_or(u16::MAX)
}

fn has_transparency(rgba: &[u8]) -> bool {
    rgba.chunks_exact(4).any(|p| p[3] < ALPHA_CUTOFF)
}

/// Opaque RGBA copy of `rgba`, with the key pre-pass applied when `keyed`.
fn prepare(rgba: &[u8], keyed: bool) -> Vec<u8> {
    let mut px = rgba.to_vec();
    for p in px.chunks_exact_mut(4) {
        if keyed {
            if p[3] < ALPHA_CUTOFF {
                p[..3].copy_from_slice(&[0, 0, 0]);
            } else if p[..3] == [0, 0, 0] {
                p[..3].copy_from_slice(&[1, 1, 1]);
            }
        }
        p[3] = 255;
    }
    px
}

fn quantize_frame(rgba: &[u8], keyed: bool, quality: i32) -> IndexedFrame {
    let px = prepare(rgba, keyed);
    let is_key = |p: &[u8]| keyed && p[..3] == [0, 0, 0];
    let capacity = if keyed { 255 } else { 256 };

    if let Some(frame) = exact_palette(&px, keyed, capacity) {
        return frame;
    }

    let sample: Vec<u8> = px
        .chunks_exact(4)
        .filter(|p| !is_key(*p))
        .flatten()
        .copied()
        .collect();
    let nq = color_quant::NeuQuant::new(quality, capacity, &sample);
    let offset = usize::from(keyed);
    let mut palette = Vec::with_capacity(3 * (capacity + offset));
    if keyed {
        palette.extend_from_slice(&[0, 0, 0]);
    }
    for c in nq.color_map_rgb().chunks_exact(3) {
        palette.extend_from_slice(c);
    }
    let indices = px
        .chunks_exact(4)
        .map(|p| {
            if is_key(p) {
                KEY_INDEX
            } else {
                (nq.index_of(p) + offset) as u8
            }
        })
        .collect();
    IndexedFrame { palette, indices }
}

/// Lossless palette when the frame has at most `capacity` distinct non-key colours.
fn exact_palette(px: &[u8], keyed: bool, capacity: usize) -> Option<IndexedFrame> {
    let mut lookup: HashMap<[u8; 3], u8> = HashMap::new();
    let mut palette = Vec::new();
    if keyed {
        lookup.insert([0, 0, 0], KEY_INDEX);
        palette.extend_from_slice(&[0, 0, 0]);
    }
    let limit = capacity + usize::from(keyed);
    let mut indices = Vec::with_capacity(px.len() / 4);
    for p in px.chunks_exact(4) {
        let rgb = [p[0], p[1], p[2]];
        let index = match lookup.get(&rgb) {
            Some(&i) => i,
            None => {
                if lookup.len() >= limit {
                    return None;
                }
                let i = lookup.len() as u8;
                lookup.insert(rgb, i);
                palette.extend_from_slice(&rgb);
                i
            }
        };
        indices.push(index);
    }
    Some(IndexedFrame { palette, indices })
}

#[cfg(test)]
#[path = "../../tests/unit/gif/encode.rs"]
mod tests;
