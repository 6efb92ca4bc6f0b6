use std::io;

use crate::foundation::error::CodecError;
use crate::foundation::raster::{PixelRect, Raster};

/// Shortest delay a decoded frame may carry, in milliseconds.
pub const MIN_FRAME_DELAY_MS: u32 = 20;

/// Signature plus logical screen descriptor.
const HEADER_LEN: usize = 13;

#[derive(Clone, Debug, PartialEq)]
pub struct DecodedFrame {
    /// Full-canvas RGBA after applying the frame over whatever earlier frames left behind.
    pub pixels: Raster,
    pub delay_ms: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecodedGif {
    pub width: u32,
    pub height: u32,
    pub frames: Vec<DecodedFrame>,
}

/// Decode a GIF87a/GIF89a stream into full-canvas frames with the default minimum delay.
pub fn decode(bytes: &[u8]) -> Result<DecodedGif, CodecError> {
    decode_with_min_delay(bytes, MIN_FRAME_DELAY_MS)
}

/// Decode with an explicit lower bound on frame delays.
///
/// Disposal is resolved against a running canvas that starts fully transparent: "background"
/// clears the frame rectangle to transparent once the frame has been emitted, and "previous"
/// restores the canvas as it was before the frame was drawn. Transparent palette entries leave the
/// canvas untouched.
#[tracing::instrument(level = "debug", skip(bytes), fields(len = bytes.len()))]
pub fn decode_with_min_delay(bytes: &[u8], min_delay_ms: u32) -> Result<DecodedGif, CodecError> {
    check_header(bytes)?;

    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options.read_info(bytes).map_err(map_decoding_error)?;

    let width = u32::from(decoder.width());
    let height = u32::from(decoder.height());
    if width == 0 || height == 0 {
        return Err(CodecError::invalid_format(format!(
            "logical screen is empty ({width}x{height})"
        )));
    }

    let mut canvas = Raster::new(width, height);
    let mut frames = Vec::new();
    while let Some(frame) = decoder.read_next_frame().map_err(map_decoding_error)? {
        let rect = PixelRect::new(
            u32::from(frame.left),
            u32::from(frame.top),
            u32::from(frame.width),
            u32::from(frame.height),
        );
        let saved = (frame.dispose == gif::DisposalMethod::Previous).then(|| canvas.clone());

        paint_frame(&mut canvas, rect, &frame.buffer);
        frames.push(DecodedFrame {
            pixels: canvas.clone(),
            delay_ms: (u32::from(frame.delay) * 10).max(min_delay_ms),
        });

        match frame.dispose {
            gif::DisposalMethod::Background => clear_rect(&mut canvas, rect),
            gif::DisposalMethod::Previous => {
                if let Some(saved) = saved {
                    canvas = saved;
                }
            }
            gif::DisposalMethod::Any | gif::DisposalMethod::Keep => {}
        }
    }

    if frames.is_empty() {
        return Err(CodecError::invalid_format("stream contains no frames"));
    }
    tracing::debug!(width, height, frames = frames.len(), "decoded gif");
    Ok(DecodedGif {
        width,
        height,
        frames,
    })
}

/// Validate the signature and make sure the fixed-size preamble (and global colour table, when
/// flagged) is present.
fn check_header(bytes: &[u8]) -> Result<(), CodecError> {
    let sig_len = bytes.len().min(6);
    let prefix = &bytes[..sig_len];
    if sig_len == 0 || (prefix != &b"GIF89a"[..sig_len] && prefix != &b"GIF87a"[..sig_len]) {
        return Err(CodecError::invalid_format("missing GIF87a/GIF89a signature"));
    }
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::Truncated);
    }
    let packed = bytes[10];
    if packed & 0x80 != 0 {
        let table_len = 3 * (1usize << ((packed & 0x07) + 1));
        if bytes.len() < HEADER_LEN + table_len {
            return Err(CodecError::Truncated);
        }
    }
    Ok(())
}

fn map_decoding_error(err: gif::DecodingError) -> CodecError {
    match err {
        gif::DecodingError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            CodecError::Truncated
        }
        other => {
            let msg = other.to_string();
            let lower = msg.to_ascii_lowercase();
            if lower.contains("eof") || lower.contains("truncated") {
                CodecError::Truncated
            } else {
                CodecError::invalid_format(msg)
            }
        }
    }
}

/// Draw an RGBA frame buffer at `rect`, skipping transparent pixels and clipping to the canvas.
fn paint_frame(canvas: &mut Raster, rect: PixelRect, buffer: &[u8]) {
    let (cw, ch) = canvas.dimensions();
    for fy in 0..rect.height {
        let cy = rect.y + fy;
        if cy >= ch {
            break;
        }
        for fx in 0..rect.width {
            let cx = rect.x + fx;
            if cx >= cw {
                break;
            }
            let i = ((fy * rect.width + fx) * 4) as usize;
            let Some(px) = buffer.get(i..i + 4) else {
                return;
            };
            if px[3] > 0 {
                canvas.set_pixel(cx, cy, [px[0], px[1], px[2], px[3]]);
            }
        }
    }
}

fn clear_rect(canvas: &mut Raster, rect: PixelRect) {
    let (cw, ch) = canvas.dimensions();
    for y in rect.y..(rect.y + rect.height).min(ch) {
        for x in rect.x..(rect.x + rect.width).min(cw) {
            canvas.set_pixel(x, y, [0, 0, 0, 0]);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gif/decode.rs"]
mod tests;
