/// Fixed overhead for header, logical screen and trailer.
const HEADER_OVERHEAD: u64 = 1000;
/// Assumed LZW compression ratio over one byte per pixel.
const COMPRESSION_RATIO: u64 = 2;
/// Graphic control extension, image descriptor and local palette per frame.
const PER_FRAME_OVERHEAD: u64 = 800;

/// Coarse predicted size of an encoded GIF, in bytes.
pub fn estimate_size(width: u32, height: u32, frames: usize) -> u64 {
    let pixels = u64::from(width) * u64::from(height);
    HEADER_OVERHEAD + frames as u64 * (pixels / COMPRESSION_RATIO + PER_FRAME_OVERHEAD)
}

#[cfg(test)]
#[path = "../../tests/unit/gif/estimate.rs"]
mod tests;
