//! GIF decode/encode and the editable frame stack.
//!
//! Block parsing, LZW and deinterlacing come from the `gif` crate. This module owns signature
//! validation, disposal composition onto full-canvas frames, delay normalization, per-frame palette
//! construction and the black transparency key.

pub mod assemble;
pub mod decode;
pub mod encode;
pub mod estimate;
pub mod frames;

pub use assemble::{NamedImage, assemble};
pub use decode::{DecodedFrame, DecodedGif, decode};
pub use encode::{EncodeOptions, encode};
pub use estimate::estimate_size;
pub use frames::{GifFrame, GifFrameStack};
