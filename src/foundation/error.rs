/// Crate-wide result alias.
pub type LayerforgeResult<T> = Result<T, LayerforgeError>;

/// Errors surfaced by the editor core.
///
/// Every fallible operation leaves editor state unchanged when it returns one of these.
#[derive(thiserror::Error, Debug)]
pub enum LayerforgeError {
    /// Out-of-range dimensions, unknown layer indices, bad parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Image bytes could not be decoded into a raster.
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// GIF parsing or encoding failure.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Composition failed (effect panic, worker fault).
    #[error("render failed: {0}")]
    RenderFailed(String),

    /// Configuration rejected by validation or parsing.
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayerforgeError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn decode_failed(msg: impl Into<String>) -> Self {
        Self::DecodeFailed(msg.into())
    }

    pub fn render_failed(msg: impl Into<String>) -> Self {
        Self::RenderFailed(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// GIF codec failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Bad signature, malformed block structure or unsupported content.
    #[error("invalid gif format: {0}")]
    InvalidFormat(String),

    /// The stream ended before the trailer.
    #[error("truncated gif stream")]
    Truncated,

    /// The encoder rejected the frame stack.
    #[error("gif encode error: {0}")]
    Encode(String),
}

impl CodecError {
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
