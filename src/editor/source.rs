use crate::foundation::error::{LayerforgeError, LayerforgeResult};
use crate::foundation::raster::Raster;

/// Formats the editor can decode and export, as `(mime, extension, format)`.
const FORMATS: [(&str, &str, image::ImageFormat); 5] = [
    ("image/png", "png", image::ImageFormat::Png),
    ("image/jpeg", "jpg", image::ImageFormat::Jpeg),
    ("image/gif", "gif", image::ImageFormat::Gif),
    ("image/bmp", "bmp", image::ImageFormat::Bmp),
    ("image/webp", "webp", image::ImageFormat::WebP),
];

/// An image handed to [`ImageEditor::load_image`](crate::editor::ImageEditor::load_image).
#[derive(Clone, Debug)]
pub enum ImageSource {
    /// Already-decoded straight RGBA pixels.
    Raster(Raster),
    /// Encoded bytes; `mime` picks the decoder, otherwise the format is sniffed.
    Encoded { bytes: Vec<u8>, mime: Option<String> },
}

impl ImageSource {
    pub fn encoded(bytes: impl Into<Vec<u8>>, mime: Option<&str>) -> Self {
        Self::Encoded {
            bytes: bytes.into(),
            mime: mime.map(str::to_owned),
        }
    }

    /// Decode into a raster plus the mime type it came from, when known.
    pub fn decode(self) -> LayerforgeResult<(Raster, Option<String>)> {
        let (raster, mime) = match self {
            Self::Raster(r) => (r, None),
            Self::Encoded { bytes, mime } => {
                let format = mime.as_deref().and_then(format_for_mime);
                let decoded = match format {
                    Some(f) => image::load_from_memory_with_format(&bytes, f),
                    None => image::load_from_memory(&bytes),
                }
                .map_err(|e| LayerforgeError::decode_failed(e.to_string()))?;
                let mime = mime.or_else(|| {
                    image::guess_format(&bytes)
                        .ok()
                        .and_then(mime_for_format)
                        .map(str::to_owned)
                });
                (Raster::from_rgba_image(decoded.to_rgba8()), mime)
            }
        };
        if raster.is_empty() {
            return Err(LayerforgeError::decode_failed("image has no pixels"));
        }
        Ok((raster, mime))
    }
}

/// File-level metadata of the image under edit.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageMeta {
    pub name: String,
    pub extension: String,
    pub mime: String,
}

impl Default for ImageMeta {
    fn default() -> Self {
        Self {
            name: "untitled".to_owned(),
            extension: "png".to_owned(),
            mime: "image/png".to_owned(),
        }
    }
}

impl ImageMeta {
    /// `name.extension`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.extension)
    }

    pub fn format(&self) -> Option<image::ImageFormat> {
        format_for_mime(&self.mime)
    }
}

pub fn format_for_mime(mime: &str) -> Option<image::ImageFormat> {
    let mime = mime.trim().to_ascii_lowercase();
    let mime = if mime == "image/jpg" { "image/jpeg".to_owned() } else { mime };
    FORMATS.iter().find(|(m, _, _)| *m == mime).map(|(_, _, f)| *f)
}

pub fn mime_for_format(format: image::ImageFormat) -> Option<&'static str> {
    FORMATS.iter().find(|(_, _, f)| *f == format).map(|(m, _, _)| *m)
}

pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let format = format_for_mime(mime)?;
    FORMATS.iter().find(|(_, _, f)| *f == format).map(|(_, e, _)| *e)
}

pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
    let ext = if ext == "jpeg" { "jpg".to_owned() } else { ext };
    FORMATS.iter().find(|(_, e, _)| *e == ext).map(|(m, _, _)| *m)
}

#[cfg(test)]
#[path = "../../tests/unit/editor/source.rs"]
mod tests;
