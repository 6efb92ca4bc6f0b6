use image::imageops::FilterType;

use crate::foundation::error::{LayerforgeError, LayerforgeResult};

/// Straight-alpha RGBA8 pixel buffer, tightly packed and row-major.
///
/// Invariant: `data.len() == 4 * width * height`. The fields are private so the invariant can
/// only be established by the constructors.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Axis-aligned pixel rectangle (`x`/`y` inclusive, `width`/`height` in pixels).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Plain-data form of a [`Raster`] used as a message body between threads.
///
/// Converting back and forth moves the byte vector; nothing is copied.
#[derive(Debug)]
pub struct TransferRaster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl TransferRaster {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn into_raster(self) -> Raster {
        Raster {
            width: self.width,
            height: self.height,
            data: self.data,
        }
    }
}

fn byte_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
}

impl Raster {
    /// Allocate a transparent-black raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    /// Allocate a raster with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let len = byte_len(width, height).unwrap_or_else(|| {
            panic!("raster dimensions overflow: {width}x{height}");
        });
        let mut data = Vec::with_capacity(len);
        for _ in 0..(len / 4) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap existing RGBA8 bytes, validating the length.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> LayerforgeResult<Self> {
        let expected = byte_len(width, height)
            .ok_or_else(|| LayerforgeError::invalid_input("raster dimensions overflow"))?;
        if data.len() != expected {
            return Err(LayerforgeError::invalid_input(format!(
                "raster {width}x{height} expects {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the bytes. The slice length is fixed, so the invariant holds.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn into_transferable(self) -> TransferRaster {
        TransferRaster {
            width: self.width,
            height: self.height,
            data: self.data,
        }
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.index(x, y);
        self.data[i..i + 4].copy_from_slice(&rgba);
    }

    /// Pixel lookup with coordinates clamped to the border.
    pub fn pixel_clamped(&self, x: i64, y: i64) -> [u8; 4] {
        let cx = x.clamp(0, i64::from(self.width) - 1) as u32;
        let cy = y.clamp(0, i64::from(self.height) - 1) as u32;
        self.pixel(cx, cy)
    }

    pub fn to_rgba_image(&self) -> image::RgbaImage {
        self.clone().into_rgba_image()
    }

    pub fn into_rgba_image(self) -> image::RgbaImage {
        let (w, h) = (self.width, self.height);
        image::RgbaImage::from_raw(w, h, self.data)
            .unwrap_or_else(|| panic!("raster invariant violated for {w}x{h}"))
    }

    /// Resample to `width x height` with bilinear interpolation.
    pub fn scale_to(&self, width: u32, height: u32) -> LayerforgeResult<Self> {
        self.scale_with(width, height, FilterType::Triangle)
    }

    /// Resample with an explicit `image` filter.
    pub fn scale_with(&self, width: u32, height: u32, filter: FilterType) -> LayerforgeResult<Self> {
        if width == 0 || height == 0 {
            return Err(LayerforgeError::invalid_input(format!(
                "scale target must be non-empty, got {width}x{height}"
            )));
        }
        if (width, height) == self.dimensions() {
            return Ok(self.clone());
        }
        if self.is_empty() {
            return Ok(Self::new(width, height));
        }
        let img = self.to_rgba_image();
        let scaled = image::imageops::resize(&img, width, height, filter);
        Ok(Self::from_rgba_image(scaled))
    }

    /// Copy `src_rect` of `src` so its top-left lands at `(dst_x, dst_y)`, clipping both sides.
    pub fn draw_subregion(&mut self, src: &Raster, src_rect: PixelRect, dst_x: i64, dst_y: i64) {
        let sx0 = i64::from(src_rect.x);
        let sy0 = i64::from(src_rect.y);
        let sx1 = (sx0 + i64::from(src_rect.width)).min(i64::from(src.width));
        let sy1 = (sy0 + i64::from(src_rect.height)).min(i64::from(src.height));

        for sy in sy0..sy1 {
            let dy = dst_y + (sy - sy0);
            if dy < 0 || dy >= i64::from(self.height) {
                continue;
            }
            // Clip the horizontal span once per row, then copy it as a slice.
            let mut start = sx0;
            let mut dx = dst_x;
            if dx < 0 {
                start -= dx;
                dx = 0;
            }
            let avail = i64::from(self.width) - dx;
            let end = sx1.min(start + avail);
            if end <= start {
                continue;
            }
            let n = ((end - start) * 4) as usize;
            let si = src.index(start as u32, sy as u32);
            let di = self.index(dx as u32, dy as u32);
            self.data[di..di + n].copy_from_slice(&src.data[si..si + n]);
        }
    }

    /// Return a copy of `rect`, which must lie inside the raster.
    pub fn crop(&self, rect: PixelRect) -> LayerforgeResult<Self> {
        if rect.is_empty() {
            return Err(LayerforgeError::invalid_input("crop rectangle is empty"));
        }
        let fits_x = rect.x.checked_add(rect.width).is_some_and(|r| r <= self.width);
        let fits_y = rect
            .y
            .checked_add(rect.height)
            .is_some_and(|b| b <= self.height);
        if !fits_x || !fits_y {
            return Err(LayerforgeError::invalid_input(format!(
                "crop rectangle {rect:?} exceeds {}x{}",
                self.width, self.height
            )));
        }
        let mut out = Self::new(rect.width, rect.height);
        out.draw_subregion(self, rect, 0, 0);
        Ok(out)
    }

    /// Rotate clockwise by `degrees`.
    ///
    /// Multiples of 90 are exact and swap dimensions for 90/270. Other angles rotate around the
    /// centre into a canvas of the original size; corners falling outside are cropped and
    /// uncovered pixels are transparent.
    pub fn rotate(&self, degrees: f32) -> Self {
        let norm = degrees.rem_euclid(360.0);
        let quarter = (norm / 90.0).round();
        if (norm - quarter * 90.0).abs() < 1e-4 {
            let img = self.to_rgba_image();
            return match quarter as u32 % 4 {
                0 => self.clone(),
                1 => Self::from_rgba_image(image::imageops::rotate90(&img)),
                2 => Self::from_rgba_image(image::imageops::rotate180(&img)),
                _ => Self::from_rgba_image(image::imageops::rotate270(&img)),
            };
        }

        let (w, h) = self.dimensions();
        let mut out = Self::new(w, h);
        let theta = norm.to_radians();
        let (sin, cos) = theta.sin_cos();
        let cx = (w as f32 - 1.0) / 2.0;
        let cy = (h as f32 - 1.0) / 2.0;
        for y in 0..h {
            for x in 0..w {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                let sx = cos * dx + sin * dy + cx;
                let sy = -sin * dx + cos * dy + cy;
                if let Some(px) = self.sample_bilinear(sx, sy) {
                    out.set_pixel(x, y, px);
                }
            }
        }
        out
    }

    /// Bilinear sample at a fractional position; `None` outside the raster.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> Option<[u8; 4]> {
        if self.is_empty() {
            return None;
        }
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        if !(x > -0.5 && y > -0.5 && x < max_x + 0.5 && y < max_y + 0.5) {
            return None;
        }
        let x = x.clamp(0.0, max_x);
        let y = y.clamp(0.0, max_y);
        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let p00 = self.pixel(x0, y0);
        let p10 = self.pixel(x1, y0);
        let p01 = self.pixel(x0, y1);
        let p11 = self.pixel(x1, y1);
        let mut out = [0u8; 4];
        for c in 0..4 {
            let top = f32::from(p00[c]) * (1.0 - fx) + f32::from(p10[c]) * fx;
            let bottom = f32::from(p01[c]) * (1.0 - fx) + f32::from(p11[c]) * fx;
            out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
        }
        Some(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/raster.rs"]
mod tests;
