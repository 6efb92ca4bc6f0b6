use crate::foundation::math::fingerprint_rgba;
use crate::foundation::raster::Raster;

/// Decoded copy of the base raster that composition reads from.
///
/// The cache is content addressed: a rebuild that sees the same fingerprint as the held buffer keeps
/// the buffer instead of copying the source again. Layer edits never touch it; only base changes
/// (load, reset, crop, rotate, resize, and history restores that swap the base) call
/// [`BaseImageCache::invalidate`].
#[derive(Debug, Default)]
pub struct BaseImageCache {
    pixels: Option<Raster>,
    fingerprint: Option<u64>,
    dirty: bool,
    copies: u64,
}

impl BaseImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of times the source was copied into the cache.
    pub fn copies(&self) -> u64 {
        self.copies
    }

    pub fn pixels(&self) -> Option<&Raster> {
        self.pixels.as_ref()
    }

    /// Bring the cache up to date with `source` and return the cached pixels.
    pub fn ensure(&mut self, source: Option<&Raster>) -> Option<&Raster> {
        if !self.dirty && self.pixels.is_some() {
            return self.pixels.as_ref();
        }
        self.dirty = false;

        let Some(source) = source else {
            self.pixels = None;
            self.fingerprint = None;
            return None;
        };
        let fp = fingerprint_rgba(source.width(), source.height(), source.data());
        if self.pixels.is_some() && self.fingerprint == Some(fp) {
            tracing::debug!(fingerprint = fp, "base cache hit");
            return self.pixels.as_ref();
        }

        self.copies += 1;
        self.fingerprint = Some(fp);
        self.pixels = Some(source.clone());
        self.pixels.as_ref()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/base_cache.rs"]
mod tests;
